use crate::acquisition::{spawn_acquisition, AcquisitionEvent, AcquisitionSettings};
use crate::capture_station::core::{Effect, Event};
use crate::capture_station::main::CaptureStation;
use crate::uploader::interface::send_image;
use std::time::Instant;

impl CaptureStation {
    pub(crate) fn run_effect(&self, effect: Effect) {
        let _ = self
            .logger
            .info(&format!("Running effect: {}", effect.to_display_string()));

        match effect {
            Effect::SubscribeTick => loop {
                std::thread::sleep(self.config.tick_rate);
                if self.model.lock().unwrap().closing {
                    break;
                }
                if self.event_sender.send(Event::Tick(Instant::now())).is_err() {
                    break;
                }
            },
            Effect::StartCamera { session } => self.start_camera(session),
            Effect::StopCamera { session } => self.stop_acquisition(Some(session)),
            Effect::RunActuator { session } => {
                let result = self
                    .device_actuator
                    .actuate()
                    .map_err(|e| e.to_string());
                if let Err(e) = &result {
                    let _ = self.logger.error(&format!("Actuator failed: {}", e));
                }
                let _ = self.event_sender.send(Event::ActuatorDone {
                    session,
                    result,
                    at: Instant::now(),
                });
            }
            Effect::RequestCapture => {
                if let Some((_, acquisition)) = self.acquisition.lock().unwrap().as_ref() {
                    acquisition.request_capture();
                }
            }
            Effect::Upload { image, sequence } => {
                let report = send_image(
                    self.uploader.as_ref(),
                    &self.config.filename_prefix,
                    image,
                );
                let _ = self.logger.info(&format!(
                    "Upload {}/{}: {:?}",
                    sequence, self.config.max_images, report
                ));
                let _ = self.event_sender.send(Event::UploadDone(report));
            }
        }
    }

    fn start_camera(&self, session: u32) {
        let device_path = match self.registry.resolve(&self.config.device_id) {
            Ok(path) => path,
            Err(e) => {
                let _ = self.logger.error(&e.to_string());
                let _ = self.event_sender.send(Event::CameraFailed {
                    session,
                    message: e.to_string(),
                });
                return;
            }
        };

        let mut acquisition = self.acquisition.lock().unwrap();
        {
            let model = self.model.lock().unwrap();
            if model.closing || model.session != session {
                return;
            }
        }
        if let Some((_, mut previous)) = acquisition.take() {
            previous.stop();
        }

        let sender = self.event_sender.clone();
        let display = self.device_display.clone();
        let logger = self.logger.clone();
        let settings = AcquisitionSettings {
            frame_interval: self.config.frame_interval,
            preview_size: self.config.preview_size,
        };

        let handle = spawn_acquisition(
            self.device_camera.clone(),
            device_path,
            settings,
            self.logger.clone(),
            move |event| {
                let event = match event {
                    AcquisitionEvent::Preview(frame) => {
                        if let Err(e) = display.lock().unwrap().show_preview(&frame) {
                            let _ = logger.error(&format!("Preview failed: {}", e));
                        }
                        return;
                    }
                    AcquisitionEvent::Opened => Event::CameraStarted { session },
                    AcquisitionEvent::Failed(message) => Event::CameraFailed { session, message },
                    AcquisitionEvent::CaptureReady(image) => Event::CaptureReady { session, image },
                    AcquisitionEvent::Stopped => Event::CameraStopped { session },
                };
                let _ = sender.send(event);
            },
        );
        *acquisition = Some((session, handle));
    }

    /// Stops the running acquisition if it belongs to `session`, or whatever
    /// is running when `session` is `None`. Holds the slot lock until the
    /// worker has released the camera.
    pub(crate) fn stop_acquisition(&self, session: Option<u32>) {
        let mut acquisition = self.acquisition.lock().unwrap();
        let matches = acquisition
            .as_ref()
            .is_some_and(|(running, _)| session.map_or(true, |session| session == *running));
        if !matches {
            return;
        }
        if let Some((_, mut handle)) = acquisition.take() {
            handle.stop();
        }
    }
}
