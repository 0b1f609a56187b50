use crate::acquisition::AcquisitionHandle;
use crate::capture_station::core::{init, transition, Effect, Event, Model};
use crate::config::Config;
use crate::device_actuator::interface::DeviceActuator;
use crate::device_camera::interface::DeviceCamera;
use crate::device_camera::registry::CameraRegistry;
use crate::device_display::interface::DeviceDisplay;
use crate::library::logger::interface::Logger;
use crate::uploader::interface::Uploader;
use std::error::Error;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

#[derive(Clone)]
pub struct CaptureStation {
    pub model: Arc<Mutex<Model>>,
    pub event_sender: Sender<Event>,
    pub event_receiver: Arc<Mutex<Receiver<Event>>>,
    pub config: Config,
    pub logger: Arc<dyn Logger + Send + Sync>,
    pub registry: CameraRegistry,
    pub device_camera: Arc<dyn DeviceCamera + Send + Sync>,
    pub device_actuator: Arc<dyn DeviceActuator + Send + Sync>,
    pub device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
    pub uploader: Arc<dyn Uploader + Send + Sync>,
    pub(crate) acquisition: Arc<Mutex<Option<(u32, AcquisitionHandle)>>>,
    pub(crate) uploads: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl CaptureStation {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        device_camera: Arc<dyn DeviceCamera + Send + Sync>,
        device_actuator: Arc<dyn DeviceActuator + Send + Sync>,
        device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
        uploader: Arc<dyn Uploader + Send + Sync>,
    ) -> Self {
        let (event_sender, event_receiver) = channel();
        let (model, _) = init();

        Self {
            registry: CameraRegistry::new(config.cameras.clone()),
            config,
            logger: logger.with_namespace("station"),
            device_camera,
            device_actuator,
            device_display,
            uploader,
            event_sender,
            event_receiver: Arc::new(Mutex::new(event_receiver)),
            model: Arc::new(Mutex::new(model)),
            acquisition: Arc::new(Mutex::new(None)),
            uploads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle for feeding user input into the loop from another thread.
    pub fn sender(&self) -> Sender<Event> {
        self.event_sender.clone()
    }

    pub fn model(&self) -> Model {
        self.model.lock().unwrap().clone()
    }

    fn spawn_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            let is_upload = matches!(effect, Effect::Upload { .. });
            let self_clone = self.clone();
            let worker = std::thread::spawn(move || self_clone.run_effect(effect));
            if is_upload {
                let mut uploads = self.uploads.lock().unwrap();
                reap_finished(&mut uploads);
                uploads.push(worker);
            }
        }
    }

    pub(crate) fn tracked_uploads(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    /// Runs until `ClosePressed`, then releases the camera and waits for
    /// in-flight uploads.
    pub fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let (mut current_model, effects) = init();
        *self.model.lock().unwrap() = current_model.clone();
        self.render(&current_model)?;
        self.spawn_effects(effects);

        loop {
            let event = self.event_receiver.lock().unwrap().recv()?;

            let _ = self.logger.info(&format!(
                "\nold model:\n\t{:?}\n\nevent:\n\t{}",
                current_model,
                event.to_display_string(),
            ));
            let (new_model, effects) = transition(&self.config, current_model, event);
            let _ = self.logger.info(&format!(
                "\nnew model:\n\t{:?}\n\neffects:\n\t{:?}",
                new_model,
                effects
                    .iter()
                    .map(Effect::to_display_string)
                    .collect::<Vec<_>>(),
            ));

            current_model = new_model;
            *self.model.lock().unwrap() = current_model.clone();
            self.render(&current_model)?;

            if current_model.closing {
                for effect in effects {
                    self.run_effect(effect);
                }
                break;
            }

            self.spawn_effects(effects);
        }

        self.shutdown();
        Ok(())
    }

    fn shutdown(&self) {
        self.stop_acquisition(None);

        let uploads: Vec<JoinHandle<()>> = self.uploads.lock().unwrap().drain(..).collect();
        let pending = uploads.len();
        for upload in uploads {
            let _ = upload.join();
        }
        let _ = self
            .logger
            .info(&format!("Shut down, joined {} upload workers", pending));
    }
}

/// Joins and drops the workers that have already exited.
fn reap_finished(workers: &mut Vec<JoinHandle<()>>) {
    let mut index = 0;
    while index < workers.len() {
        if workers[index].is_finished() {
            let _ = workers.swap_remove(index).join();
        } else {
            index += 1;
        }
    }
}
