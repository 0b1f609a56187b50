use crate::acquisition::frame_slot::FrameSlot;
use crate::device_camera::interface::DeviceCamera;
use crate::library::logger::interface::Logger;
use image::{imageops::FilterType, RgbImage};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct AcquisitionSettings {
    pub frame_interval: Duration,
    pub preview_size: Option<(u32, u32)>,
}

#[derive(Debug)]
pub enum AcquisitionEvent {
    Opened,
    Failed(String),
    Preview(RgbImage),
    CaptureReady(Vec<u8>),
    Stopped,
}

pub struct AcquisitionHandle {
    running: Arc<AtomicBool>,
    capture_requested: Arc<AtomicBool>,
    slot: FrameSlot,
    worker: Option<JoinHandle<()>>,
}

impl AcquisitionHandle {
    /// Asks the loop to encode the next buffered frame. Dropped if no frame
    /// has been read yet.
    pub fn request_capture(&self) {
        self.capture_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
            && self
                .worker
                .as_ref()
                .is_some_and(|worker| !worker.is_finished())
    }

    pub fn frame_slot(&self) -> &FrameSlot {
        &self.slot
    }

    /// Blocks until the worker has exited and released the camera.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for AcquisitionHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

pub fn spawn_acquisition<F>(
    camera: Arc<dyn DeviceCamera + Send + Sync>,
    device_path: PathBuf,
    settings: AcquisitionSettings,
    logger: Arc<dyn Logger + Send + Sync>,
    sink: F,
) -> AcquisitionHandle
where
    F: Fn(AcquisitionEvent) + Send + 'static,
{
    let running = Arc::new(AtomicBool::new(true));
    let capture_requested = Arc::new(AtomicBool::new(false));
    let slot = FrameSlot::new();

    let worker = {
        let running = running.clone();
        let capture_requested = capture_requested.clone();
        let slot = slot.clone();
        let logger = logger.with_namespace("acquisition");
        std::thread::spawn(move || {
            run_loop(
                camera.as_ref(),
                &device_path,
                settings,
                &running,
                &capture_requested,
                &slot,
                logger.as_ref(),
                &sink,
            );
        })
    };

    AcquisitionHandle {
        running,
        capture_requested,
        slot,
        worker: Some(worker),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_loop(
    camera: &(dyn DeviceCamera + Send + Sync),
    device_path: &std::path::Path,
    settings: AcquisitionSettings,
    running: &AtomicBool,
    capture_requested: &AtomicBool,
    slot: &FrameSlot,
    logger: &dyn Logger,
    sink: &dyn Fn(AcquisitionEvent),
) {
    let mut handle = match camera.open(device_path) {
        Ok(handle) => handle,
        Err(e) => {
            let _ = logger.error(&format!("Camera error: {}", e));
            running.store(false, Ordering::SeqCst);
            sink(AcquisitionEvent::Failed(e.to_string()));
            return;
        }
    };
    sink(AcquisitionEvent::Opened);

    while running.load(Ordering::SeqCst) {
        match handle.read_frame() {
            Ok(frame) => {
                let preview = match settings.preview_size {
                    Some((width, height)) => {
                        image::imageops::resize(&frame, width, height, FilterType::Triangle)
                    }
                    None => frame.clone(),
                };
                slot.store(frame);
                sink(AcquisitionEvent::Preview(preview));
            }
            Err(e) => {
                let _ = logger.error(&format!("Frame read failed: {}", e));
            }
        }

        if capture_requested.swap(false, Ordering::SeqCst) {
            match slot.encode_png() {
                Some(Ok(png)) => sink(AcquisitionEvent::CaptureReady(png)),
                Some(Err(e)) => {
                    let _ = logger.error(&format!("PNG encoding failed: {}", e));
                }
                None => {}
            }
        }

        std::thread::sleep(settings.frame_interval);
    }

    drop(handle);
    let _ = logger.info(&format!("Released {}", device_path.display()));
    sink(AcquisitionEvent::Stopped);
}
