use crate::device_camera::interface::{CameraHandle, DeviceCamera};
use crate::library::logger::interface::Logger;
use image::{Rgb, RgbImage};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Exclusive like a real V4L2 node: a second open fails until the first
/// handle is dropped.
#[derive(Clone)]
pub struct DeviceCameraFake {
    logger: Arc<dyn Logger + Send + Sync>,
    width: u32,
    height: u32,
    open_handles: Arc<AtomicUsize>,
    opened_total: Arc<AtomicUsize>,
    failing_reads: Arc<AtomicBool>,
}

impl DeviceCameraFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("camera").with_namespace("fake"),
            width: 64,
            height: 48,
            open_handles: Arc::new(AtomicUsize::new(0)),
            opened_total: Arc::new(AtomicUsize::new(0)),
            failing_reads: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_failing_reads(&self, failing: bool) {
        self.failing_reads.store(failing, Ordering::SeqCst);
    }

    pub fn is_open(&self) -> bool {
        self.open_handles.load(Ordering::SeqCst) > 0
    }

    pub fn opened_total(&self) -> usize {
        self.opened_total.load(Ordering::SeqCst)
    }
}

impl DeviceCamera for DeviceCameraFake {
    fn open(
        &self,
        device_path: &Path,
    ) -> Result<Box<dyn CameraHandle>, Box<dyn std::error::Error + Send + Sync>> {
        if self
            .open_handles
            .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(format!("Camera busy: {}", device_path.display()).into());
        }
        self.opened_total.fetch_add(1, Ordering::SeqCst);
        self.logger
            .info(&format!("Opened {}", device_path.display()))?;

        Ok(Box::new(CameraHandleFake {
            width: self.width,
            height: self.height,
            sequence: 0,
            open_handles: self.open_handles.clone(),
            failing_reads: self.failing_reads.clone(),
        }))
    }
}

struct CameraHandleFake {
    width: u32,
    height: u32,
    sequence: u8,
    open_handles: Arc<AtomicUsize>,
    failing_reads: Arc<AtomicBool>,
}

impl CameraHandle for CameraHandleFake {
    fn read_frame(&mut self) -> Result<RgbImage, Box<dyn std::error::Error + Send + Sync>> {
        if self.failing_reads.load(Ordering::SeqCst) {
            return Err("Fake camera read failed".into());
        }
        self.sequence = self.sequence.wrapping_add(1);
        let sequence = self.sequence;
        let noise: u8 = rand::random();
        Ok(RgbImage::from_fn(self.width, self.height, |x, y| {
            Rgb([
                (x as u8).wrapping_add(sequence),
                (y as u8).wrapping_add(sequence),
                noise,
            ])
        }))
    }
}

impl Drop for CameraHandleFake {
    fn drop(&mut self) {
        self.open_handles.fetch_sub(1, Ordering::SeqCst);
    }
}
