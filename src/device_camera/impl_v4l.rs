use crate::device_camera::interface::{CameraHandle, DeviceCamera};
use crate::library::logger::interface::Logger;
use image::{ImageFormat, RgbImage};
use std::path::Path;
use std::sync::Arc;
use v4l::{
    buffer::Type,
    control::{Control, Value},
    io::traits::CaptureStream,
    prelude::MmapStream,
    video::Capture,
    Device, Format, FourCC,
};

const V4L2_CID_EXPOSURE_AUTO: u32 = 0x009a_0901;
const V4L2_CID_EXPOSURE_ABSOLUTE: u32 = 0x009a_0902;
const V4L2_EXPOSURE_MANUAL: i64 = 1;
const STREAM_BUFFERS: u32 = 4;

pub struct DeviceCameraV4l {
    width: u32,
    height: u32,
    exposure: Option<i64>,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl DeviceCameraV4l {
    pub fn new(
        resolution: (u32, u32),
        exposure: Option<i64>,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Self {
        Self {
            width: resolution.0,
            height: resolution.1,
            exposure,
            logger: logger.with_namespace("camera").with_namespace("v4l"),
        }
    }

    fn set_manual_exposure(&self, device: &Device, exposure: i64) {
        let controls = [
            (V4L2_CID_EXPOSURE_AUTO, V4L2_EXPOSURE_MANUAL),
            (V4L2_CID_EXPOSURE_ABSOLUTE, exposure),
        ];
        for (id, value) in controls {
            if let Err(e) = device.set_control(Control {
                id,
                value: Value::Integer(value),
            }) {
                let _ = self
                    .logger
                    .error(&format!("Setting control {:#x} failed: {}", id, e));
            }
        }
    }
}

impl DeviceCamera for DeviceCameraV4l {
    fn open(
        &self,
        device_path: &Path,
    ) -> Result<Box<dyn CameraHandle>, Box<dyn std::error::Error + Send + Sync>> {
        let device = Device::with_path(device_path)
            .map_err(|e| format!("Failed to open camera at {}: {}", device_path.display(), e))?;

        if let Some(exposure) = self.exposure {
            self.set_manual_exposure(&device, exposure);
        }

        let mjpg = FourCC::new(b"MJPG");
        let format = device.set_format(&Format::new(self.width, self.height, mjpg))?;
        if format.fourcc != mjpg {
            return Err(format!(
                "Camera at {} cannot deliver MJPG (got {})",
                device_path.display(),
                format.fourcc
            )
            .into());
        }

        let stream = MmapStream::with_buffers(&device, Type::VideoCapture, STREAM_BUFFERS)?;

        self.logger.info(&format!(
            "Opened {} at {}x{}",
            device_path.display(),
            format.width,
            format.height
        ))?;

        Ok(Box::new(CameraHandleV4l {
            stream,
            _device: device,
        }))
    }
}

// Field order matters: the stream unmaps its buffers before the device closes.
struct CameraHandleV4l {
    stream: MmapStream<'static>,
    _device: Device,
}

impl CameraHandle for CameraHandleV4l {
    fn read_frame(&mut self) -> Result<RgbImage, Box<dyn std::error::Error + Send + Sync>> {
        let (buffer, metadata) = self.stream.next()?;
        let used = match metadata.bytesused as usize {
            0 => buffer.len(),
            n => n.min(buffer.len()),
        };
        let frame = image::load_from_memory_with_format(&buffer[..used], ImageFormat::Jpeg)?;
        Ok(frame.to_rgb8())
    }
}
