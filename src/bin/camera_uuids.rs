//! Prints the stable id of every USB camera for use as `device_id`.

use capture_station::device_camera::registry::scan_usb_cameras;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cameras = scan_usb_cameras(Path::new("/sys"))?;
    if cameras.is_empty() {
        println!("No USB cameras found");
    }
    for camera in cameras {
        println!("{} => {}", camera.device_path.display(), camera.id);
    }
    Ok(())
}
