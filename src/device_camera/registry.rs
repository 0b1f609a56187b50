use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraAddressError {
    UnknownId { id: String, known: Vec<String> },
    DeviceMissing { id: String, path: PathBuf },
}

impl fmt::Display for CameraAddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraAddressError::UnknownId { id, known } => write!(
                f,
                "Unknown camera id {}. Available ids: {}",
                id,
                known.join(", ")
            ),
            CameraAddressError::DeviceMissing { id, path } => {
                write!(f, "Camera device not found: {} (id {})", path.display(), id)
            }
        }
    }
}

impl std::error::Error for CameraAddressError {}

/// Static map from camera ids to device nodes.
#[derive(Debug, Clone, Default)]
pub struct CameraRegistry {
    entries: Vec<(String, PathBuf)>,
}

impl CameraRegistry {
    pub fn new(entries: Vec<(String, PathBuf)>) -> Self {
        Self { entries }
    }

    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn resolve(&self, id: &str) -> Result<PathBuf, CameraAddressError> {
        let path = self
            .entries
            .iter()
            .find(|(known, _)| known == id)
            .map(|(_, path)| path.clone())
            .ok_or_else(|| CameraAddressError::UnknownId {
                id: id.to_string(),
                known: self.ids(),
            })?;

        if !path.exists() {
            return Err(CameraAddressError::DeviceMissing {
                id: id.to_string(),
                path,
            });
        }

        Ok(path)
    }
}

/// Stable id of a USB camera, independent of which /dev/videoN it lands on.
pub fn camera_uuid(vendor_id: &str, product_id: &str, serial: &str) -> Uuid {
    let name = format!("{}:{}:{}", vendor_id, product_id, serial);
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbCamera {
    pub name: String,
    pub device_path: PathBuf,
    pub id: Uuid,
}

/// Lists `video*` nodes under `<sysfs_root>/class/video4linux` that sit on
/// a USB bus. Nodes whose attributes cannot be read are skipped.
pub fn scan_usb_cameras(sysfs_root: &Path) -> std::io::Result<Vec<UsbCamera>> {
    let mut nodes: Vec<_> = fs::read_dir(sysfs_root.join("class").join("video4linux"))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("video"))
        .collect();
    nodes.sort_by_key(|entry| entry.file_name());

    Ok(nodes
        .iter()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            let usb_device = usb_device_dir(&entry.path().join("device"))?;
            let vendor_id = read_attribute(&usb_device, "idVendor", "unknown");
            let product_id = read_attribute(&usb_device, "idProduct", "unknown");
            let serial = read_attribute(&usb_device, "serial", "no_serial");

            Some(UsbCamera {
                device_path: PathBuf::from("/dev").join(&name),
                id: camera_uuid(&vendor_id, &product_id, &serial),
                name,
            })
        })
        .collect())
}

// The `device` link points at the USB interface; the ids live on the
// interface's parent.
fn usb_device_dir(device_link: &Path) -> Option<PathBuf> {
    let resolved = device_link.canonicalize().ok()?;
    if !resolved.to_string_lossy().contains("usb") {
        return None;
    }
    if resolved.join("idVendor").exists() {
        return Some(resolved);
    }
    resolved.parent().map(Path::to_path_buf)
}

fn read_attribute(dir: &Path, name: &str, fallback: &str) -> String {
    fs::read_to_string(dir.join(name))
        .map(|value| value.trim().to_string())
        .unwrap_or_else(|_| fallback.to_string())
}
