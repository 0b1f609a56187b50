use crate::device_camera::registry::{
    camera_uuid, scan_usb_cameras, CameraAddressError, CameraRegistry,
};
use std::fs;
use std::os::unix::fs::symlink;
use std::path::PathBuf;

#[test]
fn test_unknown_id_lists_known_ids() {
    let registry = CameraRegistry::new(vec![
        ("front".to_string(), PathBuf::from("/dev/video0")),
        ("back".to_string(), PathBuf::from("/dev/video1")),
    ]);

    let error = registry.resolve("side").unwrap_err();

    assert_eq!(
        error,
        CameraAddressError::UnknownId {
            id: "side".to_string(),
            known: vec!["front".to_string(), "back".to_string()],
        }
    );
    let message = error.to_string();
    assert!(message.contains("side"));
    assert!(message.contains("front, back"));
}

#[test]
fn test_missing_device_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("video9");
    let registry = CameraRegistry::new(vec![("front".to_string(), path.clone())]);

    let error = registry.resolve("front").unwrap_err();

    assert_eq!(
        error,
        CameraAddressError::DeviceMissing {
            id: "front".to_string(),
            path,
        }
    );
    assert!(error.to_string().contains("not found"));
}

#[test]
fn test_resolves_existing_device() {
    let device = tempfile::NamedTempFile::new().unwrap();
    let registry =
        CameraRegistry::new(vec![("front".to_string(), device.path().to_path_buf())]);

    assert_eq!(registry.resolve("front").unwrap(), device.path());
}

#[test]
fn test_camera_uuid_is_deterministic_v5() {
    let first = camera_uuid("046d", "0825", "ABC123");
    let second = camera_uuid("046d", "0825", "ABC123");
    let other = camera_uuid("046d", "0825", "ABC124");

    assert_eq!(first, second);
    assert_ne!(first, other);
    assert_eq!(first.get_version_num(), 5);
}

#[test]
fn test_scan_usb_cameras() {
    let root = tempfile::tempdir().unwrap();
    let usb_device = root.path().join("devices/platform/usb1/1-1");
    let interface = usb_device.join("1-1:1.0");
    fs::create_dir_all(&interface).unwrap();
    fs::write(usb_device.join("idVendor"), "046d\n").unwrap();
    fs::write(usb_device.join("idProduct"), "0825\n").unwrap();

    let platform = root.path().join("devices/platform/csi0");
    fs::create_dir_all(&platform).unwrap();

    let class = root.path().join("class/video4linux");
    fs::create_dir_all(class.join("video0")).unwrap();
    fs::create_dir_all(class.join("video1")).unwrap();
    fs::create_dir_all(class.join("media0")).unwrap();
    symlink(&interface, class.join("video0/device")).unwrap();
    symlink(&platform, class.join("video1/device")).unwrap();

    let cameras = scan_usb_cameras(root.path()).unwrap();

    assert_eq!(cameras.len(), 1);
    assert_eq!(cameras[0].name, "video0");
    assert_eq!(cameras[0].device_path, PathBuf::from("/dev/video0"));
    assert_eq!(cameras[0].id, camera_uuid("046d", "0825", "no_serial"));
}

#[test]
fn test_scan_without_video4linux_is_an_error() {
    let root = tempfile::tempdir().unwrap();
    assert!(scan_usb_cameras(root.path()).is_err());
}
