use crate::acquisition::{spawn_acquisition, AcquisitionEvent, AcquisitionSettings};
use crate::device_camera::impl_fake::DeviceCameraFake;
use crate::device_camera::interface::DeviceCamera;
use crate::library::logger::impl_fake::LoggerFake;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn settings(preview_size: Option<(u32, u32)>) -> AcquisitionSettings {
    AcquisitionSettings {
        frame_interval: Duration::from_millis(2),
        preview_size,
    }
}

fn wait_for<F>(events: &Receiver<AcquisitionEvent>, mut matches: F) -> Option<AcquisitionEvent>
where
    F: FnMut(&AcquisitionEvent) -> bool,
{
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if let Ok(event) = events.recv_timeout(Duration::from_millis(50)) {
            if matches(&event) {
                return Some(event);
            }
        }
    }
    None
}

#[test]
fn test_preview_and_capture() {
    let logger = Arc::new(LoggerFake::new());
    let camera = DeviceCameraFake::new(logger.clone());
    let (tx, rx) = channel();

    let mut handle = spawn_acquisition(
        Arc::new(camera.clone()),
        PathBuf::from("/dev/video0"),
        settings(Some((16, 8))),
        logger,
        move |event| {
            let _ = tx.send(event);
        },
    );

    assert!(wait_for(&rx, |e| matches!(e, AcquisitionEvent::Opened)).is_some());
    match wait_for(&rx, |e| matches!(e, AcquisitionEvent::Preview(_))) {
        Some(AcquisitionEvent::Preview(preview)) => assert_eq!(preview.dimensions(), (16, 8)),
        other => panic!("Unexpected event: {:?}", other),
    }
    assert!(handle.is_running());

    handle.request_capture();
    match wait_for(&rx, |e| matches!(e, AcquisitionEvent::CaptureReady(_))) {
        Some(AcquisitionEvent::CaptureReady(png)) => {
            let frame = image::load_from_memory(&png).unwrap();
            assert_eq!((frame.width(), frame.height()), (64, 48));
        }
        other => panic!("Unexpected event: {:?}", other),
    }

    handle.stop();
    assert!(!handle.is_running());
}

#[test]
fn test_full_size_preview() {
    let logger = Arc::new(LoggerFake::new());
    let camera = DeviceCameraFake::new(logger.clone());
    let (tx, rx) = channel();

    let _handle = spawn_acquisition(
        Arc::new(camera),
        PathBuf::from("/dev/video0"),
        settings(None),
        logger,
        move |event| {
            let _ = tx.send(event);
        },
    );

    match wait_for(&rx, |e| matches!(e, AcquisitionEvent::Preview(_))) {
        Some(AcquisitionEvent::Preview(preview)) => assert_eq!(preview.dimensions(), (64, 48)),
        other => panic!("Unexpected event: {:?}", other),
    }
}

#[test]
fn test_capture_without_frame_is_dropped() {
    let logger = Arc::new(LoggerFake::new());
    let camera = DeviceCameraFake::new(logger.clone());
    camera.set_failing_reads(true);
    let (tx, rx) = channel();

    let mut handle = spawn_acquisition(
        Arc::new(camera.clone()),
        PathBuf::from("/dev/video0"),
        settings(None),
        logger.clone(),
        move |event| {
            let _ = tx.send(event);
        },
    );
    assert!(wait_for(&rx, |e| matches!(e, AcquisitionEvent::Opened)).is_some());

    handle.request_capture();
    std::thread::sleep(Duration::from_millis(50));
    assert!(handle.frame_slot().is_empty());

    // The dropped request is not replayed once frames arrive.
    camera.set_failing_reads(false);
    assert!(wait_for(&rx, |e| matches!(e, AcquisitionEvent::Preview(_))).is_some());
    std::thread::sleep(Duration::from_millis(50));
    handle.stop();

    let captures = rx
        .try_iter()
        .filter(|e| matches!(e, AcquisitionEvent::CaptureReady(_)))
        .count();
    assert_eq!(captures, 0);
    assert!(logger
        .lines()
        .iter()
        .any(|line| line.contains("Frame read failed")));
}

#[test]
fn test_stop_releases_device() {
    let logger = Arc::new(LoggerFake::new());
    let camera = DeviceCameraFake::new(logger.clone());
    let (tx, rx) = channel();

    let mut handle = spawn_acquisition(
        Arc::new(camera.clone()),
        PathBuf::from("/dev/video0"),
        settings(None),
        logger,
        move |event| {
            let _ = tx.send(event);
        },
    );
    assert!(wait_for(&rx, |e| matches!(e, AcquisitionEvent::Opened)).is_some());
    assert!(camera.is_open());

    handle.stop();

    assert!(!camera.is_open());
    assert!(rx
        .try_iter()
        .any(|e| matches!(e, AcquisitionEvent::Stopped)));
    assert!(camera.open(Path::new("/dev/video0")).is_ok());
}

#[test]
fn test_open_failure_reports_and_exits() {
    let logger = Arc::new(LoggerFake::new());
    let camera = DeviceCameraFake::new(logger.clone());
    let _held = camera.open(Path::new("/dev/video0")).unwrap();
    let (tx, rx) = channel();

    let mut handle = spawn_acquisition(
        Arc::new(camera.clone()),
        PathBuf::from("/dev/video0"),
        settings(None),
        logger,
        move |event| {
            let _ = tx.send(event);
        },
    );

    match wait_for(&rx, |_| true) {
        Some(AcquisitionEvent::Failed(message)) => assert!(message.contains("busy")),
        other => panic!("Unexpected event: {:?}", other),
    }
    handle.stop();
    assert!(!handle.is_running());
    assert_eq!(camera.opened_total(), 1);
}
