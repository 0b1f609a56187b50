use capture_station::capture_station::core::Event;
use capture_station::capture_station::main::CaptureStation;
use capture_station::config::Config;
use capture_station::device_actuator::impl_script::DeviceActuatorScript;
use capture_station::device_camera::impl_v4l::DeviceCameraV4l;
use capture_station::device_display::impl_console::DeviceDisplayConsole;
use capture_station::device_display::impl_gui::DeviceDisplayGui;
use capture_station::device_display::interface::DisplayInput;
use capture_station::library::logger::impl_console::LoggerConsole;
use capture_station::library::logger::interface::Logger;
use capture_station::uploader::impl_http::UploaderHttp;
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = Config::load()?;

    let logger: Arc<dyn Logger + Send + Sync> = Arc::new(LoggerConsole::new(config.logger_timezone));

    let device_camera = Arc::new(DeviceCameraV4l::new(
        config.camera_resolution,
        config.camera_exposure,
        logger.clone(),
    ));

    let device_actuator = Arc::new(DeviceActuatorScript::new(
        config.actuator_script_path.clone(),
        config.actuator_use_sudo,
        logger.clone(),
    ));

    let uploader = Arc::new(UploaderHttp::new(
        &config.server_url,
        &config.upload_field,
        config.upload_timeout,
        logger.clone(),
    ));

    if config.headless {
        let station = CaptureStation::new(
            config,
            logger,
            device_camera,
            device_actuator,
            Arc::new(Mutex::new(DeviceDisplayConsole::new())),
            uploader,
        );
        return run_headless(station);
    }

    let gui = DeviceDisplayGui::new(config.preview_size);
    let station = CaptureStation::new(
        config,
        logger.clone(),
        device_camera,
        device_actuator,
        Arc::new(Mutex::new(gui.clone())),
        uploader,
    );

    let sender = station.sender();
    let runner = {
        let station = station.clone();
        std::thread::spawn(move || station.run())
    };

    let input_sender = sender.clone();
    gui.run(move |input| {
        let event = match input {
            DisplayInput::StartPressed => Event::StartPressed(Instant::now()),
            DisplayInput::ClosePressed => Event::ClosePressed,
        };
        let _ = input_sender.send(event);
    })?;

    let _ = sender.send(Event::ClosePressed);
    runner
        .join()
        .map_err(|_| "station thread panicked".to_string())?
}

/// One session without a window. Returns once the session ends and the
/// uploads have been joined.
fn run_headless(station: CaptureStation) -> Result<(), Box<dyn Error + Send + Sync>> {
    let sender = station.sender();
    let runner = {
        let station = station.clone();
        std::thread::spawn(move || station.run())
    };

    sender.send(Event::StartPressed(Instant::now()))?;
    loop {
        std::thread::sleep(Duration::from_millis(200));
        let model = station.model();
        if runner.is_finished() || (model.session > 0 && !model.phase.is_active()) {
            break;
        }
    }
    let _ = sender.send(Event::ClosePressed);
    runner
        .join()
        .map_err(|_| "station thread panicked".to_string())?
}
