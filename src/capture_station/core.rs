use crate::config::Config;
use crate::uploader::interface::UploadReport;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Camera opening and actuator running.
    Starting,
    Capturing,
    Finished,
}

impl Phase {
    pub fn is_active(&self) -> bool {
        matches!(self, Phase::Starting | Phase::Capturing)
    }
}

#[derive(Debug, Clone)]
pub struct Model {
    pub phase: Phase,
    /// Bumped on every start. Device events carry the session that caused
    /// them so late arrivals from an earlier session are ignored.
    pub session: u32,
    pub camera_running: bool,
    pub actuator_done: bool,
    pub captured_count: u32,
    pub started_at: Option<Instant>,
    pub elapsed: Duration,
    pub next_capture_at: Option<Instant>,
    pub status: String,
    pub closing: bool,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            session: 0,
            camera_running: false,
            actuator_done: false,
            captured_count: 0,
            started_at: None,
            elapsed: Duration::ZERO,
            next_capture_at: None,
            status: "Ready".to_string(),
            closing: false,
        }
    }
}

#[derive(Debug)]
pub enum Event {
    StartPressed(Instant),
    ClosePressed,
    Tick(Instant),
    CameraStarted { session: u32 },
    CameraFailed { session: u32, message: String },
    CameraStopped { session: u32 },
    ActuatorDone {
        session: u32,
        result: Result<(), String>,
        at: Instant,
    },
    CaptureReady { session: u32, image: Vec<u8> },
    UploadDone(UploadReport),
}

impl Event {
    pub fn to_display_string(&self) -> String {
        match self {
            Event::CaptureReady { session, image } => {
                format!("CaptureReady {{ session: {}, image: {} bytes }}", session, image.len())
            }
            event => format!("{:?}", event),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    SubscribeTick,
    StartCamera { session: u32 },
    StopCamera { session: u32 },
    RunActuator { session: u32 },
    RequestCapture,
    Upload { image: Vec<u8>, sequence: u32 },
}

impl Effect {
    pub fn to_display_string(&self) -> String {
        match self {
            Effect::Upload { image, sequence } => {
                format!("Upload {{ image: {} bytes, sequence: {} }}", image.len(), sequence)
            }
            effect => format!("{:?}", effect),
        }
    }
}

pub fn init() -> (Model, Vec<Effect>) {
    (Model::default(), vec![Effect::SubscribeTick])
}

pub fn transition(config: &Config, model: Model, event: Event) -> (Model, Vec<Effect>) {
    let current = model.session;
    match (model.phase, event) {
        (_, Event::ClosePressed) => (
            Model {
                closing: true,
                ..model
            },
            vec![Effect::StopCamera { session: current }],
        ),

        (Phase::Idle | Phase::Finished, Event::StartPressed(now)) => {
            let session = model.session + 1;
            (
                Model {
                    phase: Phase::Starting,
                    session,
                    camera_running: false,
                    actuator_done: false,
                    captured_count: 0,
                    started_at: Some(now),
                    elapsed: Duration::ZERO,
                    next_capture_at: None,
                    status: "Pump running...".to_string(),
                    ..model
                },
                vec![
                    Effect::StartCamera { session },
                    Effect::RunActuator { session },
                ],
            )
        }
        (_, Event::StartPressed(_)) => (model, vec![]),

        (phase, Event::CameraStarted { session }) if session == current && phase.is_active() => (
            Model {
                camera_running: true,
                ..model
            },
            vec![],
        ),

        (phase, Event::CameraFailed { session, message })
            if session == current && phase.is_active() =>
        {
            (
                Model {
                    phase: Phase::Idle,
                    camera_running: false,
                    next_capture_at: None,
                    status: format!("Camera error: {}", message),
                    ..model
                },
                vec![Effect::StopCamera { session }],
            )
        }

        (_, Event::CameraStopped { session }) if session == current => (
            Model {
                camera_running: false,
                ..model
            },
            vec![],
        ),

        (Phase::Starting, Event::ActuatorDone { session, result, at }) if session == current => {
            let status = match result {
                Ok(()) => "Capturing images".to_string(),
                Err(e) => format!("Script error: {}", e),
            };
            (
                Model {
                    phase: Phase::Capturing,
                    actuator_done: true,
                    next_capture_at: Some(at + config.capture_interval),
                    status,
                    ..model
                },
                vec![],
            )
        }

        (Phase::Starting, Event::Tick(now)) => (
            Model {
                elapsed: elapsed_since(model.started_at, now),
                ..model
            },
            vec![],
        ),

        (Phase::Capturing, Event::Tick(now)) => {
            let model = Model {
                elapsed: elapsed_since(model.started_at, now),
                ..model
            };

            if model.captured_count >= config.max_images {
                return finish(config, model);
            }

            let due = model.next_capture_at.is_some_and(|at| now >= at);
            if due && model.camera_running && model.actuator_done {
                (
                    Model {
                        next_capture_at: Some(now + config.capture_interval),
                        status: "Capturing image...".to_string(),
                        ..model
                    },
                    vec![Effect::RequestCapture],
                )
            } else {
                (model, vec![])
            }
        }

        (Phase::Capturing, Event::CaptureReady { session, image })
            if session == current && model.captured_count < config.max_images =>
        {
            let sequence = model.captured_count + 1;
            let model = Model {
                captured_count: sequence,
                status: format!("Sending image {}/{}...", sequence, config.max_images),
                ..model
            };
            let upload = Effect::Upload { image, sequence };

            if sequence >= config.max_images {
                let (model, mut effects) = finish(config, model);
                effects.insert(0, upload);
                (model, effects)
            } else {
                (model, vec![upload])
            }
        }

        (_, Event::UploadDone(report)) => {
            let status = match report {
                UploadReport::Sent { filename, .. } => format!("Sent {}", filename),
                UploadReport::Failed { error, .. } => format!("Send error: {}", error),
            };
            (Model { status, ..model }, vec![])
        }

        (_, _) => (model, vec![]),
    }
}

fn finish(config: &Config, model: Model) -> (Model, Vec<Effect>) {
    let session = model.session;
    (
        Model {
            phase: Phase::Finished,
            next_capture_at: None,
            status: format!("Done! Captured {} images", config.max_images),
            ..model
        },
        vec![Effect::StopCamera { session }],
    )
}

fn elapsed_since(started_at: Option<Instant>, now: Instant) -> Duration {
    started_at
        .map(|start| now.saturating_duration_since(start))
        .unwrap_or_default()
}
