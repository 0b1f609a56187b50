use crate::device_actuator::interface::DeviceActuator;
use crate::library::logger::interface::Logger;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub struct DeviceActuatorFake {
    logger: Arc<dyn Logger + Send + Sync>,
    delay: Duration,
    failure: Option<String>,
    invocations: AtomicUsize,
}

impl DeviceActuatorFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>, delay: Duration) -> Self {
        Self {
            logger: logger.with_namespace("actuator").with_namespace("fake"),
            delay,
            failure: None,
            invocations: AtomicUsize::new(0),
        }
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

impl DeviceActuator for DeviceActuatorFake {
    fn actuate(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        self.logger.info("Running pump...")?;
        std::thread::sleep(self.delay);
        match &self.failure {
            Some(message) => Err(message.clone().into()),
            None => {
                self.logger.info("Pump cycle finished")?;
                Ok(())
            }
        }
    }
}
