use crate::library::logger::interface::Logger;
use crate::uploader::interface::Uploader;
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
pub struct UploaderFake {
    logger: Arc<dyn Logger + Send + Sync>,
    delay: Duration,
    failure: Option<String>,
    uploads: Arc<Mutex<Vec<(String, usize)>>>,
}

impl UploaderFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("uploader").with_namespace("fake"),
            delay: Duration::ZERO,
            failure: None,
            uploads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Filename and byte count of every attempted upload, in call order.
    pub fn uploads(&self) -> Vec<(String, usize)> {
        self.uploads.lock().unwrap().clone()
    }
}

impl Uploader for UploaderFake {
    fn upload(
        &self,
        filename: &str,
        png: Vec<u8>,
    ) -> Result<serde_json::Value, Box<dyn Error + Send + Sync>> {
        std::thread::sleep(self.delay);
        self.uploads
            .lock()
            .unwrap()
            .push((filename.to_string(), png.len()));

        if let Some(message) = &self.failure {
            return Err(message.clone().into());
        }

        self.logger.info(&format!("upload({})", filename))?;
        Ok(serde_json::json!({ "saved": [filename] }))
    }
}
