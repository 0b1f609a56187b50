use crate::uploader::filename::generate_filename;
use std::error::Error;

pub trait Uploader {
    /// Sends one PNG and returns the server's parsed JSON reply.
    fn upload(
        &self,
        filename: &str,
        png: Vec<u8>,
    ) -> Result<serde_json::Value, Box<dyn Error + Send + Sync>>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadReport {
    Sent { filename: String, response: String },
    Failed { filename: String, error: String },
}

impl UploadReport {
    pub fn filename(&self) -> &str {
        match self {
            UploadReport::Sent { filename, .. } | UploadReport::Failed { filename, .. } => filename,
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, UploadReport::Sent { .. })
    }
}

/// Names the image after the current local time and uploads it. Failures are
/// folded into the report.
pub fn send_image(
    uploader: &(dyn Uploader + Send + Sync),
    prefix: &str,
    png: Vec<u8>,
) -> UploadReport {
    let filename = generate_filename(prefix, &chrono::Local::now());

    match uploader.upload(&filename, png) {
        Ok(response) => UploadReport::Sent {
            filename,
            response: response.to_string(),
        },
        Err(e) => UploadReport::Failed {
            filename,
            error: e.to_string(),
        },
    }
}
