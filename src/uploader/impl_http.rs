use crate::library::logger::interface::Logger;
use crate::uploader::interface::Uploader;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

pub struct UploaderHttp {
    agent: ureq::Agent,
    server_url: String,
    field: String,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl UploaderHttp {
    pub fn new(
        server_url: &str,
        field: &str,
        timeout: Option<Duration>,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Self {
            agent: builder.build(),
            server_url: server_url.to_string(),
            field: field.to_string(),
            logger: logger.with_namespace("uploader"),
        }
    }
}

/// `multipart/form-data` body with a single `image/png` file part.
pub fn multipart_body(boundary: &str, field: &str, filename: &str, png: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(png.len() + 256);
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
    body.extend_from_slice(png);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}

impl Uploader for UploaderHttp {
    fn upload(
        &self,
        filename: &str,
        png: Vec<u8>,
    ) -> Result<serde_json::Value, Box<dyn Error + Send + Sync>> {
        let boundary = format!("capture-station-{:016x}", rand::random::<u64>());
        let body = multipart_body(&boundary, &self.field, filename, &png);

        let response = self
            .agent
            .post(&self.server_url)
            .set(
                "Content-Type",
                &format!("multipart/form-data; boundary={}", boundary),
            )
            .send_bytes(&body);
        // Error statuses still carry a body; only the JSON decides the outcome.
        let response = match response {
            Ok(response) | Err(ureq::Error::Status(_, response)) => response,
            Err(e) => return Err(format!("Failed to send {}: {}", filename, e).into()),
        };
        let status = response.status();
        let reply = response
            .into_json::<serde_json::Value>()
            .map_err(|e| format!("Invalid response for {} ({}): {}", filename, status, e))?;

        self.logger.info(&format!(
            "Sent {} ({} bytes): {}",
            filename,
            png.len(),
            status
        ))?;

        Ok(reply)
    }
}
