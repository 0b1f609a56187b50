use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming an optional JSON file with overrides.
pub const CONFIG_ENV: &str = "CAPTURE_STATION_CONFIG";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_url: String,
    pub max_images: u32,
    pub capture_interval: Duration,
    pub tick_rate: Duration,
    pub frame_interval: Duration,
    pub device_id: String,
    pub cameras: Vec<(String, PathBuf)>,
    pub camera_resolution: (u32, u32),
    pub camera_exposure: Option<i64>,
    /// `None` publishes preview frames at capture resolution.
    pub preview_size: Option<(u32, u32)>,
    pub actuator_script_path: PathBuf,
    pub actuator_use_sudo: bool,
    pub upload_field: String,
    /// `None` waits on the server indefinitely.
    pub upload_timeout: Option<Duration>,
    pub filename_prefix: String,
    pub logger_timezone: chrono::FixedOffset,
    pub headless: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://192.168.83.135:5000/upload".to_string(),
            max_images: 60,
            capture_interval: Duration::from_secs(1),
            tick_rate: Duration::from_millis(250),
            frame_interval: Duration::from_millis(30),
            device_id: "9f7f9c0b-bd09-53db-9a2b-20daffdb4028".to_string(),
            cameras: vec![
                (
                    "9f7f9c0b-bd09-53db-9a2b-20daffdb4028".to_string(),
                    PathBuf::from("/dev/video0"),
                ),
                (
                    "48b5ddac-a396-5275-b6cb-32edddb4b5bf".to_string(),
                    PathBuf::from("/dev/video1"),
                ),
            ],
            camera_resolution: (640, 480),
            camera_exposure: Some(400),
            preview_size: Some((420, 180)),
            actuator_script_path: PathBuf::from("/usr/local/bin/pwm-pulse"),
            actuator_use_sudo: true,
            upload_field: "images".to_string(),
            upload_timeout: Some(Duration::from_secs(5)),
            filename_prefix: "image".to_string(),
            logger_timezone: china_standard_time(),
            headless: false,
        }
    }
}

fn china_standard_time() -> chrono::FixedOffset {
    chrono::FixedOffset::east_opt(8 * 3600).unwrap()
}

/// Overrides read from the config file. Durations are in milliseconds.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    server_url: Option<String>,
    max_images: Option<u32>,
    capture_interval_ms: Option<u64>,
    tick_rate_ms: Option<u64>,
    frame_interval_ms: Option<u64>,
    device_id: Option<String>,
    cameras: Option<BTreeMap<String, PathBuf>>,
    camera_width: Option<u32>,
    camera_height: Option<u32>,
    camera_exposure: Option<i64>,
    preview_width: Option<u32>,
    preview_height: Option<u32>,
    preview_full_size: Option<bool>,
    actuator_script_path: Option<PathBuf>,
    actuator_use_sudo: Option<bool>,
    upload_field: Option<String>,
    /// 0 disables the timeout.
    upload_timeout_ms: Option<u64>,
    filename_prefix: Option<String>,
    utc_offset_minutes: Option<i32>,
    headless: Option<bool>,
}

impl Config {
    pub fn load() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                let text = std::fs::read_to_string(&path).map_err(|e| {
                    format!("cannot read config {}: {}", PathBuf::from(&path).display(), e)
                })?;
                Self::from_json(&text)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let file: ConfigFile = serde_json::from_str(text)?;
        let mut config = Self::default();
        config.apply(file)?;
        Ok(config)
    }

    fn apply(&mut self, file: ConfigFile) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(server_url) = file.server_url {
            self.server_url = server_url;
        }
        if let Some(max_images) = file.max_images {
            self.max_images = max_images;
        }
        if let Some(ms) = file.capture_interval_ms {
            self.capture_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = file.tick_rate_ms {
            self.tick_rate = Duration::from_millis(ms);
        }
        if let Some(ms) = file.frame_interval_ms {
            self.frame_interval = Duration::from_millis(ms);
        }
        if let Some(device_id) = file.device_id {
            self.device_id = device_id;
        }
        if let Some(cameras) = file.cameras {
            self.cameras = cameras.into_iter().collect();
        }
        if let Some(width) = file.camera_width {
            self.camera_resolution.0 = width;
        }
        if let Some(height) = file.camera_height {
            self.camera_resolution.1 = height;
        }
        if file.camera_exposure.is_some() {
            self.camera_exposure = file.camera_exposure;
        }
        if file.preview_full_size == Some(true) {
            self.preview_size = None;
        } else if let (Some(width), Some(height)) = (file.preview_width, file.preview_height) {
            self.preview_size = Some((width, height));
        }
        if let Some(path) = file.actuator_script_path {
            self.actuator_script_path = path;
        }
        if let Some(use_sudo) = file.actuator_use_sudo {
            self.actuator_use_sudo = use_sudo;
        }
        if let Some(field) = file.upload_field {
            self.upload_field = field;
        }
        match file.upload_timeout_ms {
            Some(0) => self.upload_timeout = None,
            Some(ms) => self.upload_timeout = Some(Duration::from_millis(ms)),
            None => {}
        }
        if let Some(prefix) = file.filename_prefix {
            self.filename_prefix = prefix;
        }
        if let Some(minutes) = file.utc_offset_minutes {
            self.logger_timezone = chrono::FixedOffset::east_opt(minutes * 60)
                .ok_or_else(|| format!("utc_offset_minutes out of range: {}", minutes))?;
        }
        if let Some(headless) = file.headless {
            self.headless = headless;
        }
        Ok(())
    }
}

#[cfg(test)]
mod config_test {
    use super::*;

    #[test]
    fn test_empty_file_keeps_defaults() {
        let config = Config::from_json("{}").unwrap();
        let default = Config::default();

        assert_eq!(config.server_url, default.server_url);
        assert_eq!(config.max_images, 60);
        assert_eq!(config.capture_interval, Duration::from_secs(1));
        assert_eq!(config.upload_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.preview_size, Some((420, 180)));
        assert_eq!(config.cameras.len(), 2);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_json(
            r#"{
                "server_url": "http://10.0.0.2:5000/upload",
                "max_images": 5,
                "capture_interval_ms": 250,
                "upload_timeout_ms": 0,
                "preview_full_size": true,
                "cameras": { "front": "/dev/video2" },
                "device_id": "front",
                "utc_offset_minutes": -420,
                "unknown_key": 1
            }"#,
        )
        .unwrap();

        assert_eq!(config.server_url, "http://10.0.0.2:5000/upload");
        assert_eq!(config.max_images, 5);
        assert_eq!(config.capture_interval, Duration::from_millis(250));
        assert_eq!(config.upload_timeout, None);
        assert_eq!(config.preview_size, None);
        assert_eq!(
            config.cameras,
            vec![("front".to_string(), PathBuf::from("/dev/video2"))]
        );
        assert_eq!(config.device_id, "front");
        assert_eq!(config.logger_timezone.local_minus_utc(), -420 * 60);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(Config::from_json("{ not json").is_err());
        assert!(Config::from_json(r#"{ "max_images": "many" }"#).is_err());
    }

    #[test]
    fn test_out_of_range_offset_is_an_error() {
        assert!(Config::from_json(r#"{ "utc_offset_minutes": 100000 }"#).is_err());
    }
}
