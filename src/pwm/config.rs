use crate::config::CONFIG_ENV;
use crate::pwm::channel::Polarity;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PwmPulseConfig {
    pub chip_path: PathBuf,
    pub channel: u32,
    pub period_ns: u64,
    pub duty_cycle_ns: u64,
    pub polarity: Polarity,
    pub duration: Duration,
}

impl Default for PwmPulseConfig {
    fn default() -> Self {
        Self {
            chip_path: PathBuf::from("/sys/class/pwm/pwmchip0"),
            channel: 1,
            period_ns: 10_000_000,
            duty_cycle_ns: 5_000_000,
            polarity: Polarity::Normal,
            duration: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PwmFile {
    chip_path: Option<PathBuf>,
    channel: Option<u32>,
    period_ns: Option<u64>,
    duty_cycle_ns: Option<u64>,
    polarity: Option<Polarity>,
    duration_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    pwm: PwmFile,
}

impl PwmPulseConfig {
    /// Reads the `pwm` section of the station config file, if one is set.
    pub fn load() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_json(&std::fs::read_to_string(path)?),
            None => Ok(Self::default()),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let file: ConfigFile = serde_json::from_str(text)?;
        let pwm = file.pwm;
        let default = Self::default();

        if pwm.duty_cycle_ns.unwrap_or(default.duty_cycle_ns)
            > pwm.period_ns.unwrap_or(default.period_ns)
        {
            return Err("pwm duty_cycle_ns must not exceed period_ns".into());
        }

        Ok(Self {
            chip_path: pwm.chip_path.unwrap_or(default.chip_path),
            channel: pwm.channel.unwrap_or(default.channel),
            period_ns: pwm.period_ns.unwrap_or(default.period_ns),
            duty_cycle_ns: pwm.duty_cycle_ns.unwrap_or(default.duty_cycle_ns),
            polarity: pwm.polarity.unwrap_or(default.polarity),
            duration: pwm
                .duration_ms
                .map(Duration::from_millis)
                .unwrap_or(default.duration),
        })
    }
}

#[cfg(test)]
mod config_test {
    use super::*;

    #[test]
    fn test_defaults_without_pwm_section() {
        let config = PwmPulseConfig::from_json(r#"{ "max_images": 3 }"#).unwrap();

        assert_eq!(config.chip_path, PathBuf::from("/sys/class/pwm/pwmchip0"));
        assert_eq!(config.channel, 1);
        assert_eq!(config.duration, Duration::from_secs(60));
    }

    #[test]
    fn test_pwm_section() {
        let config = PwmPulseConfig::from_json(
            r#"{ "pwm": { "chip_path": "/sys/class/pwm/pwmchip22", "channel": 1,
                          "polarity": "inversed", "duration_ms": 6000 } }"#,
        )
        .unwrap();

        assert_eq!(config.chip_path, PathBuf::from("/sys/class/pwm/pwmchip22"));
        assert_eq!(config.polarity, Polarity::Inversed);
        assert_eq!(config.duration, Duration::from_secs(6));
    }

    #[test]
    fn test_duty_cycle_longer_than_period_is_rejected() {
        let result = PwmPulseConfig::from_json(
            r#"{ "pwm": { "period_ns": 1000, "duty_cycle_ns": 2000 } }"#,
        );

        assert!(result.is_err());
    }
}
