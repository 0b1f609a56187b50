use crate::pwm::config::PwmPulseConfig;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    #[default]
    Normal,
    Inversed,
}

impl Polarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Polarity::Normal => "normal",
            Polarity::Inversed => "inversed",
        }
    }
}

/// One channel of a `/sys/class/pwm/pwmchipN` controller. Writes are not
/// read back.
#[derive(Debug, Clone)]
pub struct PwmChannel {
    chip: PathBuf,
    channel: u32,
}

impl PwmChannel {
    pub fn new(chip: impl Into<PathBuf>, channel: u32) -> Self {
        Self {
            chip: chip.into(),
            channel,
        }
    }

    pub fn channel_dir(&self) -> PathBuf {
        self.chip.join(format!("pwm{}", self.channel))
    }

    /// The existence check and the export write are not atomic.
    pub fn export(&self) -> io::Result<()> {
        if self.channel_dir().exists() {
            return Ok(());
        }
        write_value(&self.chip.join("export"), &self.channel.to_string())
    }

    pub fn configure(&self, period_ns: u64, duty_cycle_ns: u64, polarity: Polarity) -> io::Result<()> {
        let dir = self.channel_dir();
        write_value(&dir.join("period"), &period_ns.to_string())?;
        write_value(&dir.join("duty_cycle"), &duty_cycle_ns.to_string())?;
        write_value(&dir.join("polarity"), polarity.as_str())
    }

    pub fn enable(&self) -> io::Result<()> {
        write_value(&self.channel_dir().join("enable"), "1")
    }

    pub fn disable(&self) -> io::Result<()> {
        write_value(&self.channel_dir().join("enable"), "0")
    }

    /// Export, configure, enable, hold for `config.duration`, disable.
    pub fn pulse<S>(&self, config: &PwmPulseConfig, sleep: S) -> io::Result<()>
    where
        S: FnOnce(Duration),
    {
        self.export()?;
        self.configure(config.period_ns, config.duty_cycle_ns, config.polarity)?;
        self.enable()?;
        sleep(config.duration);
        self.disable()
    }
}

fn write_value(path: &Path, value: &str) -> io::Result<()> {
    fs::write(path, value).map_err(|e| io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))
}
