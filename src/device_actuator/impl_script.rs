use crate::device_actuator::interface::DeviceActuator;
use crate::library::logger::interface::Logger;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

/// Runs the external actuator program, optionally through `sudo`.
pub struct DeviceActuatorScript {
    script_path: PathBuf,
    use_sudo: bool,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl DeviceActuatorScript {
    pub fn new(script_path: PathBuf, use_sudo: bool, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            script_path,
            use_sudo,
            logger: logger.with_namespace("actuator").with_namespace("script"),
        }
    }

    fn command(&self) -> Command {
        if self.use_sudo {
            let mut command = Command::new("sudo");
            command.arg(&self.script_path);
            command
        } else {
            Command::new(&self.script_path)
        }
    }
}

impl DeviceActuator for DeviceActuatorScript {
    /// The exit status is logged, never acted on.
    fn actuate(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if !self.script_path.exists() {
            return Err(format!("Script not found: {}", self.script_path.display()).into());
        }

        self.logger
            .info(&format!("Running {}", self.script_path.display()))?;
        let output = self.command().output()?;

        self.logger
            .info(&format!("Script exited with {}", output.status))?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines().filter(|line| !line.trim().is_empty()) {
            self.logger.error(line)?;
        }
        Ok(())
    }
}
