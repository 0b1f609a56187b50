use crate::library::logger::interface::{join_namespace, Logger};
use chrono::Utc;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct LoggerConsole {
    namespace: Option<String>,
    timezone: chrono::FixedOffset,
}

impl LoggerConsole {
    pub fn new(timezone: chrono::FixedOffset) -> Self {
        Self {
            namespace: None,
            timezone,
        }
    }

    fn format_line(&self, level: &str, message: &str) -> String {
        let local_time = Utc::now().with_timezone(&self.timezone);
        let formatted = local_time.format("%Y-%m-%d %H:%M:%S%.3f");
        match &self.namespace {
            Some(namespace) => format!("[{}] {} {}: {}", formatted, level, namespace, message),
            None => format!("[{}] {} {}", formatted, level, message),
        }
    }
}

impl Logger for LoggerConsole {
    fn info(&self, message: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        println!("{}", self.format_line("INFO", message));
        Ok(())
    }

    fn error(&self, message: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        eprintln!("{}", self.format_line("ERROR", message));
        Ok(())
    }

    fn with_namespace(&self, namespace: &str) -> Arc<dyn Logger + Send + Sync> {
        Arc::new(LoggerConsole {
            namespace: Some(join_namespace(&self.namespace, namespace)),
            timezone: self.timezone,
        })
    }
}
