//! Kernel sysfs PWM control, used by the `pwm-pulse` actuator program.

mod channel;
mod config;

pub use channel::{Polarity, PwmChannel};
pub use config::PwmPulseConfig;
