//! Holds the actuator PWM line high for the configured duration.

use capture_station::pwm::{PwmChannel, PwmPulseConfig};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = PwmPulseConfig::load()?;
    let channel = PwmChannel::new(config.chip_path.clone(), config.channel);

    println!(
        "PWM {} channel {}: period {}ns duty {}ns {} for {:?}",
        config.chip_path.display(),
        config.channel,
        config.period_ns,
        config.duty_cycle_ns,
        config.polarity.as_str(),
        config.duration
    );
    channel.pulse(&config, std::thread::sleep)?;
    println!("PWM disabled");

    Ok(())
}
