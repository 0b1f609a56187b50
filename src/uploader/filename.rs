use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// `<prefix>_YYYYMMDD_HHMMSS_mmm.png`
pub fn generate_filename<Tz>(prefix: &str, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("{}_{}.png", prefix, now.format("%Y%m%d_%H%M%S_%3f"))
}
