pub mod acquisition;
pub mod capture_station;
pub mod config;
pub mod device_actuator;
pub mod device_camera;
pub mod device_display;
pub mod library;
pub mod pwm;
pub mod uploader;
