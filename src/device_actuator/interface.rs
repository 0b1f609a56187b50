/// Runs one full actuator cycle and blocks until it is over.
pub trait DeviceActuator {
    fn actuate(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
