//! Background camera loop: keeps the latest frame in a single slot, publishes
//! previews and turns capture requests into PNG payloads.

mod frame_slot;
mod worker;

pub use frame_slot::FrameSlot;
pub use worker::{spawn_acquisition, AcquisitionEvent, AcquisitionHandle, AcquisitionSettings};

#[cfg(test)]
mod worker_test;
