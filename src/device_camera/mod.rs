pub mod impl_fake;
pub mod impl_v4l;
pub mod interface;
pub mod registry;

#[cfg(test)]
mod tests;
