pub mod impl_fake;
pub mod impl_script;
pub mod interface;
