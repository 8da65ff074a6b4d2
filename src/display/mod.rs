pub mod layout;
pub mod platform;
pub mod sampler;
pub mod snapshot;
