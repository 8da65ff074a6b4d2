pub mod agent;
pub mod config;
pub mod display;
pub mod format;
pub mod sampler;
pub mod store;
