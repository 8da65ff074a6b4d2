pub mod history;
pub mod platform;
pub mod snapshot;
pub mod stats;
