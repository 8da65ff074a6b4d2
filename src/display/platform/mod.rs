use super::sampler::{DisplayError, DisplayProbe, RawDisplay};

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;

/// Live display enumeration for the running host.
#[derive(Default)]
pub struct SystemDisplayProbe;

impl SystemDisplayProbe {
    pub fn new() -> Self {
        Self
    }
}

impl DisplayProbe for SystemDisplayProbe {
    fn enumerate(&mut self) -> Result<Vec<RawDisplay>, DisplayError> {
        platform_impl::enumerate()
    }
}
