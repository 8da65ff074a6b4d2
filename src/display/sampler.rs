use chrono::Utc;
use thiserror::Error;

use super::snapshot::{Display, DisplaySnapshot, Rect, SCHEMA_VERSION, Size};

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("display enumeration failed: {0}")]
    EnumerationFailed(String),
}

/// A display as reported by the OS, before name/scale/bounds resolution.
#[derive(Clone, Debug, Default)]
pub struct RawDisplay {
    pub id: u32,
    pub name: Option<String>,
    pub is_main: bool,
    pub is_builtin: bool,
    pub pixel_size: (f64, f64),
    pub point_size: Option<(f64, f64)>,
    /// Scale as reported by the OS; preferred over the computed
    /// pixel/point ratio when present.
    pub reported_scale: Option<f64>,
    pub bounds: Option<Rect>,
    pub mirrored_to: Option<u32>,
}

/// Display enumeration source backing a [`TopologySampler`].
pub trait DisplayProbe {
    fn enumerate(&mut self) -> Result<Vec<RawDisplay>, DisplayError>;
}

/// Captures the attached-display topology as an immutable snapshot.
pub struct TopologySampler<P> {
    probe: P,
}

impl<P: DisplayProbe> TopologySampler<P> {
    pub fn new(probe: P) -> Self {
        Self { probe }
    }

    pub fn capture_snapshot(&mut self) -> Result<DisplaySnapshot, DisplayError> {
        let mut raw = self.probe.enumerate()?;
        // Sort by id for deterministic output across enumeration order.
        raw.sort_by_key(|display| display.id);

        let displays = raw.into_iter().map(resolve).collect();
        Ok(DisplaySnapshot {
            version: SCHEMA_VERSION,
            timestamp: Utc::now(),
            displays,
        })
    }
}

fn resolve(raw: RawDisplay) -> Display {
    let (pixel_width, pixel_height) = raw.pixel_size;
    let bounds = raw
        .bounds
        .unwrap_or_else(|| Rect::new(0.0, 0.0, pixel_width, pixel_height));
    let (point_width, point_height) = raw.point_size.unwrap_or((bounds.width, bounds.height));
    let fallback_scale = if point_width > 0.0 {
        pixel_width / point_width
    } else {
        1.0
    };

    Display {
        name: raw
            .name
            .unwrap_or_else(|| format!("Display {}", raw.id)),
        id: raw.id,
        is_main: raw.is_main,
        is_builtin: raw.is_builtin,
        pixel_size: Size {
            width: pixel_width,
            height: pixel_height,
        },
        point_size: Size {
            width: point_width,
            height: point_height,
        },
        scale: raw.reported_scale.unwrap_or(fallback_scale),
        bounds,
        mirrored_to: raw.mirrored_to,
    }
}
