use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// Point-in-time display topology, persisted as `displays.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySnapshot {
    pub version: u32,
    pub timestamp: DateTime<Utc>,
    /// Active displays, sorted by ascending id.
    pub displays: Vec<Display>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Display {
    pub id: u32,
    pub name: String,
    pub is_main: bool,
    pub is_builtin: bool,
    pub pixel_size: Size,
    pub point_size: Size,
    /// Pixel/point ratio.
    pub scale: f64,
    /// Absolute frame in the shared desktop coordinate space.
    pub bounds: Rect,
    /// Id of the display this one mirrors, if any.
    pub mirrored_to: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn built_in() -> Display {
        Display {
            id: 1,
            name: "Built-in".to_string(),
            is_main: true,
            is_builtin: true,
            pixel_size: Size {
                width: 2880.0,
                height: 1800.0,
            },
            point_size: Size {
                width: 1440.0,
                height: 900.0,
            },
            scale: 2.0,
            bounds: Rect::new(0.0, 0.0, 1440.0, 900.0),
            mirrored_to: None,
        }
    }

    #[test]
    fn json_round_trip() {
        let snapshot = DisplaySnapshot {
            version: SCHEMA_VERSION,
            timestamp: Utc::now(),
            displays: vec![built_in()],
        };
        let encoded = serde_json::to_string(&snapshot).unwrap();
        let decoded: DisplaySnapshot = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn wire_format_matches_schema() {
        let value = serde_json::to_value(built_in()).unwrap();
        assert_eq!(value["isMain"], true);
        assert_eq!(value["isBuiltin"], true);
        assert_eq!(value["pixelSize"]["width"], 2880.0);
        assert_eq!(value["pointSize"]["height"], 900.0);
        // Unmirrored displays encode an explicit null.
        assert!(value["mirroredTo"].is_null());
        assert!(value.as_object().unwrap().contains_key("mirroredTo"));
    }
}
