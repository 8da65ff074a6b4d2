use std::path::Path;

use super::super::sampler::{DisplayError, RawDisplay};
use super::super::snapshot::Rect;

const DRM_ROOT: &str = "/sys/class/drm";

/// Enumerates connected DRM connectors.
///
/// Without a display server there is no authoritative desktop arrangement,
/// so connected outputs are tiled left-to-right at the origin and the scale
/// is left to the pixel/point fallback. Connector names double as display
/// names ("eDP-1", "HDMI-A-1").
pub fn enumerate() -> Result<Vec<RawDisplay>, DisplayError> {
    enumerate_at(Path::new(DRM_ROOT))
}

fn enumerate_at(root: &Path) -> Result<Vec<RawDisplay>, DisplayError> {
    let entries = std::fs::read_dir(root)
        .map_err(|e| DisplayError::EnumerationFailed(format!("{}: {e}", root.display())))?;

    let mut connectors: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        // Connector directories look like "card0-HDMI-A-1"; bare "card0" is
        // the device node itself.
        .filter(|name| name.contains('-'))
        .collect();
    connectors.sort();

    let mut displays = Vec::new();
    let mut next_x = 0.0;
    for connector in connectors {
        let dir = root.join(&connector);
        let status = std::fs::read_to_string(dir.join("status")).unwrap_or_default();
        if status.trim() != "connected" {
            continue;
        }

        let (width, height) = std::fs::read_to_string(dir.join("modes"))
            .ok()
            .and_then(|modes| parse_mode(modes.lines().next()?))
            .unwrap_or((0.0, 0.0));

        let name = connector
            .split_once('-')
            .map(|(_, rest)| rest.to_string())
            .unwrap_or(connector);
        let is_builtin = ["eDP", "LVDS", "DSI"]
            .iter()
            .any(|prefix| name.starts_with(prefix));

        displays.push(RawDisplay {
            id: displays.len() as u32 + 1,
            name: Some(name),
            is_main: false,
            is_builtin,
            pixel_size: (width, height),
            point_size: None,
            reported_scale: None,
            bounds: Some(Rect::new(next_x, 0.0, width, height)),
            mirrored_to: None,
        });
        next_x += width;
    }

    // Primary display: the built-in panel when present, otherwise the first.
    let main_index = displays.iter().position(|d| d.is_builtin).unwrap_or(0);
    if let Some(main) = displays.get_mut(main_index) {
        main.is_main = true;
    }

    Ok(displays)
}

fn parse_mode(mode: &str) -> Option<(f64, f64)> {
    let (width, height) = mode.trim().split_once('x')?;
    Some((width.parse().ok()?, height.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_connector(root: &Path, name: &str, status: &str, mode: Option<&str>) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("status"), format!("{status}\n")).unwrap();
        if let Some(mode) = mode {
            std::fs::write(dir.join("modes"), format!("{mode}\n1280x720\n")).unwrap();
        }
    }

    #[test]
    fn connected_connectors_become_displays() {
        let root = tempfile::tempdir().unwrap();
        fake_connector(root.path(), "card0-eDP-1", "connected", Some("2880x1800"));
        fake_connector(root.path(), "card0-HDMI-A-1", "connected", Some("1920x1080"));
        fake_connector(root.path(), "card0-DP-1", "disconnected", None);
        std::fs::create_dir_all(root.path().join("card0")).unwrap();

        let displays = enumerate_at(root.path()).unwrap();
        assert_eq!(displays.len(), 2);

        let builtin = displays.iter().find(|d| d.is_builtin).unwrap();
        assert_eq!(builtin.name.as_deref(), Some("eDP-1"));
        assert!(builtin.is_main);
        assert_eq!(builtin.pixel_size, (2880.0, 1800.0));

        let external = displays.iter().find(|d| !d.is_builtin).unwrap();
        assert_eq!(external.name.as_deref(), Some("HDMI-A-1"));
        assert!(!external.is_main);
    }

    #[test]
    fn displays_are_tiled_left_to_right() {
        let root = tempfile::tempdir().unwrap();
        fake_connector(root.path(), "card0-DP-1", "connected", Some("2560x1440"));
        fake_connector(root.path(), "card0-DP-2", "connected", Some("1920x1080"));

        let displays = enumerate_at(root.path()).unwrap();
        let bounds: Vec<Rect> = displays.iter().map(|d| d.bounds.unwrap()).collect();
        assert_eq!(bounds[0].x, 0.0);
        assert_eq!(bounds[1].x, bounds[0].width);
    }

    #[test]
    fn first_display_is_main_without_a_builtin_panel() {
        let root = tempfile::tempdir().unwrap();
        fake_connector(root.path(), "card0-DP-1", "connected", Some("2560x1440"));
        fake_connector(root.path(), "card0-DP-2", "connected", Some("1920x1080"));

        let displays = enumerate_at(root.path()).unwrap();
        assert!(displays[0].is_main);
        assert!(!displays[1].is_main);
    }

    #[test]
    fn missing_root_is_an_enumeration_failure() {
        let err = enumerate_at(Path::new("/nonexistent/drm")).unwrap_err();
        assert!(matches!(err, DisplayError::EnumerationFailed(_)));
    }

    #[test]
    fn no_connected_connectors_yields_empty_list() {
        let root = tempfile::tempdir().unwrap();
        fake_connector(root.path(), "card0-DP-1", "disconnected", None);
        assert!(enumerate_at(root.path()).unwrap().is_empty());
    }
}
