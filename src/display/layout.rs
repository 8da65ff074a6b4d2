use super::snapshot::{Display, Rect};

/// A display mapped into unit-square coordinates for layout previews.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedDisplay {
    pub id: u32,
    pub name: String,
    pub is_main: bool,
    pub rect: Rect,
}

/// Maps a display list into [0,1]x[0,1] for visualization.
///
/// The source geometry is bottom-left-origin desktop coordinates; the output
/// is top-left-origin, so the Y axis is flipped. When the combined bounding
/// box has no spread on either axis (a single malformed entry, say) every
/// display is placed in a fixed default rectangle instead of dividing by the
/// zero span. Pure function: the same input list always yields the same
/// placement.
pub fn normalize(displays: &[Display]) -> Vec<PlacedDisplay> {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for display in displays {
        min_x = min_x.min(display.bounds.x);
        min_y = min_y.min(display.bounds.y);
        max_x = max_x.max(display.bounds.x + display.bounds.width);
        max_y = max_y.max(display.bounds.y + display.bounds.height);
    }

    let span_x = max_x - min_x;
    let span_y = max_y - min_y;
    if !(span_x > 0.0) || !(span_y > 0.0) {
        return displays
            .iter()
            .enumerate()
            .map(|(index, display)| PlacedDisplay {
                id: display.id,
                name: display.name.clone(),
                is_main: display.is_main,
                rect: Rect::new(index as f64 * 0.1, 0.1, 0.4, 0.6),
            })
            .collect();
    }

    displays
        .iter()
        .map(|display| PlacedDisplay {
            id: display.id,
            name: display.name.clone(),
            is_main: display.is_main,
            rect: Rect::new(
                (display.bounds.x - min_x) / span_x,
                1.0 - ((display.bounds.y + display.bounds.height - min_y) / span_y),
                display.bounds.width / span_x,
                display.bounds.height / span_y,
            ),
        })
        .collect()
}
