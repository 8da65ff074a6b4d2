use super::super::sampler::{DisplayError, RawDisplay};
use super::super::snapshot::Rect;

#[repr(C)]
#[derive(Clone, Copy)]
struct CGPoint {
    x: f64,
    y: f64,
}

#[repr(C)]
#[derive(Clone, Copy)]
struct CGSize {
    width: f64,
    height: f64,
}

#[repr(C)]
#[derive(Clone, Copy)]
struct CGRect {
    origin: CGPoint,
    size: CGSize,
}

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGGetActiveDisplayList(
        max_displays: u32,
        active_displays: *mut u32,
        display_count: *mut u32,
    ) -> i32;
    fn CGDisplayBounds(display: u32) -> CGRect;
    fn CGDisplayPixelsWide(display: u32) -> usize;
    fn CGDisplayPixelsHigh(display: u32) -> usize;
    fn CGDisplayIsMain(display: u32) -> u32;
    fn CGDisplayIsBuiltin(display: u32) -> u32;
    fn CGDisplayMirrorsDisplay(display: u32) -> u32;
}

/// Enumerates active displays through CoreGraphics.
///
/// CGDisplayBounds reports point-space frames, so the point size comes from
/// the bounds and the scale from the pixel/point fallback. Human-readable
/// names need the AppKit screen list, which a headless agent avoids; the
/// synthetic "Display <id>" label covers it.
pub fn enumerate() -> Result<Vec<RawDisplay>, DisplayError> {
    // Two-stage listing: size the buffer first, then fetch the ids. Either
    // call failing is an enumeration failure.
    let mut count: u32 = 0;
    let result = unsafe { CGGetActiveDisplayList(0, std::ptr::null_mut(), &mut count) };
    if result != 0 {
        return Err(DisplayError::EnumerationFailed(format!(
            "CGGetActiveDisplayList(count) returned {result}"
        )));
    }

    let mut ids = vec![0u32; count as usize];
    let result = unsafe { CGGetActiveDisplayList(count, ids.as_mut_ptr(), &mut count) };
    if result != 0 {
        return Err(DisplayError::EnumerationFailed(format!(
            "CGGetActiveDisplayList returned {result}"
        )));
    }
    ids.truncate(count as usize);

    let displays = ids
        .iter()
        .map(|&id| {
            let bounds = unsafe { CGDisplayBounds(id) };
            let mirrored = unsafe { CGDisplayMirrorsDisplay(id) };
            RawDisplay {
                id,
                name: None,
                is_main: unsafe { CGDisplayIsMain(id) } != 0,
                is_builtin: unsafe { CGDisplayIsBuiltin(id) } != 0,
                pixel_size: (
                    unsafe { CGDisplayPixelsWide(id) } as f64,
                    unsafe { CGDisplayPixelsHigh(id) } as f64,
                ),
                point_size: Some((bounds.size.width, bounds.size.height)),
                reported_scale: None,
                bounds: Some(Rect::new(
                    bounds.origin.x,
                    bounds.origin.y,
                    bounds.size.width,
                    bounds.size.height,
                )),
                mirrored_to: (mirrored != 0).then_some(mirrored),
            }
        })
        .collect();

    Ok(displays)
}
