//! Details-block placement.
//!
//! Chooses a rectangle for a project's details block that avoids its list
//! block and stays inside the canvas. Attempts run in a fixed order — right,
//! left, below, above — and the first direction with room for the minimum
//! size wins; otherwise the block is centered. The function is total: any
//! input, including a zero-sized container, yields finite geometry.

use crate::common::config::LayoutSettings;
use crate::geometry::{Rect, Size, clamp_dim, clamp_pos};

/// Compute where the details block goes, relative to `list`.
///
/// `previous` carries the user's last details geometry so its size is reused
/// when it fits; `container` is the current canvas size, or `None` before the
/// host has measured it (the configured fallback viewport stands in).
pub fn place_details_block(
    list: Rect,
    previous: Option<Rect>,
    container: Option<Size>,
    settings: &LayoutSettings,
) -> Rect {
    let container = container.unwrap_or(settings.fallback_viewport);
    let preferred = previous.map(|r| r.size()).unwrap_or(settings.details_preferred);

    let pad = settings.padding;
    let gap = settings.gap;
    let min = settings.details_min;

    // What "minimum" means once the container itself is cramped: shrink the
    // minimum down to what the container can offer, but never below the floor.
    let eff_min = Size::new(
        settings.details_floor.width.max(min.width.min(container.width - 2.0 * pad)),
        settings.details_floor.height.max(min.height.min(container.height - 2.0 * pad)),
    );

    // Right of the list block.
    let avail = container.width - pad - (list.max_x() + gap);
    if avail >= min.width {
        let width = clamp_dim(preferred.width, eff_min.width, avail);
        let (y, height) = cross_vertical(list, container, preferred, eff_min, pad);
        return Rect::new(list.max_x() + gap, y, width, height);
    }

    // Left.
    let avail = list.x - pad - gap;
    if avail >= min.width {
        let width = clamp_dim(preferred.width, eff_min.width, avail);
        let (y, height) = cross_vertical(list, container, preferred, eff_min, pad);
        return Rect::new(list.x - gap - width, y, width, height);
    }

    // Below.
    let avail = container.height - pad - (list.max_y() + gap);
    if avail >= min.height {
        let height = clamp_dim(preferred.height, eff_min.height, avail);
        let (x, width) = cross_horizontal(list, container, preferred, eff_min, pad);
        return Rect::new(x, list.max_y() + gap, width, height);
    }

    // Above.
    let avail = list.y - pad - gap;
    if avail >= min.height {
        let height = clamp_dim(preferred.height, eff_min.height, avail);
        let (x, width) = cross_horizontal(list, container, preferred, eff_min, pad);
        return Rect::new(x, list.y - gap - height, width, height);
    }

    centered(container, preferred, eff_min, pad)
}

/// Vertical extent for a horizontal (left/right) placement: align with the
/// list block's top, then clamp so the block stays inside the padding bounds.
fn cross_vertical(
    list: Rect,
    container: Size,
    preferred: Size,
    eff_min: Size,
    pad: f64,
) -> (f64, f64) {
    let anchor = list.y.max(pad);
    let avail = container.height - pad - anchor;
    let height = clamp_dim(preferred.height, eff_min.height, avail);
    let y = clamp_pos(anchor, pad, container.height - pad - height);
    (y, height)
}

fn cross_horizontal(
    list: Rect,
    container: Size,
    preferred: Size,
    eff_min: Size,
    pad: f64,
) -> (f64, f64) {
    let anchor = list.x.max(pad);
    let avail = container.width - pad - anchor;
    let width = clamp_dim(preferred.width, eff_min.width, avail);
    let x = clamp_pos(anchor, pad, container.width - pad - width);
    (x, width)
}

fn centered(container: Size, preferred: Size, eff_min: Size, pad: f64) -> Rect {
    let width = clamp_dim(preferred.width, eff_min.width, container.width - 2.0 * pad);
    let height = clamp_dim(preferred.height, eff_min.height, container.height - 2.0 * pad);
    let x = clamp_pos((container.width - width) / 2.0, pad, container.width - pad - width);
    let y = clamp_pos((container.height - height) / 2.0, pad, container.height - pad - height);
    Rect::new(x, y, width, height)
}
