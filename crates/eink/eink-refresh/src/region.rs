//! Region math for IT8951 partial writes
//!
//! The controller loads image data in fixed-size blocks. A write whose edges
//! are not block-aligned either corrupts the neighbouring pixels in the same
//! block or is refused, so every damage rectangle is expanded outward to the
//! write granularity before it is captured.

use eink_specs::Geometry;
use platform::Rect;

/// Round `value` down to a multiple of `granularity`
///
/// A granularity of zero is treated as one.
///
/// # Examples
/// ```
/// # use eink_refresh::region::align_down;
/// assert_eq!(align_down(0, 32), 0);
/// assert_eq!(align_down(31, 32), 0);
/// assert_eq!(align_down(40, 32), 32);
/// ```
// SAFETY: granularity >= 1; (value / g) * g <= value, cannot overflow.
#[allow(clippy::arithmetic_side_effects)]
pub fn align_down(value: u32, granularity: u32) -> u32 {
    let g = granularity.max(1);
    (value / g) * g
}

/// Round `value` up to a multiple of `granularity`
///
/// Saturates at `u32::MAX`; panel coordinates never get near it.
///
/// # Examples
/// ```
/// # use eink_refresh::region::align_up;
/// assert_eq!(align_up(0, 32), 0);
/// assert_eq!(align_up(1, 32), 32);
/// assert_eq!(align_up(40, 32), 64);
/// assert_eq!(align_up(64, 32), 64);
/// ```
pub fn align_up(value: u32, granularity: u32) -> u32 {
    let g = granularity.max(1);
    value.div_ceil(g).saturating_mul(g)
}

/// True if `value` sits on a block boundary
pub fn is_aligned(value: u32, granularity: u32) -> bool {
    value.checked_rem(granularity.max(1)) == Some(0)
}

/// Expand a rectangle outward to the write granularity
///
/// Left and top round down, right and bottom round up, so the result always
/// contains the input.
///
/// # Examples
/// ```
/// # use eink_refresh::region::align_outward;
/// # use platform::Rect;
/// let damage = Rect::new(0, 0, 40, 40).unwrap();
/// assert_eq!(align_outward(&damage, 32), Rect::new(0, 0, 64, 64).unwrap());
/// ```
pub fn align_outward(rect: &Rect, granularity: u32) -> Rect {
    // Rounding moves edges away from each other, so the result is never
    // degenerate; fall back to the input rather than unwrap.
    Rect::new(
        align_down(rect.left(), granularity),
        align_down(rect.top(), granularity),
        align_up(rect.right(), granularity),
        align_up(rect.bottom(), granularity),
    )
    .unwrap_or(*rect)
}

/// Smallest rectangle containing both inputs
pub fn union(a: &Rect, b: &Rect) -> Rect {
    Rect::new(
        a.left().min(b.left()),
        a.top().min(b.top()),
        a.right().max(b.right()),
        a.bottom().max(b.bottom()),
    )
    .unwrap_or(*a)
}

/// Intersect a rectangle with the panel area
///
/// Returns `None` if nothing of `rect` lies on the panel.
pub fn clamp_to(rect: &Rect, bounds: Geometry) -> Option<Rect> {
    Rect::new(
        rect.left(),
        rect.top(),
        rect.right().min(bounds.width),
        rect.bottom().min(bounds.height),
    )
    .ok()
}

/// Align to the granularity, then clip to the panel
///
/// Edges that end up on the panel border keep the border value even when it
/// is not a block multiple: the controller accepts writes ending at its own
/// resolution.
pub fn prepare_write_area(rect: &Rect, granularity: u32, bounds: Geometry) -> Option<Rect> {
    let area = clamp_to(&align_outward(rect, granularity), bounds)?;
    // Clipping only ever moves the right and bottom edges.
    debug_assert!(is_aligned(area.left(), granularity) && is_aligned(area.top(), granularity));
    Some(area)
}
