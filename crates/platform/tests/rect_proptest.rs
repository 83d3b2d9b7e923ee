//! Property tests for the validated rectangle type.
// Integration test file: expect/unwrap/panic are intentional test mechanisms.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation
)]

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;
use platform::display::{check_draw_area, packed_len};
use platform::{Geometry, Rect};
use proptest::prelude::*;

// ── Construction ─────────────────────────────────────────────────────────────

#[test]
fn zero_width_or_height_rejected() {
    assert!(Rect::new(0, 0, 0, 10).is_err());
    assert!(Rect::new(5, 5, 10, 5).is_err());
    assert!(Rect::new(10, 0, 5, 10).is_err());
}

#[test]
fn origin_size_overflow_rejected() {
    assert!(Rect::from_origin_size(u32::MAX, 0, 1, 1).is_err());
}

proptest! {
    #[test]
    fn valid_edges_construct(l in 0u32..4096, t in 0u32..4096, w in 1u32..4096, h in 1u32..4096) {
        let r = Rect::new(l, t, l + w, t + h).unwrap();
        prop_assert_eq!(r.width(), w);
        prop_assert_eq!(r.height(), h);
        prop_assert_eq!(r.area(), u64::from(w) * u64::from(h));
        prop_assert_eq!(Rect::from_origin_size(l, t, w, h), Ok(r));
    }

    #[test]
    fn rect_contains_and_intersects_itself(l in 0u32..4096, t in 0u32..4096, w in 1u32..512, h in 1u32..512) {
        let r = Rect::new(l, t, l + w, t + h).unwrap();
        prop_assert!(r.contains_rect(&r));
        prop_assert!(r.intersects(&r));
    }

    #[test]
    fn side_by_side_rects_do_not_intersect(l in 0u32..4096, w in 1u32..512, h in 1u32..512) {
        let a = Rect::new(l, 0, l + w, h).unwrap();
        let b = Rect::new(l + w, 0, l + 2 * w, h).unwrap();
        prop_assert!(!a.intersects(&b));
        prop_assert!(!b.intersects(&a));
    }

    #[test]
    fn rectangle_conversion_preserves_extent(l in 0u32..4096, t in 0u32..4096, w in 1u32..512, h in 1u32..512) {
        let r = Rect::new(l, t, l + w, t + h).unwrap();
        let g: Rectangle = r.into();
        prop_assert_eq!(g.top_left, Point::new(l as i32, t as i32));
        prop_assert_eq!(g.size, Size::new(w, h));
    }

    #[test]
    fn draw_area_inside_panel_accepted(w in 1u32..256, h in 1u32..256) {
        let r = Rect::new(0, 0, w, h).unwrap();
        let buf = vec![0u8; packed_len(&r) as usize];
        prop_assert!(check_draw_area(Geometry::new(256, 256), &buf, r).is_ok());
    }
}
