use crate::common::config::GapSettings;
use crate::sys::geometry::Rect;

/// Shrinks the placement area by the outer gaps.
pub fn compute_tiling_area(screen: Rect, gaps: &GapSettings) -> Rect {
    let outer = &gaps.outer;
    if outer.top == 0 && outer.left == 0 && outer.bottom == 0 && outer.right == 0 {
        return screen;
    }
    let left = screen.left() + outer.left;
    let right = screen.right() - outer.right;
    let top = screen.top() + outer.top;
    let bottom = screen.bottom() - outer.bottom;
    Rect::new(left, top, (right - left).max(0), (bottom - top).max(0))
}

/// `round(doubled / 2)` with halves rounded towards positive infinity.
pub fn round_half(doubled: i32) -> i32 { (doubled + 1).div_euclid(2) }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::{InnerGaps, OuterGaps};

    #[test]
    fn tiling_area_respects_outer_gaps() {
        let gaps = GapSettings {
            outer: OuterGaps { top: 10, left: 20, bottom: 30, right: 40 },
            inner: InnerGaps::default(),
        };
        let area = compute_tiling_area(Rect::new(0, 0, 1000, 800), &gaps);
        assert_eq!(area, Rect::new(20, 10, 940, 760));

        let none = GapSettings {
            outer: OuterGaps { top: 0, left: 0, bottom: 0, right: 0 },
            inner: InnerGaps::default(),
        };
        assert_eq!(compute_tiling_area(Rect::new(5, 5, 10, 10), &none), Rect::new(5, 5, 10, 10));
    }

    #[test]
    fn halves_round_up() {
        assert_eq!(round_half(5), 3);
        assert_eq!(round_half(-5), -2);
        assert_eq!(round_half(-3), -1);
        assert_eq!(round_half(4), 2);
    }
}
