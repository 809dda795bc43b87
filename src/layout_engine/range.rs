use serde::Serialize;

use super::utils::round_half;

/// Horizontal interval in grid coordinates, `[left, right)`.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XRange {
    pub left: i32,
    pub right: i32,
}

impl XRange {
    pub const fn new(left: i32, width: i32) -> Self { Self { left, right: left + width } }

    pub const fn between(left: i32, right: i32) -> Self { Self { left, right } }

    pub fn width(&self) -> i32 { self.right - self.left }

    /// Center rounded half up.
    pub fn center(&self) -> i32 { round_half(self.left + self.right) }

    pub fn contains(&self, other: XRange) -> bool {
        other.left >= self.left && other.right <= self.right
    }

    pub fn overlaps(&self, other: XRange) -> bool {
        other.right > self.left && other.left < self.right
    }

    pub fn union(self, other: XRange) -> XRange {
        XRange::between(self.left.min(other.left), self.right.max(other.right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_and_overlap() {
        let view = XRange::new(100, 500);
        assert!(view.contains(XRange::new(100, 500)));
        assert!(!view.contains(XRange::new(99, 10)));
        assert!(view.overlaps(XRange::new(590, 50)));
        assert!(!view.overlaps(XRange::new(600, 50)));
        assert!(!view.overlaps(XRange::new(0, 100)));
        assert_eq!(view.center(), 350);
        assert_eq!(XRange::new(0, 3).center(), 2);
        assert_eq!(XRange::new(0, 10).union(XRange::new(40, 10)), XRange::between(0, 50));
    }
}
