//! Rectangle type for UI layout

/// A rectangle defined by position and size
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Shrink by padding on all sides
    pub fn pad(&self, padding: f32) -> Self {
        Self::new(
            self.x + padding,
            self.y + padding,
            (self.w - padding * 2.0).max(0.0),
            (self.h - padding * 2.0).max(0.0),
        )
    }

    /// Split at a fixed pixel offset from the left, returns (left, right)
    pub fn split_h_px(&self, pixels: f32) -> (Self, Self) {
        let split_x = pixels.clamp(0.0, self.w);
        (
            Self::new(self.x, self.y, split_x, self.h),
            Self::new(self.x + split_x, self.y, self.w - split_x, self.h),
        )
    }

    /// Top strip of the given height
    pub fn slice_top(&self, height: f32) -> Self {
        Self::new(self.x, self.y, self.w, height.min(self.h))
    }

    pub fn remaining_after_top(&self, height: f32) -> Self {
        let h = height.min(self.h);
        Self::new(self.x, self.y + h, self.w, self.h - h)
    }

    /// Square handle in the bottom-right corner
    pub fn corner_handle(&self, size: f32) -> Self {
        Self::new(self.right() - size, self.bottom() - size, size, size)
    }

    /// Successive rows of fixed height, stopping at the bottom edge
    pub fn rows(&self, row_height: f32) -> impl Iterator<Item = Rect> + '_ {
        let count = if row_height > 0.0 { (self.h / row_height).floor() as usize } else { 0 };
        (0..count).map(move |i| Rect::new(self.x, self.y + i as f32 * row_height, self.w, row_height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_half_open() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert!(r.contains(10.0, 20.0));
        assert!(!r.contains(110.0, 40.0));
        assert!(!r.contains(50.0, 70.0));
    }

    #[test]
    fn test_split_and_slice() {
        let r = Rect::new(0.0, 0.0, 100.0, 50.0);
        let (left, right) = r.split_h_px(30.0);
        assert_eq!(left.w, 30.0);
        assert_eq!(right.x, 30.0);
        assert_eq!(r.remaining_after_top(20.0), Rect::new(0.0, 20.0, 100.0, 30.0));
        assert_eq!(r.corner_handle(8.0), Rect::new(92.0, 42.0, 8.0, 8.0));
    }

    #[test]
    fn test_rows_fit_inside() {
        let r = Rect::new(0.0, 0.0, 10.0, 55.0);
        let rows: Vec<Rect> = r.rows(10.0).collect();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[4].y, 40.0);
        assert_eq!(r.rows(0.0).count(), 0);
    }
}
