/// Rectangle in window pixels, origin at the bottom left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Largest square that fits the window, centered on both axes.
    pub fn centered_square(width: u32, height: u32) -> Self {
        let side = width.min(height);

        Self {
            x: ((width - side) / 2) as i32,
            y: ((height - side) / 2) as i32,
            width: side as i32,
            height: side as i32,
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_window_centers_horizontally() {
        assert_eq!(
            Viewport::centered_square(1000, 600),
            Viewport::new(200, 0, 600, 600)
        );
    }

    #[test]
    fn tall_window_centers_vertically() {
        assert_eq!(
            Viewport::centered_square(600, 1000),
            Viewport::new(0, 200, 600, 600)
        );
    }

    #[test]
    fn square_window_fills_everything() {
        assert_eq!(
            Viewport::centered_square(800, 800),
            Viewport::new(0, 0, 800, 800)
        );
    }

    #[test]
    fn odd_difference_rounds_down() {
        assert_eq!(
            Viewport::centered_square(801, 800),
            Viewport::new(0, 0, 800, 800)
        );
        assert_eq!(Viewport::centered_square(803, 800).x, 1);
    }

    #[test]
    fn minimized_window_has_empty_viewport() {
        assert_eq!(Viewport::centered_square(0, 600), Viewport::new(0, 300, 0, 0));
    }

    #[test]
    fn contains_is_half_open() {
        let vp = Viewport::new(200, 0, 600, 600);

        assert!(vp.contains(200, 0));
        assert!(vp.contains(799, 599));
        assert!(!vp.contains(800, 0));
        assert!(!vp.contains(199, 10));
    }
}
