use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

/// Outer size of the drawing area, as reported by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Derived geometry of a chart: viewport plus margins.
///
/// Inner sizes never go negative; a viewport smaller than its margins collapses to zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Dimensions {
    pub viewport: Viewport,
    pub margins: Margins,
}

impl Dimensions {
    pub fn new(viewport: Viewport, margins: Margins) -> Self {
        Self { viewport, margins }
    }

    pub fn width(&self) -> f64 {
        self.viewport.width.max(0.0)
    }

    pub fn height(&self) -> f64 {
        self.viewport.height.max(0.0)
    }

    pub fn inner_width(&self) -> f64 {
        (self.width() - self.margins.left - self.margins.right).max(0.0)
    }

    pub fn inner_height(&self) -> f64 {
        (self.height() - self.margins.top - self.margins.bottom).max(0.0)
    }

    pub fn mid_width(&self) -> f64 {
        0.5 * self.width()
    }

    pub fn mid_height(&self) -> f64 {
        0.5 * self.height()
    }

    pub fn margin_left(&self) -> f64 {
        self.margins.left
    }

    pub fn margin_top(&self) -> f64 {
        self.margins.top
    }

    /// X coordinate of the right margin edge.
    pub fn margin_right(&self) -> f64 {
        self.width() - self.margins.right
    }

    /// Y coordinate of the bottom margin edge.
    pub fn margin_bottom(&self) -> f64 {
        self.height() - self.margins.bottom
    }

    pub fn mid_margin_left(&self) -> f64 {
        0.5 * self.margins.left
    }

    pub fn mid_margin_right(&self) -> f64 {
        self.width() - 0.5 * self.margins.right
    }

    pub fn mid_margin_top(&self) -> f64 {
        0.5 * self.margins.top
    }

    pub fn mid_margin_bottom(&self) -> f64 {
        self.height() - 0.5 * self.margins.bottom
    }

    pub fn mid_inner_width(&self) -> f64 {
        self.margins.left + 0.5 * self.inner_width()
    }

    pub fn mid_inner_height(&self) -> f64 {
        self.margins.top + 0.5 * self.inner_height()
    }

    /// Radius of the largest circle centered in the inner area.
    pub fn inner_radius(&self) -> f64 {
        0.5 * self.inner_width().min(self.inner_height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_getters() {
        let dims = Dimensions::new(Viewport::new(400.0, 300.0), Margins::new(40.0, 20.0, 80.0, 50.0));
        assert_eq!(dims.inner_width(), 330.0);
        assert_eq!(dims.inner_height(), 180.0);
        assert_eq!(dims.margin_right(), 380.0);
        assert_eq!(dims.margin_bottom(), 220.0);
        assert_eq!(dims.mid_margin_top(), 20.0);
        assert_eq!(dims.mid_margin_bottom(), 260.0);
        assert_eq!(dims.mid_inner_width(), 215.0);
    }

    #[test]
    fn test_zero_viewport_collapses() {
        let dims = Dimensions::new(Viewport::default(), Margins::new(10.0, 10.0, 10.0, 10.0));
        assert_eq!(dims.inner_width(), 0.0);
        assert_eq!(dims.inner_height(), 0.0);
        assert_eq!(dims.inner_radius(), 0.0);
    }
}
