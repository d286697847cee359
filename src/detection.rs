//! Detection boxes and pixel-rectangle overlap.
//!
//! Overlap is measured on integer pixel rectangles. Each float coordinate is
//! truncated toward zero and the rectangle is canonicalized, so sub-pixel
//! differences never change whether two boxes count as duplicates.

/// Labeled axis-aligned box in original-image pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// Human-readable class name.
    pub label: String,
    /// Index into the label table.
    pub class_id: usize,
    /// Argmax class score for the anchor that produced this box.
    pub confidence: f32,
    /// Left edge.
    pub x1: f32,
    /// Top edge.
    pub y1: f32,
    /// Right edge.
    pub x2: f32,
    /// Bottom edge.
    pub y2: f32,
}

impl Detection {
    /// Returns the box with `x1 <= x2` and `y1 <= y2`.
    pub fn canonical(&self) -> Detection {
        Detection {
            x1: self.x1.min(self.x2),
            y1: self.y1.min(self.y2),
            x2: self.x1.max(self.x2),
            y2: self.y1.max(self.y2),
            ..self.clone()
        }
    }

    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).abs()
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).abs()
    }

    /// Float area of the canonical box.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Integer pixel rectangle used for overlap tests.
    pub fn pixel_rect(&self) -> PixelRect {
        PixelRect::from_corners(self.x1, self.y1, self.x2, self.y2)
    }

    /// Intersection-over-union with `other` on pixel rectangles.
    pub fn iou(&self, other: &Detection) -> f32 {
        self.pixel_rect().iou(&other.pixel_rect())
    }
}

/// Half-open integer rectangle `[x0, x1) x [y0, y1)` with `x0 <= x1`, `y0 <= y1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

impl PixelRect {
    /// Creates a canonical rectangle from two arbitrary corners.
    pub fn new(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Truncates float corners toward zero, then canonicalizes.
    ///
    /// NaN maps to 0 and infinities saturate.
    pub fn from_corners(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::new(x1 as i64, y1 as i64, x2 as i64, y2 as i64)
    }

    /// Horizontal extent; exact even for corners saturated at `i64::MIN`/`MAX`.
    pub fn width(&self) -> u64 {
        self.x1.abs_diff(self.x0)
    }

    pub fn height(&self) -> u64 {
        self.y1.abs_diff(self.y0)
    }

    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    /// Area in pixels, computed in `f64` so huge boxes cannot overflow.
    pub fn area(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.width() as f64 * self.height() as f64
    }

    /// Largest rectangle contained in both, or `None` when they share no pixel.
    pub fn intersect(&self, other: &PixelRect) -> Option<PixelRect> {
        let r = PixelRect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        if r.is_empty() {
            None
        } else {
            Some(r)
        }
    }

    /// Intersection-over-union in `[0, 1]`; 0 when the union is empty.
    pub fn iou(&self, other: &PixelRect) -> f32 {
        let inter = self.intersect(other).map_or(0.0, |r| r.area());
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            return 0.0;
        }
        (inter / union) as f32
    }
}
