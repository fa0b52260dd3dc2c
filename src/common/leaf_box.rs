use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in source-image pixel coordinates.
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeafBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl LeafBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Returns the width of the bounding box.
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    /// Returns the height of the bounding box.
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Returns the center x-coordinate of the bounding box.
    pub fn cx(&self) -> f32 {
        (self.x1 + self.x2) / 2.
    }

    /// Returns the center y-coordinate of the bounding box.
    pub fn cy(&self) -> f32 {
        (self.y1 + self.y2) / 2.
    }

    /// Midpoint of the rectangle as `(x, y)`.
    pub fn center(&self) -> (f32, f32) {
        (self.cx(), self.cy())
    }

    /// True iff the point lies inside the box, edges included.
    ///
    /// A box with `x1 > x2` or `y1 > y2` is a caller error; it simply contains nothing.
    pub fn contains_point(&self, (px, py): (f32, f32)) -> bool {
        self.x1 <= px && px <= self.x2 && self.y1 <= py && py <= self.y2
    }

    /// True iff the center of `other` lies inside this box, edges included.
    pub fn contains_center_of(&self, other: &LeafBox) -> bool {
        self.contains_point(other.center())
    }

    /// Checks the `x1 < x2`, `y1 < y2` invariant and that every coordinate is finite.
    pub fn is_well_formed(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2].iter().all(|v| v.is_finite())
            && self.x1 < self.x2
            && self.y1 < self.y2
    }

    /// Computes the area of the bounding box.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Computes the intersection area between this bounding box and another.
    pub fn intersect(&self, other: &LeafBox) -> f32 {
        let left = self.x1.max(other.x1);
        let right = self.x2.min(other.x2);
        let top = self.y1.max(other.y1);
        let bottom = self.y2.min(other.y2);
        (right - left).max(0.) * (bottom - top).max(0.)
    }

    /// Computes the union area between this bounding box and another.
    pub fn union(&self, other: &LeafBox) -> f32 {
        self.area() + other.area() - self.intersect(other)
    }

    /// Intersection over union, 0 for degenerate pairs.
    pub fn iou(&self, other: &LeafBox) -> f32 {
        let union = self.union(other);
        if union <= 0. {
            return 0.;
        }
        self.intersect(other) / union
    }

    /// Clamps the box into a `width` x `height` image.
    pub fn clamp_to(&self, width: f32, height: f32) -> Self {
        Self {
            x1: self.x1.clamp(0., width),
            y1: self.y1.clamp(0., height),
            x2: self.x2.clamp(0., width),
            y2: self.y2.clamp(0., height),
        }
    }

    pub fn as_x1y1_x2y2_i32(&self) -> (i32, i32, i32, i32) {
        (self.x1 as i32,
         self.y1 as i32,
         self.x2 as i32,
         self.y2 as i32)
    }

    /// Sets the bounding box's coordinates and dimensions using `(cx, cy, w, h)`.
    ///
    /// # Arguments
    ///
    /// * `cx` - The x-coordinate of the horizontal center.
    /// * `cy` - The y-coordinate of the vertical center.
    /// * `w` - The width of the bounding box.
    /// * `h` - The height of the bounding box.
    ///
    /// # Returns
    ///
    /// A `LeafBox` instance with updated coordinates.
    pub fn with_cxcy_wh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.x1 = cx - (w / 2.0);
        self.y1 = cy - (h / 2.0);
        self.x2 = cx + (w / 2.0);
        self.y2 = cy + (h / 2.0);
        self
    }
}

impl From<(f32, f32, f32, f32)> for LeafBox {
    fn from((x1, y1, x2, y2): (f32, f32, f32, f32)) -> Self {
        Self::new(x1, y1, x2, y2)
    }
}
