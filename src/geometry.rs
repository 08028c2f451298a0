/// Points per inch. Canvas units are PostScript points.
pub const POINTS_PER_INCH: f32 = 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn midpoint(self, other: Point) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn distance(self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Moves `distance` along the direction towards `toward`. Coincident points
    /// stay put.
    pub fn toward(self, toward: Point, distance: f32) -> Self {
        let len = self.distance(toward);
        if len <= f32::EPSILON {
            return self;
        }
        Self::new(
            self.x + (toward.x - self.x) / len * distance,
            self.y + (toward.y - self.y) / len * distance,
        )
    }
}

/// Axis-aligned rectangle with its origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_points(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn with_padding(&self, padding: f32) -> Self {
        Self::new(
            self.x - padding,
            self.y - padding,
            self.width + padding * 2.0,
            self.height + padding * 2.0,
        )
    }

    pub fn union(&self, other: &BBox) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

/// Maps the data-unit plot area of a figure onto the canvas.
///
/// The plot area fills the figure minus a uniform margin, and the two axes
/// scale independently, so a unit square is generally not square on paper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    margin: f32,
    x_range: (f32, f32),
    y_range: (f32, f32),
}

impl Viewport {
    pub fn new(
        width: f32,
        height: f32,
        margin: f32,
        x_range: (f32, f32),
        y_range: (f32, f32),
    ) -> Self {
        Self {
            width,
            height,
            margin,
            x_range,
            y_range,
        }
    }

    /// Points per data unit along x.
    pub fn scale_x(&self) -> f32 {
        (self.width - 2.0 * self.margin) / (self.x_range.1 - self.x_range.0)
    }

    /// Points per data unit along y.
    pub fn scale_y(&self) -> f32 {
        (self.height - 2.0 * self.margin) / (self.y_range.1 - self.y_range.0)
    }

    pub fn to_canvas(&self, p: Point) -> Point {
        Point::new(
            self.margin + (p.x - self.x_range.0) * self.scale_x(),
            self.height - self.margin - (p.y - self.y_range.0) * self.scale_y(),
        )
    }

    /// Canvas rectangle for a data-unit rectangle given by its lower-left
    /// corner and size.
    pub fn rect(&self, lower_left: Point, width: f32, height: f32) -> BBox {
        let top_left = self.to_canvas(lower_left.offset(0.0, height));
        BBox::new(
            top_left.x,
            top_left.y,
            width * self.scale_x(),
            height * self.scale_y(),
        )
    }

    /// Canvas point for a fraction of the plot area, `(0, 0)` being its
    /// lower-left corner.
    pub fn fraction(&self, fx: f32, fy: f32) -> Point {
        Point::new(
            self.margin + fx * (self.width - 2.0 * self.margin),
            self.height - self.margin - fy * (self.height - 2.0 * self.margin),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn viewport() -> Viewport {
        Viewport::new(864.0, 576.0, 10.8, (0.0, 12.0), (0.0, 10.0))
    }

    #[test]
    fn data_origin_maps_to_lower_left_margin() {
        let vp = viewport();
        let origin = vp.to_canvas(Point::new(0.0, 0.0));
        assert!((origin.x - 10.8).abs() < 1e-3);
        assert!((origin.y - 565.2).abs() < 1e-3);
        let top_right = vp.to_canvas(Point::new(12.0, 10.0));
        assert!((top_right.x - 853.2).abs() < 1e-3);
        assert!((top_right.y - 10.8).abs() < 1e-3);
    }

    #[test]
    fn rect_flips_to_top_left_origin() {
        let vp = viewport();
        let r = vp.rect(Point::new(0.0, 4.25), 2.0, 1.5);
        let top = vp.to_canvas(Point::new(0.0, 5.75));
        assert!((r.y - top.y).abs() < 1e-3);
        assert!((r.width - 2.0 * vp.scale_x()).abs() < 1e-3);
        assert!((r.height - 1.5 * vp.scale_y()).abs() < 1e-3);
    }

    #[test]
    fn fraction_matches_data_corners() {
        let vp = viewport();
        let center = vp.fraction(0.5, 0.5);
        let data_center = vp.to_canvas(Point::new(6.0, 5.0));
        assert!((center.x - data_center.x).abs() < 1e-3);
        assert!((center.y - data_center.y).abs() < 1e-3);
    }

    #[test]
    fn toward_handles_coincident_points() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(p.toward(p, 2.0), p);
        let q = Point::new(0.0, 0.0).toward(Point::new(10.0, 0.0), 2.0);
        assert_eq!(q, Point::new(2.0, 0.0));
    }

    proptest! {
        #[test]
        fn union_contains_both_operands(
            a in (-100.0f32..100.0, -100.0f32..100.0, 0.0f32..50.0, 0.0f32..50.0),
            b in (-100.0f32..100.0, -100.0f32..100.0, 0.0f32..50.0, 0.0f32..50.0),
        ) {
            let a = BBox::new(a.0, a.1, a.2, a.3);
            let b = BBox::new(b.0, b.1, b.2, b.3);
            let u = a.union(&b);
            for r in [a, b] {
                prop_assert!(u.x <= r.x && u.y <= r.y);
                prop_assert!(u.right() >= r.right() - 1e-3);
                prop_assert!(u.bottom() >= r.bottom() - 1e-3);
            }
        }

        #[test]
        fn to_canvas_preserves_x_order(x1 in 0.0f32..12.0, x2 in 0.0f32..12.0, y in 0.0f32..10.0) {
            let vp = viewport();
            let a = vp.to_canvas(Point::new(x1, y));
            let b = vp.to_canvas(Point::new(x2, y));
            prop_assert!(x1 > x2 || a.x <= b.x);
        }
    }
}
