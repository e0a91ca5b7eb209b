use std::fmt;

use num_traits::Zero;

/// A two-dimensional point with `f64` coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<[f64; 2]> for Point {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<(f64, f64)> for Point {
    fn from(v: (f64, f64)) -> Self {
        Self::new(v.0, v.1)
    }
}

/// Signed area of the parallelogram spanned by `v0->v1` and `v0->v2`.
/// Positive when `v2` lies to the left of the directed line `v0->v1`.
pub(crate) fn cross(v0: Point, v1: Point, v2: Point) -> f64 {
    (v1.x - v0.x) * (v2.y - v0.y) - (v1.y - v0.y) * (v2.x - v0.x)
}

pub(crate) fn dot(v0: Point, v1: Point) -> f64 {
    v0.x * v1.x + v0.y * v1.y
}

/// Epsilon-tolerant total order on points: primarily by y, secondarily by x.
/// All collinearity and left/right decisions in the trapezoidation flow
/// through this one tolerance, which is what keeps them mutually consistent.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PointOrder {
    eps: f64,
}

impl PointOrder {
    pub fn new(eps: f64) -> Self {
        Self { eps }
    }

    pub fn fp_eq(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.eps
    }

    pub fn eq(&self, v0: Point, v1: Point) -> bool {
        self.fp_eq(v0.y, v1.y) && self.fp_eq(v0.x, v1.x)
    }

    pub fn gt(&self, v0: Point, v1: Point) -> bool {
        if v0.y > v1.y + self.eps {
            true
        } else if v0.y < v1.y - self.eps {
            false
        } else {
            v0.x > v1.x
        }
    }

    pub fn ge(&self, v0: Point, v1: Point) -> bool {
        if v0.y > v1.y + self.eps {
            true
        } else if v0.y < v1.y - self.eps {
            false
        } else {
            v0.x >= v1.x
        }
    }

    pub fn lt(&self, v0: Point, v1: Point) -> bool {
        if v0.y < v1.y - self.eps {
            true
        } else if v0.y > v1.y + self.eps {
            false
        } else {
            v0.x < v1.x
        }
    }

    pub fn max(&self, v0: Point, v1: Point) -> Point {
        if v0.y > v1.y + self.eps {
            v0
        } else if self.fp_eq(v0.y, v1.y) {
            if v0.x > v1.x + self.eps { v0 } else { v1 }
        } else {
            v1
        }
    }

    pub fn min(&self, v0: Point, v1: Point) -> Point {
        if v0.y < v1.y - self.eps {
            v0
        } else if self.fp_eq(v0.y, v1.y) {
            if v0.x < v1.x { v0 } else { v1 }
        } else {
            v1
        }
    }

    /// Is `v` strictly to the left of the segment `(s_v0, s_v1)`?
    ///
    /// The segment endpoints are taken in stored (ring) order and oriented
    /// internally. When `v` shares a y-coordinate with an endpoint the
    /// orientation is decided by x alone, which avoids spurious sign flips
    /// on near-horizontal segments.
    pub fn is_left_of(&self, s_v0: Point, s_v1: Point, v: Point) -> bool {
        let area = if self.gt(s_v1, s_v0) {
            // segment going upwards
            if self.fp_eq(s_v1.y, v.y) {
                if v.x < s_v1.x { 1.0 } else { -1.0 }
            } else if self.fp_eq(s_v0.y, v.y) {
                if v.x < s_v0.x { 1.0 } else { -1.0 }
            } else {
                cross(s_v0, s_v1, v)
            }
        } else {
            if self.fp_eq(s_v1.y, v.y) {
                if v.x < s_v1.x { 1.0 } else { -1.0 }
            } else if self.fp_eq(s_v0.y, v.y) {
                if v.x < s_v0.x { 1.0 } else { -1.0 }
            } else {
                cross(s_v1, s_v0, v)
            }
        };
        area > f64::zero()
    }
}
