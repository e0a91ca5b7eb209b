//! Polygon triangulation by Seidel's randomized incremental algorithm.
//!
//! The input is a set of closed contours over shared vertex numbering: the
//! outer boundary in anticlockwise order, holes in clockwise order, no two
//! segments intersecting except at shared endpoints. The output is a list of
//! triangles over the input vertices, `n + 2h - 2` of them for `n` vertices
//! and `h` holes.
//!
//! The algorithm runs in three phases: a randomized incremental
//! trapezoidation of the segments (expected O(n log* n), the dominant cost),
//! a walk over the trapezoids splitting the polygon into y-monotone pieces,
//! and a linear greedy triangulation of each piece.
//!
//! ```
//! use seidel::{Point, Triangulator};
//!
//! let square = vec![vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(1.0, 0.0),
//!     Point::new(1.0, 1.0),
//!     Point::new(0.0, 1.0),
//! ]];
//! let mut triangulator = Triangulator::new(4);
//! let triangles = triangulator.triangulate(&square)?;
//! assert_eq!(triangles.len(), 2);
//! # Ok::<(), seidel::TriangulateError>(())
//! ```

use std::fmt;

mod errors;
mod idx;
mod math;
mod monotone;
mod point;
mod querynode;
mod segment;
mod trapezoid;
mod trapezoidation;

#[cfg(test)]
mod tests;

pub use errors::{Arena, InternalError, TriangulateError};
pub use point::Point;

use idx::Idx;
use monotone::{ChainEntry, VertexChain};
use point::PointOrder;
use querynode::Node;
use segment::Segment;
use trapezoid::Trapezoid;

/// One output triangle: three indices into the flattened input vertex list,
/// in anticlockwise order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle(pub [usize; 3]);

impl fmt::Display for Triangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0[0], self.0[1], self.0[2])
    }
}

/// Tuning knobs for a [Triangulator].
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Coordinate tolerance: points closer than this (per axis) are treated
    /// as coincident. Inputs should keep distinct vertices further apart
    /// than this.
    pub epsilon: f64,
    /// Seed for the segment insertion order. `None` draws from the thread
    /// rng; a fixed seed makes runs reproducible.
    pub seed: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            epsilon: 1.0e-7,
            seed: None,
        }
    }
}

/// Reusable triangulation state, sized for a maximum vertex count at
/// construction. All tables are pre-sized from that count (the query
/// structure gets `8n` slots and the trapezoid table `4n`, the worst cases
/// of the incremental construction) and are reused across runs.
pub struct Triangulator {
    pub(crate) options: Options,
    pub(crate) ord: PointOrder,

    // trapezoidation state
    pub(crate) seg: Vec<Segment>,
    pub(crate) permute: Vec<Idx<Segment>>,
    pub(crate) choose: usize,
    pub(crate) qs: Vec<Node>,
    pub(crate) tr: Vec<Trapezoid>,
    pub(crate) seg_limit: usize,
    pub(crate) q_limit: usize,
    pub(crate) tr_limit: usize,

    // monotone decomposition state
    pub(crate) mchain: Vec<ChainEntry>,
    pub(crate) vert: Vec<VertexChain>,
    pub(crate) mon: Vec<Idx<ChainEntry>>,
    pub(crate) visited: Vec<bool>,

    pub(crate) triangles: Vec<Triangle>,
}

impl Triangulator {
    /// Create a triangulator able to handle inputs of up to `vertex_count`
    /// total vertices (across all contours).
    pub fn new(vertex_count: usize) -> Self {
        Self::with_options(vertex_count, Options::default())
    }

    pub fn with_options(vertex_count: usize, options: Options) -> Self {
        let q_limit = 8 * vertex_count;
        let tr_limit = 4 * vertex_count;
        Self {
            options,
            ord: PointOrder::new(options.epsilon),
            seg: Vec::with_capacity(vertex_count),
            permute: Vec::with_capacity(vertex_count),
            choose: 0,
            qs: Vec::with_capacity(q_limit),
            tr: Vec::with_capacity(tr_limit),
            seg_limit: vertex_count,
            q_limit,
            tr_limit,
            mchain: Vec::new(),
            vert: Vec::new(),
            mon: Vec::new(),
            visited: Vec::new(),
            triangles: Vec::new(),
        }
    }

    /// Clear all per-run state, keeping the allocations.
    pub fn reset(&mut self) {
        self.seg.clear();
        self.permute.clear();
        self.choose = 0;
        self.qs.clear();
        self.tr.clear();
        self.mchain.clear();
        self.vert.clear();
        self.mon.clear();
        self.visited.clear();
        self.triangles.clear();
    }

    /// Triangulate the polygon described by `contours`: the first contour is
    /// the outer boundary in anticlockwise order, any further contours are
    /// holes in clockwise order. Vertex indices in the result refer to the
    /// concatenation of all contours, in input order.
    pub fn triangulate(&mut self, contours: &[Vec<Point>]) -> Result<Vec<Triangle>, TriangulateError> {
        self.reset();
        let n = self.load_contours(contours)?;
        self.generate_ordering(n);
        self.construct_trapezoids(n)?;
        let nmonpoly = self.monotonate_trapezoids(n)?;
        self.triangulate_monotone_polygons(nmonpoly)?;
        Ok(std::mem::take(&mut self.triangles))
    }

    /// Is `pt` inside the most recently triangulated polygon (holes
    /// excluded)? Queries the trapezoidation left behind by
    /// [triangulate](Self::triangulate); before any run, every point is
    /// outside.
    pub fn contains(&self, pt: Point) -> bool {
        if self.qs.is_empty() {
            return false;
        }
        let t = &self.tr[self.locate(pt, pt, Idx::new(0))];
        if !t.valid {
            return false;
        }
        let rseg = match (t.lseg, t.rseg) {
            (Some(_), Some(rseg)) => rseg,
            _ => return false,
        };
        // interior trapezoids are exactly those whose right bound runs upwards
        let s = &self.seg[rseg];
        self.ord.gt(s.v1, s.v0)
    }

    /// Build the segment table from the input contours. Each vertex becomes
    /// one segment running to the next vertex of its contour, and `prev`/
    /// `next` close each contour into a ring. Returns the total number of
    /// segments.
    fn load_contours(&mut self, contours: &[Vec<Point>]) -> Result<usize, TriangulateError> {
        let total: usize = contours.iter().map(Vec::len).sum();
        if total == 0 {
            return Err(TriangulateError::NoVertices);
        }
        for contour in contours {
            if contour.len() < 3 {
                return Err(TriangulateError::NotEnoughVertices(contour.len()));
            }
        }
        if total > self.seg_limit {
            return Err(TriangulateError::ArenaOverflow(Arena::Segments));
        }

        let mut first = 0;
        for contour in contours {
            let count = contour.len();
            let last = first + count - 1;
            for (i, &pt) in contour.iter().enumerate() {
                let index = first + i;
                let prev = if index == first { last } else { index - 1 };
                let next = if index == last { first } else { index + 1 };
                let mut s = Segment::new(pt, Idx::new(prev), Idx::new(next));
                s.v1 = contour[(i + 1) % count];
                self.seg.push(s);
            }
            first += count;
        }

        Ok(total)
    }
}

/// One-shot convenience wrapper: triangulate `contours` with default
/// [Options], sizing the state for exactly this input.
pub fn triangulate(contours: &[Vec<Point>]) -> Result<Vec<Triangle>, TriangulateError> {
    let total = contours.iter().map(Vec::len).sum();
    Triangulator::new(total).triangulate(contours)
}
