use crate::{idx::{Idx, IdxDisplay}, point::Point, querynode::Node};

/// One entry of the segment table. Segment `i` runs from the `i`'th input
/// vertex (`v0`) to the next vertex of its contour (`v1`); `prev` and `next`
/// link it into the contour's cyclic edge ring, so contours are implicit.
///
/// `root0`/`root1` cache the last-known query-structure entry point for each
/// endpoint. They are rewritten between insertion rounds and are the only
/// fields mutated after loading.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Segment {
    pub v0: Point,
    pub v1: Point,
    pub is_inserted: bool,
    pub root0: Idx<Node>,
    pub root1: Idx<Node>,
    pub next: Idx<Segment>,
    pub prev: Idx<Segment>,
}

impl IdxDisplay for Segment {
    fn fmt(f: &mut std::fmt::Formatter<'_>, idx: usize) -> std::fmt::Result {
        write!(f, "s{}", idx)
    }
}

impl Segment {
    pub fn new(v0: Point, prev: Idx<Segment>, next: Idx<Segment>) -> Self {
        Self {
            v0,
            v1: Point::default(),
            is_inserted: false,
            root0: Idx::new(0),
            root1: Idx::new(0),
            next,
            prev,
        }
    }
}
