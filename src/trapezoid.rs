use crate::{idx::{Idx, IdxDisplay}, point::Point, querynode::Node, segment::Segment};

/// Which side of the splitting segment a saved third upper neighbour
/// belongs to. Also names the merge direction after threading a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// One entry of the trapezoid table: a maximal region bounded above and
/// below by the horizontal levels `hi`/`lo` and laterally by at most one
/// segment on each side. Up to two neighbours above (`u0`, `u1`) and below
/// (`d0`, `d1`); `None` means open.
///
/// `usave` temporarily parks a third upper neighbour (with the side it came
/// from) while a chain of splits passes through; it is consumed by the next
/// split below. Invalidated trapezoids are never reused, only skipped.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Trapezoid {
    pub lseg: Option<Idx<Segment>>,
    pub rseg: Option<Idx<Segment>>,
    pub hi: Point,
    pub lo: Point,
    pub u0: Option<Idx<Trapezoid>>,
    pub u1: Option<Idx<Trapezoid>>,
    pub d0: Option<Idx<Trapezoid>>,
    pub d1: Option<Idx<Trapezoid>>,
    pub sink: Option<Idx<Node>>,
    pub usave: Option<(Idx<Trapezoid>, Side)>,
    pub valid: bool,
}

impl IdxDisplay for Trapezoid {
    fn fmt(f: &mut std::fmt::Formatter<'_>, idx: usize) -> std::fmt::Result {
        write!(f, "t{}", idx)
    }
}

impl Default for Trapezoid {
    fn default() -> Self {
        Self {
            lseg: None,
            rseg: None,
            hi: Point::default(),
            lo: Point::default(),
            u0: None,
            u1: None,
            d0: None,
            d1: None,
            sink: None,
            usave: None,
            valid: true,
        }
    }
}

impl Trapezoid {
    pub fn has_upper(&self) -> bool {
        self.u0.is_some() || self.u1.is_some()
    }

    pub fn has_lower(&self) -> bool {
        self.d0.is_some() || self.d1.is_some()
    }

    /// Swap a stale upper-neighbour reference for the trapezoid that
    /// replaced it. No-op if `old` is not referenced.
    pub fn replace_upper(&mut self, old: Idx<Trapezoid>, new: Idx<Trapezoid>) {
        if self.u0 == Some(old) {
            self.u0 = Some(new);
        } else if self.u1 == Some(old) {
            self.u1 = Some(new);
        }
    }
}
