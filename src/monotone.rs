use ordered_float::OrderedFloat;
use smallvec::SmallVec;

use crate::{
    errors::TriangulateError,
    idx::{Idx, IdxDisplay, SliceExt, VecExt},
    point::{self, Point},
    segment::Segment,
    trapezoid::Trapezoid,
    Triangle, Triangulator,
};

/// One link of a monotone-polygon boundary. Entries form circular doubly
/// linked lists; splitting a polygon along a diagonal rewires four links and
/// appends two fresh entries, so existing positions stay valid.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ChainEntry {
    pub vnum: Idx<Segment>,
    pub next: Idx<ChainEntry>,
    pub prev: Idx<ChainEntry>,
    pub marked: bool,
}

impl IdxDisplay for ChainEntry {
    fn fmt(f: &mut std::fmt::Formatter<'_>, idx: usize) -> std::fmt::Result {
        write!(f, "c{}", idx)
    }
}

/// Per-vertex bookkeeping for the decomposition. `slots` records, for every
/// monotone polygon this vertex currently borders, the vertex its outgoing
/// edge leads to and this vertex's own chain position in that polygon. A
/// vertex of a simple polygon gains at most three diagonals, so four slots
/// suffice and stay inline.
#[derive(Debug, Clone)]
pub(crate) struct VertexChain {
    pub pt: Point,
    pub slots: SmallVec<[(Idx<Segment>, Idx<ChainEntry>); 4]>,
}

/// Which side of a y-monotone polygon is a single edge.
#[derive(Clone, Copy, PartialEq, Eq)]
enum MonotoneSide {
    Left,
    Right,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Entered {
    FromAbove,
    FromBelow,
}

/// A pending trapezoid visit: which monotone polygon the walk is currently
/// extending, the trapezoid to enter, and the neighbour it is entered from.
struct Visit {
    mcur: usize,
    trnum: Option<Idx<Trapezoid>>,
    from: Idx<Trapezoid>,
    entered: Entered,
}

/// Interior angle proxy used to pick the chain a diagonal belongs to:
/// monotonically decreasing over [0, 2pi), so the maximum identifies the
/// first outgoing edge encountered sweeping rightwards from the diagonal.
fn angle_measure(vp0: Point, vpnext: Point, vp1: Point) -> f64 {
    let v0 = Point::new(vpnext.x - vp0.x, vpnext.y - vp0.y);
    let v1 = Point::new(vp1.x - vp0.x, vp1.y - vp0.y);
    let len0 = point::dot(v0, v0).sqrt();
    let len1 = point::dot(v1, v1).sqrt();
    let cos = point::dot(v0, v1) / len0 / len1;
    if v0.x * v1.y - v1.x * v0.y >= 0.0 {
        cos
    } else {
        -cos - 2.0
    }
}

fn req<T>(idx: Option<Idx<T>>, what: &str) -> Result<Idx<T>, TriangulateError> {
    idx.ok_or_else(|| TriangulateError::internal(format!("missing {}", what)))
}

impl Triangulator {
    /// A trapezoid lies inside the polygon iff it is bounded by segments on
    /// both sides and its right bound runs upwards. Used only to find the
    /// starting triangle of the decomposition walk, so triangular shape is
    /// required too.
    fn inside_polygon(&self, t: &Trapezoid) -> bool {
        if !t.valid {
            return false;
        }
        let rseg = match (t.lseg, t.rseg) {
            (Some(_), Some(rseg)) => rseg,
            _ => return false,
        };
        if !t.has_upper() || !t.has_lower() {
            let s = &self.seg[rseg];
            return self.ord.gt(s.v1, s.v0);
        }
        false
    }

    /// Find the chain positions of the diagonal endpoints `v0`/`v1` in the
    /// one polygon that borders both: for each endpoint, the slot whose
    /// outgoing edge is first when sweeping rightwards from the diagonal.
    fn diagonal_positions(&self, v0: Idx<Segment>, v1: Idx<Segment>) -> (usize, usize) {
        let vp0 = &self.vert[v0.usize()];
        let vp1 = &self.vert[v1.usize()];

        let mut best = OrderedFloat(-4.0);
        let mut ip = 0;
        for (i, &(vnext, _)) in vp0.slots.iter().enumerate() {
            let a = OrderedFloat(angle_measure(vp0.pt, self.vert[vnext.usize()].pt, vp1.pt));
            if a > best {
                best = a;
                ip = i;
            }
        }

        let mut best = OrderedFloat(-4.0);
        let mut iq = 0;
        for (i, &(vnext, _)) in vp1.slots.iter().enumerate() {
            let a = OrderedFloat(angle_measure(vp1.pt, self.vert[vnext.usize()].pt, vp0.pt));
            if a > best {
                best = a;
                iq = i;
            }
        }

        (ip, iq)
    }

    /// Split monotone polygon `mcur` along the diagonal `(v0, v1)`, given in
    /// anticlockwise order on `mcur`'s boundary. The piece keeping `mcur`'s
    /// entry retains vertices from `v1` round to `v0`; the other piece
    /// becomes a new polygon, whose index is returned.
    fn split_polygon(&mut self, mcur: usize, v0: Idx<Segment>, v1: Idx<Segment>) -> usize {
        let (ip, iq) = self.diagonal_positions(v0, v1);
        let p = self.vert[v0.usize()].slots[ip].1;
        let q = self.vert[v1.usize()].slots[iq].1;

        // two fresh chain entries for the diagonal, one per polygon
        let i = self.mchain.push_get_index(ChainEntry { vnum: v0, next: p, prev: p, marked: false });
        let j = self.mchain.push_get_index(ChainEntry { vnum: v1, next: i, prev: q, marked: false });

        let p_next = self.mchain[p].next;
        self.mchain[i].next = p_next;
        self.mchain[p_next].prev = i;
        self.mchain[i].prev = j;
        let q_prev = self.mchain[q].prev;
        self.mchain[j].prev = q_prev;
        self.mchain[q_prev].next = j;

        self.mchain[p].next = q;
        self.mchain[q].prev = p;

        self.vert[v0.usize()].slots[ip].0 = v1;
        let i_next_vnum = self.mchain[self.mchain[i].next].vnum;
        self.vert[v0.usize()].slots.push((i_next_vnum, i));
        self.vert[v1.usize()].slots.push((v0, j));

        self.mon[mcur] = p;
        let mnew = self.mon.len();
        self.mon.push(i);
        mnew
    }

    /// Decompose the trapezoidation of the `n` loaded segments into
    /// y-monotone polygons. Returns the number of polygons produced.
    ///
    /// The walk starts from a triangular interior trapezoid and spans every
    /// interior trapezoid exactly once; each trapezoid whose top and bottom
    /// levels come from different boundary chains contributes one diagonal,
    /// and every diagonal splits the current polygon in two.
    pub(crate) fn monotonate_trapezoids(&mut self, n: usize) -> Result<usize, TriangulateError> {
        self.vert.clear();
        self.mchain.clear();
        self.mon.clear();
        self.visited.clear();
        self.visited.resize(self.tr.len(), false);

        let tr_start = self
            .tr
            .iter_index()
            .find(|&t| self.inside_polygon(&self.tr[t]))
            .ok_or_else(|| TriangulateError::internal("no interior trapezoid found"))?;

        // one initial polygon: the input boundary itself, in ring order
        for i in 0..n {
            let s = self.seg[Idx::new(i)];
            self.mchain.push(ChainEntry {
                vnum: Idx::new(i),
                next: Idx::new(s.next.usize()),
                prev: Idx::new(s.prev.usize()),
                marked: false,
            });
            let mut slots = SmallVec::new();
            slots.push((s.next, Idx::new(i)));
            self.vert.push(VertexChain { pt: s.v0, slots });
        }
        self.mon.push(Idx::new(0));

        let start = self.tr[tr_start];
        let mut stack = Vec::new();
        if let Some(u0) = start.u0 {
            stack.push(Visit { mcur: 0, trnum: Some(tr_start), from: u0, entered: Entered::FromAbove });
        } else if let Some(d0) = start.d0 {
            stack.push(Visit { mcur: 0, trnum: Some(tr_start), from: d0, entered: Entered::FromBelow });
        }
        self.traverse_polygon(&mut stack)?;

        Ok(self.mon.len())
    }

    /// Depth-first walk over the interior trapezoids, splitting monotone
    /// polygons as diagonals are discovered. The eight cases are determined
    /// by which of the four neighbour slots are occupied and whether the
    /// trapezoid's top/bottom levels are cusps; the side the trapezoid was
    /// entered from decides which fragment keeps the current polygon.
    fn traverse_polygon(&mut self, stack: &mut Vec<Visit>) -> Result<(), TriangulateError> {
        while let Some(visit) = stack.pop() {
            let trnum = match visit.trnum {
                Some(t) => t,
                None => continue,
            };
            if self.visited[trnum.usize()] {
                continue;
            }
            self.visited[trnum.usize()] = true;

            let t = self.tr[trnum];
            let mcur = visit.mcur;
            let from = visit.from;

            // rseg runs upwards along the right flank, lseg downwards along
            // the left; the case bodies below assume entry from below and
            // swap the diagonal when entry came the other way round.
            let descend = |stack: &mut Vec<Visit>, jobs: &[(usize, Option<Idx<Trapezoid>>, Entered)]| {
                for &(m, child, entered) in jobs.iter().rev() {
                    stack.push(Visit { mcur: m, trnum: child, from: trnum, entered });
                }
            };

            use Entered::{FromAbove, FromBelow};

            if !t.has_upper() {
                if let (Some(d0), Some(d1)) = (t.d0, t.d1) {
                    // downward opening triangle
                    let v0 = req(self.tr[d1].lseg, "left bound below a cusp")?;
                    let v1 = req(t.lseg, "left bound of interior trapezoid")?;
                    if from == d1 {
                        let mnew = self.split_polygon(mcur, v1, v0);
                        descend(stack, &[(mcur, Some(d1), FromAbove), (mnew, Some(d0), FromAbove)]);
                    } else {
                        let mnew = self.split_polygon(mcur, v0, v1);
                        descend(stack, &[(mcur, Some(d0), FromAbove), (mnew, Some(d1), FromAbove)]);
                    }
                } else {
                    descend(stack, &[
                        (mcur, t.u0, FromBelow),
                        (mcur, t.u1, FromBelow),
                        (mcur, t.d0, FromAbove),
                        (mcur, t.d1, FromAbove),
                    ]);
                }
            } else if !t.has_lower() {
                if let (Some(u0), Some(u1)) = (t.u0, t.u1) {
                    // upward opening triangle
                    let v0 = req(t.rseg, "right bound of interior trapezoid")?;
                    let v1 = req(self.tr[u0].rseg, "right bound above a cusp")?;
                    if from == u1 {
                        let mnew = self.split_polygon(mcur, v1, v0);
                        descend(stack, &[(mcur, Some(u1), FromBelow), (mnew, Some(u0), FromBelow)]);
                    } else {
                        let mnew = self.split_polygon(mcur, v0, v1);
                        descend(stack, &[(mcur, Some(u0), FromBelow), (mnew, Some(u1), FromBelow)]);
                    }
                } else {
                    descend(stack, &[
                        (mcur, t.u0, FromBelow),
                        (mcur, t.u1, FromBelow),
                        (mcur, t.d0, FromAbove),
                        (mcur, t.d1, FromAbove),
                    ]);
                }
            } else if let (Some(u0), Some(u1)) = (t.u0, t.u1) {
                if let (Some(d0), Some(d1)) = (t.d0, t.d1) {
                    // cusps at both the top and the bottom
                    let v0 = req(self.tr[d1].lseg, "left bound below a cusp")?;
                    let v1 = req(self.tr[u0].rseg, "right bound above a cusp")?;
                    let entered_right = match visit.entered {
                        FromBelow => from == d1,
                        FromAbove => from == u1,
                    };
                    if entered_right {
                        let mnew = self.split_polygon(mcur, v1, v0);
                        descend(stack, &[
                            (mcur, Some(u1), FromBelow),
                            (mcur, Some(d1), FromAbove),
                            (mnew, Some(u0), FromBelow),
                            (mnew, Some(d0), FromAbove),
                        ]);
                    } else {
                        let mnew = self.split_polygon(mcur, v0, v1);
                        descend(stack, &[
                            (mcur, Some(u0), FromBelow),
                            (mcur, Some(d0), FromAbove),
                            (mnew, Some(u1), FromBelow),
                            (mnew, Some(d1), FromAbove),
                        ]);
                    }
                } else {
                    // cusp at the top only
                    let lseg = req(t.lseg, "left bound of interior trapezoid")?;
                    if self.ord.eq(t.lo, self.seg[lseg].v1) {
                        // bottom level is the left bound's lower endpoint
                        let v0 = req(self.tr[u0].rseg, "right bound above a cusp")?;
                        let v1 = self.seg[lseg].next;
                        if visit.entered == FromAbove && from == u0 {
                            let mnew = self.split_polygon(mcur, v1, v0);
                            descend(stack, &[
                                (mcur, Some(u0), FromBelow),
                                (mnew, t.d0, FromAbove),
                                (mnew, Some(u1), FromBelow),
                                (mnew, t.d1, FromAbove),
                            ]);
                        } else {
                            let mnew = self.split_polygon(mcur, v0, v1);
                            descend(stack, &[
                                (mcur, Some(u1), FromBelow),
                                (mcur, t.d0, FromAbove),
                                (mcur, t.d1, FromAbove),
                                (mnew, Some(u0), FromBelow),
                            ]);
                        }
                    } else {
                        // bottom level is the right bound's lower endpoint
                        let v0 = req(t.rseg, "right bound of interior trapezoid")?;
                        let v1 = req(self.tr[u0].rseg, "right bound above a cusp")?;
                        if visit.entered == FromAbove && from == u1 {
                            let mnew = self.split_polygon(mcur, v1, v0);
                            descend(stack, &[
                                (mcur, Some(u1), FromBelow),
                                (mnew, t.d1, FromAbove),
                                (mnew, t.d0, FromAbove),
                                (mnew, Some(u0), FromBelow),
                            ]);
                        } else {
                            let mnew = self.split_polygon(mcur, v0, v1);
                            descend(stack, &[
                                (mcur, Some(u0), FromBelow),
                                (mcur, t.d0, FromAbove),
                                (mcur, t.d1, FromAbove),
                                (mnew, Some(u1), FromBelow),
                            ]);
                        }
                    }
                }
            } else if let (Some(d0), Some(d1)) = (t.d0, t.d1) {
                // cusp at the bottom only
                let lseg = req(t.lseg, "left bound of interior trapezoid")?;
                let rseg = req(t.rseg, "right bound of interior trapezoid")?;
                if self.ord.eq(t.hi, self.seg[lseg].v0) {
                    // top level is the left bound's upper endpoint
                    let v0 = req(self.tr[d1].lseg, "left bound below a cusp")?;
                    let v1 = lseg;
                    if !(visit.entered == FromBelow && from == d0) {
                        let mnew = self.split_polygon(mcur, v1, v0);
                        descend(stack, &[
                            (mcur, t.u1, FromBelow),
                            (mcur, Some(d1), FromAbove),
                            (mcur, t.u0, FromBelow),
                            (mnew, Some(d0), FromAbove),
                        ]);
                    } else {
                        let mnew = self.split_polygon(mcur, v0, v1);
                        descend(stack, &[
                            (mcur, Some(d0), FromAbove),
                            (mnew, t.u0, FromBelow),
                            (mnew, t.u1, FromBelow),
                            (mnew, Some(d1), FromAbove),
                        ]);
                    }
                } else {
                    // top level is the right bound's upper endpoint
                    let v0 = req(self.tr[d1].lseg, "left bound below a cusp")?;
                    let v1 = self.seg[rseg].next;
                    if visit.entered == FromBelow && from == d1 {
                        let mnew = self.split_polygon(mcur, v1, v0);
                        descend(stack, &[
                            (mcur, Some(d1), FromAbove),
                            (mnew, t.u1, FromBelow),
                            (mnew, t.u0, FromBelow),
                            (mnew, Some(d0), FromAbove),
                        ]);
                    } else {
                        let mnew = self.split_polygon(mcur, v0, v1);
                        descend(stack, &[
                            (mcur, t.u0, FromBelow),
                            (mcur, Some(d0), FromAbove),
                            (mcur, t.u1, FromBelow),
                            (mnew, Some(d1), FromAbove),
                        ]);
                    }
                }
            } else {
                // one neighbour above, at most one below: no cusp
                let lseg = req(t.lseg, "left bound of interior trapezoid")?;
                let rseg = req(t.rseg, "right bound of interior trapezoid")?;
                let left_up_right_down =
                    self.ord.eq(t.hi, self.seg[lseg].v0) && self.ord.eq(t.lo, self.seg[rseg].v0);
                let left_down_right_up =
                    self.ord.eq(t.hi, self.seg[rseg].v1) && self.ord.eq(t.lo, self.seg[lseg].v1);
                if left_up_right_down || left_down_right_up {
                    let (v0, v1) = if left_up_right_down {
                        (rseg, lseg)
                    } else {
                        (self.seg[rseg].next, self.seg[lseg].next)
                    };
                    if visit.entered == FromAbove {
                        let mnew = self.split_polygon(mcur, v1, v0);
                        descend(stack, &[
                            (mcur, t.u0, FromBelow),
                            (mcur, t.u1, FromBelow),
                            (mnew, t.d1, FromAbove),
                            (mnew, t.d0, FromAbove),
                        ]);
                    } else {
                        let mnew = self.split_polygon(mcur, v0, v1);
                        descend(stack, &[
                            (mcur, t.d1, FromAbove),
                            (mcur, t.d0, FromAbove),
                            (mnew, t.u0, FromBelow),
                            (mnew, t.u1, FromBelow),
                        ]);
                    }
                } else {
                    // both levels on the same boundary chain: no diagonal
                    descend(stack, &[
                        (mcur, t.u0, FromBelow),
                        (mcur, t.d0, FromAbove),
                        (mcur, t.u1, FromBelow),
                        (mcur, t.d1, FromAbove),
                    ]);
                }
            }
        }

        Ok(())
    }

    /// Triangulate every monotone polygon produced by the decomposition,
    /// appending to `self.triangles`. Polygons are deduplicated by marking
    /// chain entries as they are consumed.
    pub(crate) fn triangulate_monotone_polygons(&mut self, nmonpoly: usize) -> Result<(), TriangulateError> {
        for i in 0..nmonpoly {
            let start = self.mon[i];
            let vfirst = self.mchain[start].vnum;
            let mut ymax = self.vert[vfirst.usize()].pt;
            let mut ymin = ymax;
            let mut posmax = start;
            let mut vcount = 1usize;
            let mut processed = false;

            self.mchain[start].marked = true;
            let mut p = self.mchain[start].next;
            loop {
                let v = self.mchain[p].vnum;
                if v == vfirst {
                    break;
                }
                if self.mchain[p].marked {
                    processed = true;
                    break;
                }
                self.mchain[p].marked = true;

                let pt = self.vert[v.usize()].pt;
                if self.ord.gt(pt, ymax) {
                    ymax = pt;
                    posmax = p;
                }
                if self.ord.lt(pt, ymin) {
                    ymin = pt;
                }
                p = self.mchain[p].next;
                vcount += 1;
            }

            if processed {
                continue;
            }

            if vcount == 3 {
                // already a triangle; p has wrapped back to the first vertex
                self.triangles.push(Triangle([
                    self.mchain[p].vnum.usize(),
                    self.mchain[self.mchain[p].next].vnum.usize(),
                    self.mchain[self.mchain[p].prev].vnum.usize(),
                ]));
            } else {
                let v = self.mchain[self.mchain[posmax].next].vnum;
                let side = if self.ord.eq(self.vert[v.usize()].pt, ymin) {
                    // the vertex after the top is already the bottom
                    MonotoneSide::Left
                } else {
                    MonotoneSide::Right
                };
                self.triangulate_single_polygon(posmax, side)?;
            }
        }

        Ok(())
    }

    /// Corner-cutting triangulation of one y-monotone polygon in O(n): walk
    /// the long chain keeping a stack of reflex vertices, emitting a triangle
    /// whenever the new vertex makes the top of the stack convex.
    fn triangulate_single_polygon(
        &mut self,
        posmax: Idx<ChainEntry>,
        side: MonotoneSide,
    ) -> Result<(), TriangulateError> {
        let mut reflex: Vec<Idx<Segment>> = Vec::new();
        let mut vpos;
        let endv;

        match side {
            MonotoneSide::Right => {
                // right side is a single edge; walk down the left chain
                reflex.push(self.mchain[posmax].vnum);
                let tmp = self.mchain[posmax].next;
                reflex.push(self.mchain[tmp].vnum);
                vpos = self.mchain[tmp].next;
                endv = self.mchain[self.mchain[posmax].prev].vnum;
            }
            MonotoneSide::Left => {
                // left side is a single edge; walk down the right chain
                let tmp = self.mchain[posmax].next;
                reflex.push(self.mchain[tmp].vnum);
                let tmp = self.mchain[tmp].next;
                reflex.push(self.mchain[tmp].vnum);
                vpos = self.mchain[tmp].next;
                endv = self.mchain[posmax].vnum;
            }
        }

        let mut v = self.mchain[vpos].vnum;
        while v != endv || reflex.len() > 2 {
            if reflex.len() > 1 {
                let a = self.vert[v.usize()].pt;
                let b = self.vert[reflex[reflex.len() - 2].usize()].pt;
                let c = self.vert[reflex[reflex.len() - 1].usize()].pt;
                if point::cross(a, b, c) > 0.0 {
                    // convex corner: cut it off
                    self.triangles.push(Triangle([
                        reflex[reflex.len() - 2].usize(),
                        reflex[reflex.len() - 1].usize(),
                        v.usize(),
                    ]));
                    reflex.pop();
                } else {
                    reflex.push(v);
                    vpos = self.mchain[vpos].next;
                    v = self.mchain[vpos].vnum;
                }
            } else {
                reflex.push(v);
                vpos = self.mchain[vpos].next;
                v = self.mchain[vpos].vnum;
            }
        }

        if reflex.len() < 2 {
            return Err(TriangulateError::internal("monotone chain collapsed early"));
        }
        // bottom vertex reached: the last two stack entries close it off
        self.triangles.push(Triangle([
            reflex[reflex.len() - 2].usize(),
            reflex[reflex.len() - 1].usize(),
            v.usize(),
        ]));

        Ok(())
    }
}
