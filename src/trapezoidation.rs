use rand::prelude::SliceRandom;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{
    errors::{Arena, TriangulateError},
    idx::{Idx, VecExt},
    math,
    point::Point,
    querynode::{Node, NodeKind},
    segment::Segment,
    trapezoid::{Side, Trapezoid},
    Triangulator,
};

/// Which endpoint of a segment, in ring order (before canonicalization).
#[derive(Clone, Copy, PartialEq, Eq)]
enum Which {
    First,
    Last,
}

fn req<T>(idx: Option<Idx<T>>, what: &str) -> Result<Idx<T>, TriangulateError> {
    idx.ok_or_else(|| TriangulateError::internal(format!("missing {}", what)))
}

impl Triangulator {
    /// Produce the randomized insertion order for the `n` loaded segments.
    /// A caller-provided seed makes the whole run reproducible.
    pub(crate) fn generate_ordering(&mut self, n: usize) {
        self.permute.clear();
        self.permute.extend((0..n).map(Idx::new));
        match self.options.seed {
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                self.permute.shuffle(&mut rng);
            }
            None => self.permute.shuffle(&mut rand::thread_rng()),
        }
        self.choose = 0;
    }

    fn choose_segment(&mut self) -> Idx<Segment> {
        let segnum = self.permute[self.choose];
        self.choose += 1;
        segnum
    }

    fn new_trap(&mut self) -> Result<Idx<Trapezoid>, TriangulateError> {
        if self.tr.len() >= self.tr_limit {
            Err(TriangulateError::ArenaOverflow(Arena::Trapezoids))
        } else {
            Ok(self.tr.push_get_index(Trapezoid::default()))
        }
    }

    fn new_node(&mut self, node: Node) -> Result<Idx<Node>, TriangulateError> {
        if self.qs.len() >= self.q_limit {
            Err(TriangulateError::ArenaOverflow(Arena::QueryNodes))
        } else {
            Ok(self.qs.push_get_index(node))
        }
    }

    fn is_left_of(&self, segnum: Idx<Segment>, v: Point) -> bool {
        let s = &self.seg[segnum];
        self.ord.is_left_of(s.v0, s.v1, v)
    }

    /// Is the given endpoint already part of the trapezoidation? An endpoint
    /// is shared with the adjoining ring segment, so it is present exactly
    /// when that neighbour has been inserted.
    fn endpoint_inserted(&self, segnum: Idx<Segment>, which: Which) -> bool {
        match which {
            Which::First => self.seg[self.seg[segnum].prev].is_inserted,
            Which::Last => self.seg[self.seg[segnum].next].is_inserted,
        }
    }

    /// Seed the query structure and trapezoid table with the first segment:
    /// two Y nodes bracketing its y-range, one X node, four sinks, and the
    /// four trapezoids above, below, and flanking the segment. Returns the
    /// root node, which every later location query descends from.
    fn init_query_structure(&mut self, segnum: Idx<Segment>) -> Result<Idx<Node>, TriangulateError> {
        if self.qs.len() + 7 > self.q_limit {
            return Err(TriangulateError::ArenaOverflow(Arena::QueryNodes));
        }
        if self.tr.len() + 4 > self.tr_limit {
            return Err(TriangulateError::ArenaOverflow(Arena::Trapezoids));
        }

        let s = self.seg[segnum];
        let hi = self.ord.max(s.v0, s.v1);
        let lo = self.ord.min(s.v0, s.v1);

        let i1 = self.qs.next_index();
        let (i2, i3, i4, i5, i6, i7) = (i1 + 1, i1 + 2, i1 + 3, i1 + 4, i1 + 5, i1 + 6);
        let t1 = self.tr.next_index(); // middle left
        let (t2, t3, t4) = (t1 + 1, t1 + 2, t1 + 3); // middle right, bottommost, topmost

        self.qs.push(Node { parent: None, kind: NodeKind::Y { yval: hi, below: i3, above: i2 } });
        self.qs.push(Node::sink(t4, Some(i1)));
        self.qs.push(Node { parent: Some(i1), kind: NodeKind::Y { yval: lo, below: i4, above: i5 } });
        self.qs.push(Node::sink(t3, Some(i3)));
        self.qs.push(Node { parent: Some(i3), kind: NodeKind::X { seg: segnum, left: i6, right: i7 } });
        self.qs.push(Node::sink(t1, Some(i5)));
        self.qs.push(Node::sink(t2, Some(i5)));

        let inf = f64::INFINITY;
        self.tr.push(Trapezoid {
            rseg: Some(segnum),
            hi,
            lo,
            u0: Some(t4),
            d0: Some(t3),
            sink: Some(i6),
            ..Trapezoid::default()
        });
        self.tr.push(Trapezoid {
            lseg: Some(segnum),
            hi,
            lo,
            u0: Some(t4),
            d0: Some(t3),
            sink: Some(i7),
            ..Trapezoid::default()
        });
        self.tr.push(Trapezoid {
            hi: lo,
            lo: Point::new(-inf, -inf),
            u0: Some(t1),
            u1: Some(t2),
            sink: Some(i4),
            ..Trapezoid::default()
        });
        self.tr.push(Trapezoid {
            hi: Point::new(inf, inf),
            lo: hi,
            d0: Some(t1),
            d1: Some(t2),
            sink: Some(i2),
            ..Trapezoid::default()
        });

        self.seg[segnum].is_inserted = true;
        Ok(i1)
    }

    /// Locate the trapezoid containing `v`, descending from node `root`.
    ///
    /// `vo` is the segment's other endpoint and is consulted only to break
    /// ties: when `v` coincides with a stored branch point or an endpoint of
    /// a branch segment, the side is decided by where the segment continues.
    pub(crate) fn locate(&self, v: Point, vo: Point, root: Idx<Node>) -> Idx<Trapezoid> {
        let mut qi = root;
        loop {
            match self.qs[qi].kind {
                NodeKind::Sink(trap) => return trap,
                NodeKind::Y { yval, below, above } => {
                    qi = if self.ord.gt(v, yval) {
                        above
                    } else if self.ord.eq(v, yval) {
                        // the point itself is already inserted; follow the
                        // direction the segment leaves it in
                        if self.ord.gt(vo, yval) { above } else { below }
                    } else {
                        below
                    };
                }
                NodeKind::X { seg, left, right } => {
                    let s = &self.seg[seg];
                    qi = if self.ord.eq(v, s.v0) || self.ord.eq(v, s.v1) {
                        if self.ord.fp_eq(v.y, vo.y) {
                            // horizontal incidence: x decides
                            if vo.x < v.x { left } else { right }
                        } else if self.is_left_of(seg, vo) {
                            left
                        } else {
                            right
                        }
                    } else if self.is_left_of(seg, v) {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Split the trapezoid containing `v` horizontally at `v`'s level,
    /// grafting a Y node with two fresh sinks over the old sink. Returns
    /// `(upper, lower)` pieces.
    fn split_trapezoid_at(
        &mut self,
        v: Point,
        vo: Point,
        root: Idx<Node>,
    ) -> Result<(Idx<Trapezoid>, Idx<Trapezoid>), TriangulateError> {
        let tu = self.locate(v, vo, root);
        let tl = self.new_trap()?;
        let copy = self.tr[tu];
        self.tr[tl] = copy;
        self.tr[tu].lo = v;
        self.tr[tl].hi = v;
        self.tr[tu].d0 = Some(tl);
        self.tr[tu].d1 = None;
        self.tr[tl].u0 = Some(tu);
        self.tr[tl].u1 = None;

        // the pieces below now neighbour tl, not tu
        if let Some(d) = self.tr[tl].d0 {
            self.tr[d].replace_upper(tu, tl);
        }
        if let Some(d) = self.tr[tl].d1 {
            self.tr[d].replace_upper(tu, tl);
        }

        let sk = req(self.tr[tu].sink, "sink of split trapezoid")?;
        let i1 = self.new_node(Node::sink(tu, Some(sk)))?;
        let i2 = self.new_node(Node::sink(tl, Some(sk)))?;
        self.qs[sk].kind = NodeKind::Y { yval: v, below: i2, above: i1 };
        self.tr[tu].sink = Some(i1);
        self.tr[tl].sink = Some(i2);
        Ok((tu, tl))
    }

    /// Rewire the upper neighbourhood of a trapezoid `t` that has just been
    /// split into `(t, tn)` by the segment being threaded. Handles chain
    /// continuation (including a parked third upper neighbour), upward
    /// cusps, and the fresh-segment case. `s_v1` is the segment's lower
    /// endpoint, used to side the cusp.
    fn fix_upper_after_split(
        &mut self,
        t: Idx<Trapezoid>,
        tn: Idx<Trapezoid>,
        s_v1: Point,
    ) -> Result<(), TriangulateError> {
        match (self.tr[t].u0, self.tr[t].u1) {
            (Some(u0), Some(u1)) => {
                // continuation of a chain from above
                if let Some((usave, uside)) = self.tr[t].usave {
                    if uside == Side::Left {
                        self.tr[tn].u0 = Some(u1);
                        self.tr[t].u1 = None;
                        self.tr[tn].u1 = Some(usave);

                        self.tr[u0].d0 = Some(t);
                        self.tr[u1].d0 = Some(tn);
                        self.tr[usave].d0 = Some(tn);
                    } else {
                        // the chain intersects on the right
                        self.tr[tn].u1 = None;
                        self.tr[tn].u0 = Some(u1);
                        self.tr[t].u1 = Some(u0);
                        self.tr[t].u0 = Some(usave);

                        self.tr[usave].d0 = Some(t);
                        self.tr[u0].d0 = Some(t);
                        self.tr[u1].d0 = Some(tn);
                    }
                    self.tr[t].usave = None;
                    self.tr[tn].usave = None;
                } else {
                    self.tr[tn].u0 = Some(u1);
                    self.tr[t].u1 = None;
                    self.tr[tn].u1 = None;
                    self.tr[u1].d0 = Some(tn);
                }
            }
            (u0, _) => {
                // fresh segment at this level, or an upward cusp
                let u0 = req(u0, "upper neighbour of threaded trapezoid")?;
                if self.tr[u0].d0.is_some() && self.tr[u0].d1.is_some() {
                    // upward cusp: decide which flank the segment hugs
                    let td0 = req(self.tr[u0].d0, "cusp lower neighbour")?;
                    let hugs_right = match self.tr[td0].rseg {
                        Some(rseg) => !self.is_left_of(rseg, s_v1),
                        None => false,
                    };
                    if hugs_right {
                        self.tr[t].u0 = None;
                        self.tr[t].u1 = None;
                        self.tr[tn].u1 = None;
                        self.tr[u0].d1 = Some(tn);
                    } else {
                        // cusp going leftwards
                        self.tr[tn].u0 = None;
                        self.tr[tn].u1 = None;
                        self.tr[t].u1 = None;
                        self.tr[u0].d0 = Some(t);
                    }
                } else {
                    self.tr[u0].d0 = Some(t);
                    self.tr[u0].d1 = Some(tn);
                }
            }
        }
        Ok(())
    }

    /// Thread segment `segnum` into the trapezoidation: split the trapezoids
    /// containing its endpoints horizontally where the endpoints are new,
    /// then walk top to bottom through every trapezoid the segment crosses,
    /// splitting each into a left and a right piece, and finally merge
    /// redundant pieces along both flanks.
    pub(crate) fn add_segment(&mut self, segnum: Idx<Segment>) -> Result<(), TriangulateError> {
        let mut s = self.seg[segnum];
        let mut is_swapped = false;
        if self.ord.gt(s.v1, s.v0) {
            // canonicalize: v0 is the upper endpoint
            std::mem::swap(&mut s.v0, &mut s.v1);
            std::mem::swap(&mut s.root0, &mut s.root1);
            is_swapped = true;
        }

        let mut tribot = false;

        let which = if is_swapped { Which::Last } else { Which::First };
        let tfirst = if !self.endpoint_inserted(segnum, which) {
            let (_, tl) = self.split_trapezoid_at(s.v0, s.v1, s.root0)?;
            tl
        } else {
            // v0 already present; its trapezoid is the topmost intersected
            self.locate(s.v0, s.v1, s.root0)
        };

        let which = if is_swapped { Which::First } else { Which::Last };
        let tlast = if !self.endpoint_inserted(segnum, which) {
            let (tu, _) = self.split_trapezoid_at(s.v1, s.v0, s.root1)?;
            tu
        } else {
            tribot = true;
            self.locate(s.v1, s.v0, s.root1)
        };

        // Walk from tfirst down to tlast, splitting every trapezoid the
        // segment crosses into a left piece (reusing the record) and a new
        // right piece, and grafting an X node over each old sink.
        let mut tfirstr = None;
        let mut tlastr = None;
        let mut tcur = Some(tfirst);
        while let Some(t) = tcur {
            if !self.ord.ge(self.tr[t].lo, self.tr[tlast].lo) {
                break;
            }

            let sk = req(self.tr[t].sink, "sink of crossed trapezoid")?;
            let tn = self.new_trap()?;
            let i1 = self.new_node(Node::sink(t, Some(sk)))?;
            let i2 = self.new_node(Node::sink(tn, Some(sk)))?;
            self.qs[sk].kind = NodeKind::X { seg: segnum, left: i1, right: i2 };

            if t == tfirst {
                tfirstr = Some(tn);
            }
            if self.ord.eq(self.tr[t].lo, self.tr[tlast].lo) {
                tlastr = Some(tn);
            }

            let copy = self.tr[t];
            self.tr[tn] = copy;
            self.tr[t].sink = Some(i1);
            self.tr[tn].sink = Some(i2);

            tcur = match (self.tr[t].d0, self.tr[t].d1) {
                (None, None) => {
                    return Err(TriangulateError::internal(
                        "segment threading reached a trapezoid with no lower neighbour",
                    ));
                }
                (Some(d0), None) => {
                    // only one trapezoid below, on the d0 slot
                    self.fix_upper_after_split(t, tn, s.v1)?;

                    if tribot && self.ord.eq(self.tr[t].lo, self.tr[tlast].lo) {
                        // lower endpoint was already present: bottom forms a triangle.
                        // The ring-adjacent segment decides the attachment side.
                        let tri = if is_swapped { self.seg[segnum].prev } else { self.seg[segnum].next };
                        if self.is_left_of(tri, s.v0) {
                            // left-right downward cusp
                            self.tr[d0].u0 = Some(t);
                            self.tr[tn].d0 = None;
                            self.tr[tn].d1 = None;
                        } else {
                            // right-left downward cusp
                            let tnd = req(self.tr[tn].d0, "triangle lower neighbour")?;
                            self.tr[tnd].u1 = Some(tn);
                            self.tr[t].d0 = None;
                            self.tr[t].d1 = None;
                        }
                    } else {
                        if let (Some(du0), Some(du1)) = (self.tr[d0].u0, self.tr[d0].u1) {
                            // d0 picks up a third upper neighbour; park it
                            self.tr[d0].usave = if du0 == t {
                                // the segment passes through the left side
                                Some((du1, Side::Left))
                            } else {
                                Some((du0, Side::Right))
                            };
                        }
                        self.tr[d0].u0 = Some(t);
                        self.tr[d0].u1 = Some(tn);
                    }

                    self.tr[t].d0
                }
                (None, Some(d1)) => {
                    // only one trapezoid below, on the d1 slot
                    self.fix_upper_after_split(t, tn, s.v1)?;

                    if tribot && self.ord.eq(self.tr[t].lo, self.tr[tlast].lo) {
                        let tri = if is_swapped { self.seg[segnum].prev } else { self.seg[segnum].next };
                        if self.is_left_of(tri, s.v0) {
                            self.tr[d1].u0 = Some(t);
                            self.tr[tn].d0 = None;
                            self.tr[tn].d1 = None;
                        } else {
                            let tnd = req(self.tr[tn].d1, "triangle lower neighbour")?;
                            self.tr[tnd].u1 = Some(tn);
                            self.tr[t].d0 = None;
                            self.tr[t].d1 = None;
                        }
                    } else {
                        if let (Some(du0), Some(du1)) = (self.tr[d1].u0, self.tr[d1].u1) {
                            self.tr[d1].usave = if du0 == t {
                                Some((du1, Side::Left))
                            } else {
                                Some((du0, Side::Right))
                            };
                        }
                        self.tr[d1].u0 = Some(t);
                        self.tr[d1].u1 = Some(tn);
                    }

                    self.tr[t].d1
                }
                (Some(d0), Some(d1)) => {
                    // two trapezoids below; find which one the segment pierces
                    let pierces_d0 = if self.ord.fp_eq(self.tr[t].lo.y, s.v0.y) {
                        self.tr[t].lo.x > s.v0.x
                    } else {
                        let y0 = self.tr[t].lo.y;
                        let yt = (y0 - s.v0.y) / (s.v1.y - s.v0.y);
                        let pt = Point::new(s.v0.x + yt * (s.v1.x - s.v0.x), y0);
                        self.ord.lt(pt, self.tr[t].lo)
                    };

                    self.fix_upper_after_split(t, tn, s.v1)?;

                    if tribot && self.ord.eq(self.tr[t].lo, self.tr[tlast].lo) {
                        // only at the lowest trapezoid, when the lower
                        // endpoint was already present
                        self.tr[d0].u0 = Some(t);
                        self.tr[d0].u1 = None;
                        self.tr[d1].u0 = Some(tn);
                        self.tr[d1].u1 = None;

                        self.tr[tn].d0 = Some(d1);
                        self.tr[t].d1 = None;
                        self.tr[tn].d1 = None;
                        None
                    } else if pierces_d0 {
                        self.tr[d0].u0 = Some(t);
                        self.tr[d0].u1 = Some(tn);
                        self.tr[d1].u0 = Some(tn);
                        self.tr[d1].u1 = None;
                        self.tr[t].d1 = None;
                        Some(d0)
                    } else {
                        self.tr[d0].u0 = Some(t);
                        self.tr[d0].u1 = None;
                        self.tr[d1].u0 = Some(t);
                        self.tr[d1].u1 = Some(tn);
                        self.tr[tn].d0 = Some(d1);
                        self.tr[tn].d1 = None;
                        Some(d1)
                    }
                }
            };

            self.tr[t].rseg = Some(segnum);
            self.tr[tn].lseg = Some(segnum);
        }

        // All the pieces flanking the segment were created by this split and
        // each has a single parent, so redundant ones can be folded now.
        self.merge_trapezoids(segnum, Some(tfirst), Some(tlast), Side::Left)?;
        self.merge_trapezoids(segnum, tfirstr, tlastr, Side::Right)?;

        self.seg[segnum].is_inserted = true;
        Ok(())
    }

    /// Walk down one flank of a freshly threaded segment and fold every pair
    /// of vertically adjacent trapezoids that share both bounding segments:
    /// the lower one is invalidated, its sink's parent redirected to the
    /// survivor, and its lower neighbours transferred.
    fn merge_trapezoids(
        &mut self,
        segnum: Idx<Segment>,
        tfirst: Option<Idx<Trapezoid>>,
        tlast: Option<Idx<Trapezoid>>,
        side: Side,
    ) -> Result<(), TriangulateError> {
        let tlast = match tlast {
            Some(t) => t,
            None => return Ok(()),
        };

        let flank_matches = |this: &Self, t: Idx<Trapezoid>| match side {
            Side::Left => this.tr[t].rseg == Some(segnum),
            Side::Right => this.tr[t].lseg == Some(segnum),
        };

        let mut tcur = tfirst;
        while let Some(t) = tcur {
            if !self.ord.ge(self.tr[t].lo, self.tr[tlast].lo) {
                break;
            }

            let d0 = self.tr[t].d0;
            let d1 = self.tr[t].d1;
            let tnext = d0
                .filter(|&d| flank_matches(self, d))
                .or_else(|| d1.filter(|&d| flank_matches(self, d)));

            match tnext {
                Some(tn) => {
                    if self.tr[t].lseg == self.tr[tn].lseg && self.tr[t].rseg == self.tr[tn].rseg {
                        // good neighbours: fold tn into t
                        let tn_sink = req(self.tr[tn].sink, "sink of merged trapezoid")?;
                        let t_sink = req(self.tr[t].sink, "sink of surviving trapezoid")?;
                        let parent = req(self.qs[tn_sink].parent, "parent of merged sink")?;
                        self.qs[parent].replace_child(tn_sink, t_sink);

                        let (tn_d0, tn_d1, tn_lo) = (self.tr[tn].d0, self.tr[tn].d1, self.tr[tn].lo);
                        self.tr[t].d0 = tn_d0;
                        if let Some(d) = tn_d0 {
                            self.tr[d].replace_upper(tn, t);
                        }
                        self.tr[t].d1 = tn_d1;
                        if let Some(d) = tn_d1 {
                            self.tr[d].replace_upper(tn, t);
                        }
                        self.tr[t].lo = tn_lo;
                        self.tr[tn].valid = false;
                        // keep walking from t; its extended span may merge again
                    } else {
                        tcur = Some(tn);
                    }
                }
                None => tcur = d1,
            }
        }

        Ok(())
    }

    /// Rebase the cached query-structure roots of an uninserted segment's
    /// endpoints to the sink of the trapezoid currently containing them, so
    /// the eventual insertion starts its descent near the leaves.
    fn find_new_roots(&mut self, segnum: Idx<Segment>) -> Result<(), TriangulateError> {
        let s = self.seg[segnum];
        if s.is_inserted {
            return Ok(());
        }

        let t0 = self.locate(s.v0, s.v1, s.root0);
        self.seg[segnum].root0 = req(self.tr[t0].sink, "root sink")?;

        let t1 = self.locate(s.v1, s.v0, s.root1);
        self.seg[segnum].root1 = req(self.tr[t1].sink, "root sink")?;
        Ok(())
    }

    /// Build the full trapezoidation of the `nseg` loaded segments.
    ///
    /// Segments are inserted in randomized order, batched over `log* n`
    /// rounds: round `h` tops the inserted count up to `N(n, h)`, then every
    /// pending endpoint's cached root is rebased. The doubling schedule is
    /// what bounds the expected total location cost at O(n log* n).
    pub(crate) fn construct_trapezoids(&mut self, nseg: usize) -> Result<(), TriangulateError> {
        let first = self.choose_segment();
        let root = self.init_query_structure(first)?;
        for s in self.seg.iter_mut() {
            s.root0 = root;
            s.root1 = root;
        }

        let rounds = math::logstar(nseg);
        for h in 1..=rounds {
            for _ in math::batch_bound(nseg, h - 1)..math::batch_bound(nseg, h) {
                let segnum = self.choose_segment();
                self.add_segment(segnum)?;
            }
            for i in 0..nseg {
                self.find_new_roots(Idx::new(i))?;
            }
        }
        for _ in math::batch_bound(nseg, rounds)..nseg {
            let segnum = self.choose_segment();
            self.add_segment(segnum)?;
        }

        Ok(())
    }
}
