use crate::{idx::{Idx, IdxDisplay}, point::Point, segment::Segment, trapezoid::Trapezoid};

/// One decision node of the point-location structure. The structure is a
/// tree (each node has a single parent) even though several sinks may name
/// the same trapezoid after merging.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Node {
    pub parent: Option<Idx<Node>>,
    pub kind: NodeKind,
}

/// For a `Y` node, `below` is taken when the query point is under `yval`
/// and `above` otherwise; for an `X` node, `left`/`right` relative to the
/// stored segment. A `Sink` names exactly one trapezoid.
#[derive(Debug, Clone, Copy)]
pub(crate) enum NodeKind {
    Y { yval: Point, below: Idx<Node>, above: Idx<Node> },
    X { seg: Idx<Segment>, left: Idx<Node>, right: Idx<Node> },
    Sink(Idx<Trapezoid>),
}

impl IdxDisplay for Node {
    fn fmt(f: &mut std::fmt::Formatter<'_>, idx: usize) -> std::fmt::Result {
        write!(f, "q{}", idx)
    }
}

impl Node {
    pub fn sink(trap: Idx<Trapezoid>, parent: Option<Idx<Node>>) -> Self {
        Self {
            parent,
            kind: NodeKind::Sink(trap),
        }
    }

    /// Redirect the child edge currently pointing at `old` to `new`.
    /// Used when a merged trapezoid's sink is unlinked from the tree.
    pub fn replace_child(&mut self, old: Idx<Node>, new: Idx<Node>) {
        match &mut self.kind {
            NodeKind::Y { below, above, .. } => {
                if *below == old {
                    *below = new;
                } else if *above == old {
                    *above = new;
                }
            }
            NodeKind::X { left, right, .. } => {
                if *left == old {
                    *left = new;
                } else if *right == old {
                    *right = new;
                }
            }
            NodeKind::Sink(_) => {}
        }
    }
}
