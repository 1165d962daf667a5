//! Nullability oracle
//!
//! Three single-pass decision procedures over the grammar graph:
//!
//! - [`Grammar::nullable`]: does the language contain the empty sequence?
//! - [`Grammar::is_null`]: is the language empty?
//! - [`Grammar::is_empty`]: is the language exactly the empty sequence?
//!
//! Each top-level call starts a new nullability pass. Cycles are broken by
//! assumption: the first visit of an `Alt`/`Cat` records a seed answer
//! before descending, and a revisit through a cycle reads whatever is
//! recorded at that moment. `nullable` seeds `false`; `is_null` and
//! `is_empty` seed `true`. Inside a cycle this is a one-pass approximation
//! rather than a least fixed point.
//!
//! Answers computed while a seed is still in force are cached for the rest
//! of the pass, so they can disagree with a fresh call on the same node. For
//! `top = n d`, `n = d | "x"`, `d = n "y"` (language `x y* x y+`), `d` is
//! settled as null while `n` still carries its seed, and `is_null(top)`
//! reads that. It returns `true`, and compaction then rejects `"xxy"`,
//! although `is_null(d)` on its own is `false`.
//!
//! All three walks recurse on the native stack, one frame per node along a
//! path, so very deep hand-built chains can exhaust it.

use crate::grammar::{Grammar, Node, NodeId};

impl<T> Grammar<T> {
    /// Whether the language of `g` contains the empty sequence.
    pub fn nullable(&mut self, g: NodeId) -> bool {
        self.walk_nullable.advance();
        self.nullable_in(g)
    }

    /// Whether the language of `g` is the empty set.
    pub fn is_null(&mut self, g: NodeId) -> bool {
        self.walk_nullable.advance();
        self.is_null_in(g)
    }

    /// Whether the language of `g` is exactly `{ε}`.
    pub fn is_empty(&mut self, g: NodeId) -> bool {
        self.walk_nullable.advance();
        self.is_empty_in(g)
    }

    fn nullable_in(&mut self, g: NodeId) -> bool {
        match *self.node(g) {
            Node::Null | Node::Term(_) => false,
            Node::Empty => true,
            Node::Alt(a, b) => self.assume(g, false, |gr| gr.nullable_in(a) || gr.nullable_in(b)),
            Node::Cat(a, b) => self.assume(g, false, |gr| gr.nullable_in(a) && gr.nullable_in(b)),
        }
    }

    fn is_null_in(&mut self, g: NodeId) -> bool {
        match *self.node(g) {
            Node::Null => true,
            Node::Empty | Node::Term(_) => false,
            Node::Alt(a, b) => self.assume(g, true, |gr| gr.is_null_in(a) && gr.is_null_in(b)),
            Node::Cat(a, b) => self.assume(g, true, |gr| gr.is_null_in(a) || gr.is_null_in(b)),
        }
    }

    fn is_empty_in(&mut self, g: NodeId) -> bool {
        match *self.node(g) {
            Node::Null | Node::Term(_) => false,
            Node::Empty => true,
            Node::Alt(a, b) | Node::Cat(a, b) => {
                self.assume(g, true, |gr| gr.is_empty_in(a) && gr.is_empty_in(b))
            }
        }
    }
}
