//! Derivative engine
//!
//! ```text
//! D null       = null
//! D empty      = null
//! D term(t)    = if token == t then empty else null
//! D alt(a, b)  = alt(D a, D b)
//! D cat(a, b)  = if nullable(a) then alt(cat(D a, b), D b)
//!                               else cat(D a, b)
//! ```
//!
//! Each `Alt`/`Cat` records the node it is deriving into before descending,
//! so a revisit through a cycle links to that node instead of recursing
//! again. Deriving a cyclic grammar therefore terminates and produces a
//! cyclic result.
//!
//! Recursion depth follows the longest acyclic path from `g`.

use crate::grammar::{Grammar, Node, NodeId};

impl<T: PartialEq> Grammar<T> {
    /// The grammar of everything that may follow `token` in the language of
    /// `g`. The input graph is left as it was.
    pub fn derivative(&mut self, g: NodeId, token: &T) -> NodeId {
        self.walk.advance();
        self.derive(g, token)
    }

    fn derive(&mut self, g: NodeId, token: &T) -> NodeId {
        if let Some(derived) = self.memo(g) {
            return derived;
        }
        self.visit(g);

        match *self.node(g) {
            Node::Null | Node::Empty => self.null(),
            Node::Term(ref t) => {
                if t == token {
                    self.empty()
                } else {
                    self.null()
                }
            }
            Node::Alt(a, b) => {
                let d = self.reserve();
                self.set_memo(g, d);
                let da = self.derive(a, token);
                let db = self.derive(b, token);
                self.fill(d, Node::Alt(da, db));
                d
            }
            Node::Cat(a, b) => {
                let d = self.reserve();
                self.set_memo(g, d);
                // the right-hand side is shared with the input, not derived
                if self.nullable(a) {
                    let da = self.derive(a, token);
                    let left = self.cat(da, b);
                    let db = self.derive(b, token);
                    self.fill(d, Node::Alt(left, db));
                } else {
                    let da = self.derive(a, token);
                    self.fill(d, Node::Cat(da, b));
                }
                d
            }
        }
    }
}
