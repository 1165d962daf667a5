//! Compaction
//!
//! ```text
//! alt(a, null)  => a
//! alt(null, b)  => b
//! cat(a, empty) => a
//! cat(empty, b) => b
//! ```
//!
//! A node whose language is empty collapses to the canonical `Null`, one
//! whose language is exactly `{ε}` to the canonical `Empty`. Otherwise the
//! identities above are tried, and a node that survives them is rebuilt
//! from its compacted children.
//!
//! Rebuilt nodes are recorded before their children are visited, so cycles
//! in the input come out as cycles in the result. A node that is being
//! replaced by one of its children is recorded as itself until that child
//! is done; a cycle that leads back to it meanwhile keeps the original,
//! uncompacted node.
//!
//! Like derivation, compaction recurses once per node along a path.

use crate::grammar::{Grammar, Node, NodeId};

impl<T> Grammar<T> {
    /// An equivalent, usually smaller grammar for `g`.
    pub fn compact(&mut self, g: NodeId) -> NodeId {
        self.walk.advance();
        self.compact_in(g)
    }

    fn compact_in(&mut self, g: NodeId) -> NodeId {
        if let Some(compacted) = self.memo(g) {
            return compacted;
        }
        self.visit(g);

        let (a, b, is_alt) = match *self.node(g) {
            Node::Null | Node::Empty | Node::Term(_) => return g,
            Node::Alt(a, b) => (a, b, true),
            Node::Cat(a, b) => (a, b, false),
        };

        if self.is_null(g) {
            let null = self.null();
            self.set_memo(g, null);
            return null;
        }
        if self.is_empty(g) {
            let empty = self.empty();
            self.set_memo(g, empty);
            return empty;
        }

        if is_alt {
            if self.is_null(a) {
                return self.replace_with(g, b);
            }
            if self.is_null(b) {
                return self.replace_with(g, a);
            }
        } else {
            if self.is_empty(a) {
                return self.replace_with(g, b);
            }
            if self.is_empty(b) {
                return self.replace_with(g, a);
            }
        }

        let rebuilt = self.reserve();
        self.set_memo(g, rebuilt);
        let ca = self.compact_in(a);
        let cb = self.compact_in(b);
        self.fill(rebuilt, if is_alt { Node::Alt(ca, cb) } else { Node::Cat(ca, cb) });
        rebuilt
    }

    fn replace_with(&mut self, g: NodeId, child: NodeId) -> NodeId {
        self.set_memo(g, g);
        let compacted = self.compact_in(child);
        self.set_memo(g, compacted);
        compacted
    }

    /// Number of distinct nodes reachable from `g`.
    pub fn size(&mut self, g: NodeId) -> usize {
        self.walk.advance();

        let mut count = 0;
        let mut stack = vec![g];
        while let Some(id) = stack.pop() {
            if self.visited(id) {
                continue;
            }
            self.visit(id);
            count += 1;
            if let Some((a, b)) = self.node(id).children() {
                stack.push(b);
                stack.push(a);
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sums(g: &mut Grammar<char>) -> NodeId {
        g.recursive(|g, s| {
            let one = g.term('1');
            let plus = g.term('+');
            let tail = g.cat(plus, s);
            let rec = g.cat(s, tail);
            Node::Alt(one, rec)
        })
    }

    #[test]
    fn test_leaves_are_returned_as_is() {
        let mut g = Grammar::new();
        let t = g.term('t');
        assert_eq!(g.compact(t), t);
        assert_eq!(g.compact(g.null()), g.null());
        assert_eq!(g.compact(g.empty()), g.empty());
    }

    #[test]
    fn test_alt_drops_null_branch() {
        let mut g = Grammar::new();
        let t = g.term('t');
        let null = g.null();
        let left = g.alt(t, null);
        let right = g.alt(null, t);

        assert_eq!(g.compact(left), t);
        assert_eq!(g.compact(right), t);
    }

    #[test]
    fn test_cat_drops_empty_factor() {
        let mut g = Grammar::new();
        let t = g.term('t');
        let empty = g.empty();
        let left = g.cat(t, empty);
        let right = g.cat(empty, t);

        assert_eq!(g.compact(left), t);
        assert_eq!(g.compact(right), t);
    }

    #[test]
    fn test_collapse_to_canonical_nodes() {
        let mut g = Grammar::new();
        let t = g.term('t');
        let (null, empty) = (g.null(), g.empty());
        let dead = g.cat(t, null);
        let eps = g.cat(empty, empty);
        let nested = g.alt(eps, eps);

        assert_eq!(g.compact(dead), null);
        assert_eq!(g.compact(eps), empty);
        assert_eq!(g.compact(nested), empty);
    }

    #[test]
    fn test_nested_simplification() {
        // ((t . ε) | ∅) . (ε . u)  =>  t . u
        let mut g = Grammar::new();
        let t = g.term('t');
        let u = g.term('u');
        let (null, empty) = (g.null(), g.empty());
        let t_eps = g.cat(t, empty);
        let left = g.alt(t_eps, null);
        let right = g.cat(empty, u);
        let top = g.cat(left, right);

        let c = g.compact(top);
        assert_eq!(*g.node(c), Node::Cat(t, u));
        assert_eq!(g.size(c), 3);
    }

    #[test]
    fn test_cycles_survive_compaction() {
        let mut g = Grammar::new();
        let s = sums(&mut g);
        let c = g.compact(s);

        assert_ne!(c, s);
        assert_eq!(g.size(c), g.size(s));
        // the rebuilt copy still refers to itself
        assert!(g.reachable(c).iter().any(|&id| {
            g.node(id).children().is_some_and(|(a, b)| a == c || b == c)
        }));
    }

    #[test]
    fn test_compact_is_idempotent_on_size() {
        let mut g = Grammar::new();
        let s = sums(&mut g);
        let d = g.derivative(s, &'1');
        let once = g.compact(d);
        let twice = g.compact(once);

        assert!(g.size(twice) <= g.size(once));
        assert_eq!(g.nullable(once), g.nullable(twice));
    }

    #[test]
    fn test_size_counts_distinct_nodes() {
        let mut g = Grammar::new();
        let t = g.term('t');
        let shared = g.alt(t, t);
        let top = g.cat(shared, shared);

        assert_eq!(g.size(top), 3);
        assert_eq!(g.size(t), 1);

        let s = sums(&mut g);
        assert_eq!(g.size(s), 5);
    }
}
