//! Epoch-scoped traversal metadata
//!
//! Every traversal pass stamps the nodes it visits with the current epoch.
//! A cached result is trusted only while the node's stamp equals the
//! counter, so advancing the counter invalidates every cache at once
//! without touching the nodes.
//!
//! There are two independent counters. The derivative family (derivative,
//! compaction, size) owns `walk` and the `memo` slot; the nullability family
//! (nullable, is_null, is_empty) owns `walk_nullable` and the `flag` slot.
//! Both counters and the metadata table belong to a single [`Grammar`], and
//! every pass borrows it mutably, so two passes can never overlap.

use crate::grammar::{Grammar, NodeId};

/// Monotonic pass counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Epoch(u64);

impl Epoch {
    /// Begin a new pass and return its stamp.
    pub(crate) fn advance(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    pub(crate) fn current(self) -> u64 {
        self.0
    }
}

/// Traversal metadata kept alongside each node.
///
/// Stamps start at zero and counters start handing out one, so fresh
/// metadata is never mistaken for a visit.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Meta {
    /// Last derivative-family pass that visited the node
    pub(crate) walk: u64,
    /// Last nullability-family pass that visited the node
    pub(crate) walk_nullable: u64,
    /// Answer (partial while the node is on the stack) of the nullability pass
    pub(crate) flag: bool,
    /// Node produced for this one by the current derivative-family pass
    pub(crate) memo: Option<NodeId>,
}

impl<T> Grammar<T> {
    /// Whether the current derivative-family pass has reached `id`.
    pub(crate) fn visited(&self, id: NodeId) -> bool {
        self.meta[id.index()].walk == self.walk.current()
    }

    /// Stamp `id` for the current derivative-family pass, dropping any memo
    /// left over from an earlier one.
    pub(crate) fn visit(&mut self, id: NodeId) {
        let walk = self.walk.current();
        let meta = &mut self.meta[id.index()];
        meta.walk = walk;
        meta.memo = None;
    }

    /// The memoized result for `id`, if it was produced in this pass.
    pub(crate) fn memo(&self, id: NodeId) -> Option<NodeId> {
        let meta = &self.meta[id.index()];
        if meta.walk == self.walk.current() {
            meta.memo
        } else {
            None
        }
    }

    pub(crate) fn set_memo(&mut self, id: NodeId, result: NodeId) {
        self.meta[id.index()].memo = Some(result);
    }

    /// Run one step of a nullability-family pass on `id`.
    ///
    /// The first visit in a pass records `seed` before calling `decide`, then
    /// overwrites it with the computed answer. A revisit in the same pass,
    /// including one reached through a cycle while `decide` is still
    /// running, returns whatever is recorded at that moment.
    pub(crate) fn assume<F>(&mut self, id: NodeId, seed: bool, decide: F) -> bool
    where
        F: FnOnce(&mut Self) -> bool,
    {
        let stamp = self.walk_nullable.current();
        let meta = &mut self.meta[id.index()];
        if meta.walk_nullable == stamp {
            return meta.flag;
        }
        meta.walk_nullable = stamp;
        meta.flag = seed;

        let answer = decide(self);
        self.meta[id.index()].flag = answer;
        answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_is_monotonic() {
        let mut epoch = Epoch::default();
        assert_eq!(epoch.current(), 0);
        assert_eq!(epoch.advance(), 1);
        assert_eq!(epoch.advance(), 2);
        assert_eq!(epoch.current(), 2);
    }

    #[test]
    fn test_memo_expires_with_the_pass() {
        let mut g: Grammar<char> = Grammar::new();
        let t = g.term('x');
        let u = g.term('y');

        g.walk.advance();
        assert!(!g.visited(t));
        g.visit(t);
        g.set_memo(t, u);
        assert!(g.visited(t));
        assert_eq!(g.memo(t), Some(u));

        g.walk.advance();
        assert!(!g.visited(t));
        assert_eq!(g.memo(t), None);
    }

    #[test]
    fn test_assume_returns_recorded_value_on_revisit() {
        let mut g: Grammar<char> = Grammar::new();
        let t = g.term('x');

        g.walk_nullable.advance();
        let answer = g.assume(t, true, |g| {
            // revisiting while the first visit is still deciding sees the seed
            let inner = g.assume(t, false, |_| unreachable!());
            assert!(inner);
            false
        });
        assert!(!answer);

        // same pass, after the first visit finished
        assert!(!g.assume(t, true, |_| unreachable!()));

        // a new pass starts over
        g.walk_nullable.advance();
        assert!(g.assume(t, false, |_| true));
    }

    #[test]
    fn test_families_use_independent_stamps() {
        let mut g: Grammar<char> = Grammar::new();
        let t = g.term('x');

        g.walk.advance();
        g.visit(t);
        g.walk_nullable.advance();
        g.assume(t, true, |_| true);

        // another nullability pass leaves the derivative stamp alone
        g.walk_nullable.advance();
        assert!(g.visited(t));
    }
}
