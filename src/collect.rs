//! Reclaiming orphaned nodes
//!
//! Every derivative step leaves most of the previous grammar unreachable.
//! The arena is split at a watermark: nodes below it (typically everything
//! the caller built before matching started) are kept unconditionally, and
//! nodes above it are kept only if they are reachable from the given roots.
//! Survivors slide down to close the gaps and their references are patched.
//!
//! This is sound because nodes below the watermark never point above it:
//! the engine only allocates, it never rewrites an existing node.

use crate::epoch::Meta;
use crate::grammar::{Grammar, Node, NodeId};
use log::debug;

impl<T> Grammar<T> {
    /// Drop every node at or above `watermark` that no root reaches, and
    /// update `roots` to the survivors' new ids. Returns how many nodes were
    /// reclaimed.
    ///
    /// Ids below the watermark stay valid; ids above it that were not passed
    /// in `roots` must be considered stale afterwards.
    pub fn collect_garbage(&mut self, watermark: usize, roots: &mut [NodeId]) -> usize {
        // the canonical nodes always stay
        let watermark = watermark.clamp(2, self.nodes.len());
        let young = self.nodes.len() - watermark;
        if young == 0 {
            return 0;
        }

        let mut live = vec![false; young];
        let mut stack: Vec<NodeId> = roots.to_vec();
        while let Some(id) = stack.pop() {
            let Some(slot) = id.index().checked_sub(watermark) else {
                continue;
            };
            if std::mem::replace(&mut live[slot], true) {
                continue;
            }
            if let Some((a, b)) = self.nodes[id.index()].children() {
                stack.push(a);
                stack.push(b);
            }
        }

        // new position of every young node, valid for the live ones
        let mut forward = Vec::with_capacity(young);
        let mut next = watermark;
        for &is_live in &live {
            forward.push(NodeId::new(next));
            if is_live {
                next += 1;
            }
        }
        let relocate = |id: NodeId| match id.index().checked_sub(watermark) {
            Some(slot) => forward[slot],
            None => id,
        };

        let mut write = watermark;
        for read in watermark..self.nodes.len() {
            if !live[read - watermark] {
                continue;
            }
            let node = match std::mem::replace(&mut self.nodes[read], Node::Null) {
                Node::Alt(a, b) => Node::Alt(relocate(a), relocate(b)),
                Node::Cat(a, b) => Node::Cat(relocate(a), relocate(b)),
                leaf => leaf,
            };
            self.nodes[write] = node;
            self.meta[write] = Meta::default();
            write += 1;
        }
        self.nodes.truncate(write);
        self.meta.truncate(write);

        for root in roots.iter_mut() {
            *root = relocate(*root);
        }
        self.declared = std::mem::take(&mut self.declared)
            .into_iter()
            .filter_map(|(id, defined)| match id.index().checked_sub(watermark) {
                Some(slot) if !live[slot] => None,
                _ => Some((relocate(id), defined)),
            })
            .collect();

        let reclaimed = young - (write - watermark);
        debug!(
            "collected {} of {} young nodes, {} remain",
            reclaimed,
            young,
            self.nodes.len()
        );
        reclaimed
    }
}
