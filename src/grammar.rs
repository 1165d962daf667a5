//! Grammar node model
//!
//! A grammar is a graph of five kinds of node stored in an arena. `Alt` and
//! `Cat` refer to their children by [`NodeId`], so a child can be shared by
//! any number of parents and a node can reach itself, which is how recursive
//! productions are written down.
//!
//! Nodes are never rewritten once constructed. The derivative engine and the
//! compactor always allocate new nodes; the only per-node state they touch is
//! the traversal metadata in [`crate::epoch`].

use crate::epoch::{Epoch, Meta};
use crate::error::{GrammarError, Result};
use std::collections::HashMap;
use std::fmt;

/// Identity of a node inside its [`Grammar`].
///
/// Ids are only meaningful for the grammar that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        assert!(index <= u32::MAX as usize, "grammar arena exceeds u32::MAX nodes");
        NodeId(index as u32)
    }

    /// Position of the node in the arena
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One grammar node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<T> {
    /// The empty language: rejects everything
    Null,
    /// The language containing only the empty sequence
    Empty,
    /// Exactly one token
    Term(T),
    /// Union of two languages
    Alt(NodeId, NodeId),
    /// Concatenation of two languages
    Cat(NodeId, NodeId),
}

impl<T> Node<T> {
    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        match *self {
            Node::Alt(a, b) | Node::Cat(a, b) => Some((a, b)),
            Node::Null | Node::Empty | Node::Term(_) => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Empty => "empty",
            Node::Term(_) => "term",
            Node::Alt(..) => "alt",
            Node::Cat(..) => "cat",
        }
    }
}

const NULL: NodeId = NodeId(0);
const EMPTY: NodeId = NodeId(1);

/// Arena of grammar nodes plus the traversal state of every algorithm that
/// runs over them.
#[derive(Debug, Clone)]
pub struct Grammar<T> {
    pub(crate) nodes: Vec<Node<T>>,
    pub(crate) meta: Vec<Meta>,
    pub(crate) walk: Epoch,
    pub(crate) walk_nullable: Epoch,
    /// Forward declarations, mapped to whether they have been defined yet
    pub(crate) declared: HashMap<NodeId, bool>,
}

impl<T> Grammar<T> {
    /// Create a grammar holding only the canonical `Null` and `Empty` nodes
    pub fn new() -> Self {
        Grammar {
            nodes: vec![Node::Null, Node::Empty],
            meta: vec![Meta::default(); 2],
            walk: Epoch::default(),
            walk_nullable: Epoch::default(),
            declared: HashMap::new(),
        }
    }

    /// The canonical empty-language node
    pub fn null(&self) -> NodeId {
        NULL
    }

    /// The canonical empty-sequence node
    pub fn empty(&self) -> NodeId {
        EMPTY
    }

    pub fn term(&mut self, token: T) -> NodeId {
        self.push(Node::Term(token))
    }

    pub fn alt(&mut self, a: NodeId, b: NodeId) -> NodeId {
        debug_assert!(a.index() < self.nodes.len() && b.index() < self.nodes.len());
        self.push(Node::Alt(a, b))
    }

    pub fn cat(&mut self, a: NodeId, b: NodeId) -> NodeId {
        debug_assert!(a.index() < self.nodes.len() && b.index() < self.nodes.len());
        self.push(Node::Cat(a, b))
    }

    /// Build a node that may refer to itself.
    ///
    /// `build` receives the id the new node will have and returns its
    /// contents, so `S = "1" | S "+" S` is
    ///
    /// ```
    /// use derp::{Grammar, Node};
    ///
    /// let mut g = Grammar::new();
    /// let s = g.recursive(|g, s| {
    ///     let one = g.term('1');
    ///     let plus = g.term('+');
    ///     let tail = g.cat(plus, s);
    ///     let rec = g.cat(s, tail);
    ///     Node::Alt(one, rec)
    /// });
    /// assert!(g.match_str(s, "1+1").accepted);
    /// ```
    pub fn recursive<F>(&mut self, build: F) -> NodeId
    where
        F: FnOnce(&mut Self, NodeId) -> Node<T>,
    {
        let id = self.reserve();
        let node = build(self, id);
        self.fill(id, node);
        id
    }

    /// Allocate a node whose contents are supplied later by [`define`].
    ///
    /// Until it is defined the node denotes the empty language.
    ///
    /// [`define`]: Grammar::define
    pub fn declare(&mut self) -> NodeId {
        let id = self.reserve();
        self.declared.insert(id, false);
        id
    }

    /// Supply the contents of a node created by [`declare`].
    ///
    /// [`declare`]: Grammar::declare
    pub fn define(&mut self, id: NodeId, node: Node<T>) -> Result<()> {
        match self.declared.get_mut(&id) {
            None => Err(GrammarError::NotDeclared(id)),
            Some(true) => Err(GrammarError::AlreadyDefined(id)),
            Some(defined) => {
                *defined = true;
                self.fill(id, node);
                Ok(())
            }
        }
    }

    /// Whether `id` is a forward declaration still waiting for [`define`].
    ///
    /// [`define`]: Grammar::define
    pub fn is_pending(&self, id: NodeId) -> bool {
        self.declared.get(&id) == Some(&false)
    }

    pub fn node(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.index()]
    }

    /// Number of nodes in the arena, reachable or not
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Every node reachable from `root`, each exactly once, in depth-first
    /// pre-order with `a` children before `b` children.
    ///
    /// Keeps its own visited set and leaves the traversal metadata alone, so
    /// it is safe to call between engine passes.
    pub fn reachable(&self, root: NodeId) -> Vec<NodeId> {
        let mut seen = vec![false; self.nodes.len()];
        let mut order = Vec::new();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut seen[id.index()], true) {
                continue;
            }
            order.push(id);
            if let Some((a, b)) = self.node(id).children() {
                stack.push(b);
                stack.push(a);
            }
        }

        order
    }

    /// Allocate a node to be filled in once its children exist.
    pub(crate) fn reserve(&mut self) -> NodeId {
        self.push(Node::Null)
    }

    pub(crate) fn fill(&mut self, id: NodeId, node: Node<T>) {
        self.nodes[id.index()] = node;
    }

    fn push(&mut self, node: Node<T>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        self.meta.push(Meta::default());
        id
    }
}

impl<T> Default for Grammar<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_nodes() {
        let g: Grammar<char> = Grammar::new();
        assert_eq!(g.node(g.null()), &Node::Null);
        assert_eq!(g.node(g.empty()), &Node::Empty);
        assert_eq!(g.node_count(), 2);
    }

    #[test]
    fn test_constructors() {
        let mut g = Grammar::new();
        let a = g.term('a');
        let b = g.term('b');
        let alt = g.alt(a, b);
        let cat = g.cat(alt, b);

        assert_eq!(g.node(a), &Node::Term('a'));
        assert_eq!(g.node(alt), &Node::Alt(a, b));
        assert_eq!(g.node(cat).children(), Some((alt, b)));
        assert_eq!(g.node(cat).kind_name(), "cat");
        assert_eq!(g.node(a).children(), None);
    }

    #[test]
    fn test_recursive_node_refers_to_itself() {
        let mut g = Grammar::new();
        let s = g.recursive(|g, s| {
            let one = g.term('1');
            Node::Alt(one, s)
        });

        match g.node(s) {
            Node::Alt(_, b) => assert_eq!(*b, s),
            other => panic!("expected alt, got {:?}", other),
        }
    }

    #[test]
    fn test_declare_then_define() {
        let mut g = Grammar::new();
        let a = g.declare();
        let b = g.declare();
        assert!(g.is_pending(a));
        assert_eq!(g.node(a), &Node::Null);

        let x = g.term('x');
        let tail = g.cat(x, a);
        g.define(a, Node::Alt(b, tail)).unwrap();
        g.define(b, Node::Cat(x, a)).unwrap();

        assert!(!g.is_pending(a));
        assert_eq!(g.node(a), &Node::Alt(b, tail));
        assert_eq!(g.node(b), &Node::Cat(x, a));
    }

    #[test]
    fn test_define_errors() {
        let mut g = Grammar::new();
        let x = g.term('x');
        assert_eq!(
            g.define(x, Node::Empty),
            Err(GrammarError::NotDeclared(x))
        );

        let d = g.declare();
        g.define(d, Node::Empty).unwrap();
        assert_eq!(g.define(d, Node::Null), Err(GrammarError::AlreadyDefined(d)));
    }

    #[test]
    fn test_reachable_visits_each_node_once() {
        let mut g = Grammar::new();
        let s = g.recursive(|g, s| {
            let one = g.term('1');
            let plus = g.term('+');
            let tail = g.cat(plus, s);
            let rec = g.cat(s, tail);
            Node::Alt(one, rec)
        });
        // unreachable garbage
        g.term('z');

        let order = g.reachable(s);
        assert_eq!(order.len(), 5);
        assert_eq!(order[0], s);
        assert_eq!(g.node(order[1]), &Node::Term('1'));

        let mut sorted = order.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), order.len());
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId::new(7).to_string(), "#7");
    }

    #[test]
    fn test_node_id_covers_u32_range() {
        let last = u32::MAX as usize;
        assert_eq!(NodeId::new(last).index(), last);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    #[should_panic(expected = "grammar arena exceeds u32::MAX nodes")]
    fn test_node_id_overflow_panics() {
        NodeId::new(u32::MAX as usize + 1);
    }
}
