//! Graphviz export
//!
//! Writes the part of a grammar reachable from one node as a DOT digraph,
//! which is the easiest way to look at what a derivative step produced.

use crate::grammar::{Grammar, Node, NodeId};
use std::collections::HashMap;
use std::fmt;
use std::io;

/// Write the graph reachable from `root` to `w` in DOT syntax.
///
/// Nodes are named `g1`, `g2`, ... in depth-first order from `root`.
pub fn write_dot<T, W>(grammar: &Grammar<T>, root: NodeId, w: &mut W) -> io::Result<()>
where
    T: fmt::Debug,
    W: io::Write,
{
    let order = grammar.reachable(root);
    let names: HashMap<NodeId, String> = order
        .iter()
        .enumerate()
        .map(|(i, &id)| (id, format!("g{}", i + 1)))
        .collect();
    let name = |id: NodeId| names.get(&id).map_or("?", String::as_str);

    writeln!(w, "digraph {{")?;
    writeln!(w, "\tcenter=true;")?;
    writeln!(w, "\troot [shape=doublecircle];")?;
    writeln!(w, "\troot -> g1;")?;

    for &id in &order {
        let this = name(id);
        match grammar.node(id) {
            Node::Null => writeln!(w, "\t{} [label=null];", this)?,
            Node::Empty => writeln!(w, "\t{} [label=empty];", this)?,
            Node::Term(token) => writeln!(
                w,
                "\t{} [shape=record,label=\"term|{}\"];",
                this,
                escape_record(&format!("{:?}", token))
            )?,
            Node::Alt(a, b) => {
                writeln!(w, "\t{} -> {} [label=a];", this, name(*a))?;
                writeln!(w, "\t{} -> {} [label=b];", this, name(*b))?;
                writeln!(w, "\t{} [label=alt];", this)?;
            }
            Node::Cat(a, b) => {
                writeln!(w, "\t{}:L -> {};", this, name(*a))?;
                writeln!(w, "\t{}:R -> {};", this, name(*b))?;
                writeln!(w, "\t{} [shape=record,label=\"{{cat|{{<L>L|<R>R}}}}\"];", this)?;
            }
        }
    }

    writeln!(w, "}}")
}

/// [`write_dot`] into a string
pub fn to_dot<T: fmt::Debug>(grammar: &Grammar<T>, root: NodeId) -> String {
    let mut buf = Vec::new();
    // writing to a Vec can't fail
    let _ = write_dot(grammar, root, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Escape characters that are special inside a quoted record label
fn escape_record(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '"' | '\\' | '{' | '}' | '|' | '<' | '>') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
