//! derp - Parsing with derivatives
//!
//! A recognizer for context-free grammars, including ambiguous and
//! left-recursive ones, built on Brzozowski derivatives generalized to
//! grammar graphs. The derivative of a grammar with respect to a token is
//! the grammar of what may follow that token; an input is in the language
//! when the grammar left after deriving by every token accepts the empty
//! string.
//!
//! # Quick Start
//!
//! ```rust
//! use derp::Rules;
//!
//! let grammar = r#"
//!     expr: term ++ ("+" | "-").
//!     term: factor ++ "*".
//!     factor: digit+; "(", expr, ")".
//!     -digit: ["0"-"9"].
//! "#;
//!
//! let mut rules = Rules::parse(grammar).expect("Invalid grammar");
//! assert!(rules.matches("2*(3+4)-1"));
//! assert!(!rules.matches("2*(3+4"));
//! ```
//!
//! Grammars can also be built node by node with [`Grammar`], over any token
//! type that implements `PartialEq`.

pub mod ast;
pub mod charclass;
mod collect;
mod compact;
mod derivative;
pub mod dot;
mod epoch;
pub mod error;
pub mod grammar;
pub mod grammar_parser;
pub mod lexer;
pub mod matcher;
mod nullability;
pub mod rules;

// WASM bindings (only when compiling for wasm32)
#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Re-export main API
pub use dot::{to_dot, write_dot};
pub use error::{GrammarError, Result};
pub use grammar::{Grammar, Node, NodeId};
pub use grammar_parser::parse_grammar;
pub use matcher::{Match, MatchConfig, DEFAULT_COLLECT_THRESHOLD};
pub use rules::{Rules, MAX_CLASS_SIZE, SUMS};

// Re-export WASM API for convenience
#[cfg(target_arch = "wasm32")]
pub use wasm::*;
