//! Error types for the outer surfaces of the crate
//!
//! The derivative engine itself never fails: every node is one of five
//! variants and every traversal is total. Errors only come from building
//! grammars: reading the rule notation, resolving rule names, expanding
//! character classes and misusing forward declarations.

use crate::grammar::NodeId;
use thiserror::Error;

/// Everything that can go wrong while constructing a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// The notation contains a character or construct the lexer can't read
    #[error("lexer error at line {line}, column {column}: {message}")]
    Lex {
        message: String,
        line: usize,
        column: usize,
    },

    /// The token stream doesn't form a rule list
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("grammar must contain at least one rule")]
    NoRules,

    #[error("rule '{0}' is defined more than once")]
    DuplicateRule(String),

    /// A rule body references a name no rule defines
    #[error("undefined rule '{name}' referenced from rule '{from}'")]
    UndefinedRule { name: String, from: String },

    #[error("no rule named '{0}'")]
    UnknownStart(String),

    #[error("unsupported character class [{class}]: {reason}")]
    UnsupportedClass { class: String, reason: String },

    /// Classes are expanded into one terminal per character
    #[error("character class [{class}] has {size} characters, the limit is {limit}")]
    ClassTooLarge {
        class: String,
        size: usize,
        limit: usize,
    },

    #[error("node {0} was never declared")]
    NotDeclared(NodeId),

    #[error("node {0} is already defined")]
    AlreadyDefined(NodeId),
}

/// Result alias used by the grammar construction APIs.
pub type Result<T, E = GrammarError> = std::result::Result<T, E>;
