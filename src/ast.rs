//! AST for the rule notation
//!
//! The parsed form of a grammar text, before rule names are resolved and the
//! rules are lowered into a node graph by [`crate::rules`].

#[derive(Debug, Clone, PartialEq)]
pub struct GrammarAst {
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub name: String,
    pub alternatives: Alternatives,
    /// Line the rule starts on, for error messages
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alternatives {
    pub alts: Vec<Sequence>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub factors: Vec<Factor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Factor {
    pub base: BaseFactor,
    pub repetition: Repetition,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BaseFactor {
    /// Quoted string or hex character; matches its characters in order
    Literal(String),
    /// `+"text"`; consumes nothing
    Insertion(String),
    Nonterminal(String),
    CharClass {
        content: String,
        negated: bool, // true if ~[...]
    },
    Group(Box<Alternatives>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Repetition {
    None,
    ZeroOrMore,                          // *
    OneOrMore,                           // +
    Optional,                            // ?
    SeparatedZeroOrMore(Box<Sequence>),  // **sep
    SeparatedOneOrMore(Box<Sequence>),   // ++sep
}

impl GrammarAst {
    pub fn new(rules: Vec<Rule>) -> Self {
        GrammarAst { rules }
    }
}

impl Rule {
    pub fn new(name: String, alternatives: Alternatives, line: usize) -> Self {
        Rule {
            name,
            alternatives,
            line,
        }
    }
}

impl Alternatives {
    pub fn new(alts: Vec<Sequence>) -> Self {
        Alternatives { alts }
    }
}

impl Sequence {
    pub fn new(factors: Vec<Factor>) -> Self {
        Sequence { factors }
    }

    pub fn empty() -> Self {
        Sequence { factors: vec![] }
    }
}

impl Factor {
    pub fn new(base: BaseFactor, repetition: Repetition) -> Self {
        Factor { base, repetition }
    }

    pub fn simple(base: BaseFactor) -> Self {
        Factor {
            base,
            repetition: Repetition::None,
        }
    }
}
