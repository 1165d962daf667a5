//! Lowering the rule notation to a grammar graph
//!
//! Every rule becomes one node of a [`Grammar<char>`]. Rule nodes are
//! declared up front so bodies can refer to any rule, including themselves
//! and rules defined further down. Repetitions turn into self-referential
//! nodes built with [`Grammar::recursive`].

use crate::ast::{Alternatives, BaseFactor, Factor, GrammarAst, Repetition, Sequence};
use crate::charclass::parse_class;
use crate::error::{GrammarError, Result};
use crate::grammar::{Grammar, Node, NodeId};
use crate::grammar_parser::parse_grammar;
use crate::matcher::{Match, MatchConfig};
use log::debug;
use std::collections::HashMap;

/// Sums of ones, `S = "1" | S "+" S`, the stock example grammar
pub const SUMS: &str = r#"S: "1" | S, "+", S."#;

/// Largest character class that will be expanded into terminals
///
/// Derivation, compaction and the nullability passes recurse on the native
/// stack, one frame per node along a path. Literals, sequences, alternatives
/// and classes are therefore lowered as balanced trees, so a body of `n`
/// pieces nests only `log2(n)` deep. Hand-built `Cat` chains many thousands
/// of nodes deep can still exhaust the stack.
pub const MAX_CLASS_SIZE: usize = 2048;

/// A grammar read from the rule notation, with its rule-name table.
#[derive(Debug, Clone)]
pub struct Rules {
    grammar: Grammar<char>,
    /// Rule names and nodes in definition order
    names: Vec<(String, NodeId)>,
    index: HashMap<String, NodeId>,
}

impl Rules {
    /// Parse and lower grammar text.
    ///
    /// ```
    /// use derp::Rules;
    ///
    /// let mut rules = Rules::parse(r#"list: "a"**",". "#).unwrap();
    /// assert!(rules.matches("a,a,a"));
    /// assert!(!rules.matches("a,,a"));
    /// ```
    pub fn parse(src: &str) -> Result<Self> {
        let ast = parse_grammar(src)?;
        Self::from_ast(&ast)
    }

    pub fn from_ast(ast: &GrammarAst) -> Result<Self> {
        if ast.rules.is_empty() {
            return Err(GrammarError::NoRules);
        }

        let mut grammar = Grammar::new();
        let mut names = Vec::with_capacity(ast.rules.len());
        let mut index = HashMap::with_capacity(ast.rules.len());

        for rule in &ast.rules {
            if index.contains_key(&rule.name) {
                return Err(GrammarError::DuplicateRule(rule.name.clone()));
            }
            let id = grammar.declare();
            index.insert(rule.name.clone(), id);
            names.push((rule.name.clone(), id));
        }

        for (rule, &(_, id)) in ast.rules.iter().zip(&names) {
            let mut lowering = Lowering {
                grammar: &mut grammar,
                index: &index,
                rule: &rule.name,
            };
            let body = lowering.alternatives(&rule.alternatives)?;

            // a rule that is just another rule can't borrow its contents,
            // they may not be defined yet
            let node = if index.values().any(|&r| r == body) {
                Node::Alt(body, grammar.null())
            } else {
                grammar.node(body).clone()
            };
            grammar.define(id, node)?;
        }

        debug!(
            "lowered {} rules into {} nodes",
            names.len(),
            grammar.node_count()
        );

        Ok(Rules {
            grammar,
            names,
            index,
        })
    }

    /// Node of the first rule
    pub fn start(&self) -> NodeId {
        self.names[0].1
    }

    pub fn rule(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    /// Rule names in definition order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|(name, _)| name.as_str())
    }

    pub fn grammar(&self) -> &Grammar<char> {
        &self.grammar
    }

    pub fn grammar_mut(&mut self) -> &mut Grammar<char> {
        &mut self.grammar
    }

    /// Whether the start rule accepts `input`
    pub fn matches(&mut self, input: &str) -> bool {
        let start = self.start();
        self.grammar.match_str(start, input).accepted
    }

    /// Run the match driver from the rule called `name`.
    pub fn match_rule(&mut self, name: &str, input: &str) -> Result<Match> {
        self.match_rule_with(&MatchConfig::default(), name, input)
    }

    pub fn match_rule_with(&mut self, config: &MatchConfig, name: &str, input: &str) -> Result<Match> {
        let start = self
            .rule(name)
            .ok_or_else(|| GrammarError::UnknownStart(name.to_string()))?;
        Ok(self.grammar.match_str_with(config, start, input))
    }
}

/// Lowers the body of one rule
struct Lowering<'a> {
    grammar: &'a mut Grammar<char>,
    index: &'a HashMap<String, NodeId>,
    rule: &'a str,
}

impl Lowering<'_> {
    fn alternatives(&mut self, alts: &Alternatives) -> Result<NodeId> {
        let lowered = alts
            .alts
            .iter()
            .map(|seq| self.sequence(seq))
            .collect::<Result<Vec<_>>>()?;
        let null = self.grammar.null();
        Ok(fold_balanced(self.grammar, &lowered, null, Grammar::alt))
    }

    fn sequence(&mut self, seq: &Sequence) -> Result<NodeId> {
        let lowered = seq
            .factors
            .iter()
            .map(|factor| self.factor(factor))
            .collect::<Result<Vec<_>>>()?;
        let empty = self.grammar.empty();
        Ok(fold_balanced(self.grammar, &lowered, empty, Grammar::cat))
    }

    fn factor(&mut self, factor: &Factor) -> Result<NodeId> {
        let f = self.base(&factor.base)?;
        let empty = self.grammar.empty();

        let node = match &factor.repetition {
            Repetition::None => f,
            Repetition::ZeroOrMore => star(self.grammar, f),
            Repetition::OneOrMore => {
                let rest = star(self.grammar, f);
                self.grammar.cat(f, rest)
            }
            Repetition::Optional => self.grammar.alt(f, empty),
            Repetition::SeparatedOneOrMore(sep) => {
                let sep = self.sequence(sep)?;
                separated_plus(self.grammar, f, sep)
            }
            Repetition::SeparatedZeroOrMore(sep) => {
                let sep = self.sequence(sep)?;
                let plus = separated_plus(self.grammar, f, sep);
                self.grammar.alt(empty, plus)
            }
        };
        Ok(node)
    }

    fn base(&mut self, base: &BaseFactor) -> Result<NodeId> {
        match base {
            BaseFactor::Literal(text) => Ok(self.literal(text)),
            // nothing is consumed, and there is no output to insert into
            BaseFactor::Insertion(_) => Ok(self.grammar.empty()),
            BaseFactor::Nonterminal(name) => {
                self.index
                    .get(name)
                    .copied()
                    .ok_or_else(|| GrammarError::UndefinedRule {
                        name: name.clone(),
                        from: self.rule.to_string(),
                    })
            }
            BaseFactor::CharClass { content, negated } => self.class(content, *negated),
            BaseFactor::Group(alts) => self.alternatives(alts),
        }
    }

    fn literal(&mut self, text: &str) -> NodeId {
        let terms: Vec<_> = text.chars().map(|ch| self.grammar.term(ch)).collect();
        let empty = self.grammar.empty();
        fold_balanced(self.grammar, &terms, empty, Grammar::cat)
    }

    fn class(&mut self, content: &str, negated: bool) -> Result<NodeId> {
        if negated {
            return Err(GrammarError::UnsupportedClass {
                class: content.to_string(),
                reason: "negated classes are not supported".to_string(),
            });
        }

        let set = parse_class(content)?;
        let size = set.len();
        if size > MAX_CLASS_SIZE {
            return Err(GrammarError::ClassTooLarge {
                class: content.to_string(),
                size,
                limit: MAX_CLASS_SIZE,
            });
        }

        let terms: Vec<_> = set.chars().map(|ch| self.grammar.term(ch)).collect();
        let null = self.grammar.null();
        Ok(fold_balanced(self.grammar, &terms, null, Grammar::alt))
    }
}

/// `R = ε | f R`
fn star(g: &mut Grammar<char>, f: NodeId) -> NodeId {
    g.recursive(|g, r| {
        let more = g.cat(f, r);
        Node::Alt(g.empty(), more)
    })
}

/// `f (sep f)*`
fn separated_plus(g: &mut Grammar<char>, f: NodeId, sep: NodeId) -> NodeId {
    let tail = g.recursive(|g, t| {
        let next = g.cat(f, t);
        let more = g.cat(sep, next);
        Node::Alt(g.empty(), more)
    });
    g.cat(f, tail)
}

/// Joins `nodes` pairwise into a balanced tree, or returns `unit` when there
/// are none. `Alt` and `Cat` are associative, so the language is that of the
/// flat fold while the depth stays logarithmic.
fn fold_balanced(
    g: &mut Grammar<char>,
    nodes: &[NodeId],
    unit: NodeId,
    join: fn(&mut Grammar<char>, NodeId, NodeId) -> NodeId,
) -> NodeId {
    match nodes {
        [] => unit,
        [node] => *node,
        _ => {
            let (left, right) = nodes.split_at(nodes.len() / 2);
            let a = fold_balanced(g, left, unit, join);
            let b = fold_balanced(g, right, unit, join);
            join(g, a, b)
        }
    }
}
