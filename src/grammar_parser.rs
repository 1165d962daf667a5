//! Handwritten recursive descent parser for the rule notation
//!
//! ```text
//! grammar      := rule+
//! rule         := mark? name (":" | "=") alternatives "."
//! alternatives := sequence (("|" | ";") sequence)*
//! sequence     := factor ("," factor)* | factor* | ε
//! factor       := base ("*" | "+" | "?" | "**" sep | "++" sep)?
//! base         := mark? (name | string | hex | class) | "+" (string | hex)
//!               | "~" class | "(" alternatives ")"
//! ```
//!
//! Marks (`@`, `-`, `^`) only shape output trees, which a recognizer does
//! not build; they are accepted and dropped here.

use crate::ast::{Alternatives, BaseFactor, Factor, GrammarAst, Repetition, Rule, Sequence};
use crate::error::{GrammarError, Result};
use crate::lexer::{tokenize, Spanned, Token};

pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Spanned>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.token.clone();
        self.pos += 1;
        Some(token)
    }

    fn matches(&self, expected: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(expected))
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Syntax error positioned at the current token, or just past the last
    /// one at end of input
    fn error(&self, message: impl Into<String>) -> GrammarError {
        let (line, column) = match self.tokens.get(self.pos).or(self.tokens.last()) {
            Some(s) => (s.line, s.column),
            None => (1, 1),
        };
        GrammarError::Syntax {
            message: message.into(),
            line,
            column,
        }
    }

    fn expect(&mut self, expected: Token, description: &str) -> Result<()> {
        if self.matches(&expected) {
            self.consume();
            Ok(())
        } else {
            Err(self.error(format!("expected {}, found {}", description, self.describe_current())))
        }
    }

    fn describe_current(&self) -> String {
        match self.peek() {
            Some(token) => format!("{:?}", token),
            None => "end of input".to_string(),
        }
    }

    fn hex_to_char(&self, hex: &str) -> Result<char> {
        u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error(format!("invalid Unicode code point #{}", hex)))
    }

    fn skip_mark(&mut self) {
        if self.matches(&Token::At) || self.matches(&Token::Minus) || self.matches(&Token::Caret) {
            self.consume();
        }
    }

    // grammar := rule+
    pub fn parse_grammar(&mut self) -> Result<GrammarAst> {
        let mut rules = Vec::new();

        while !self.at_end() {
            rules.push(self.parse_rule()?);
        }

        if rules.is_empty() {
            return Err(GrammarError::NoRules);
        }

        Ok(GrammarAst::new(rules))
    }

    // rule := mark? name (":" | "=") alternatives "."
    fn parse_rule(&mut self) -> Result<Rule> {
        self.skip_mark();

        let line = self.tokens.get(self.pos).map_or(1, |s| s.line);
        let name = match self.peek() {
            Some(Token::Ident(name)) => name.clone(),
            _ => return Err(self.error(format!("expected rule name, found {}", self.describe_current()))),
        };
        self.consume();

        if self.matches(&Token::Colon) || self.matches(&Token::Equals) {
            self.consume();
        } else {
            return Err(self.error(format!("expected ':' after rule name '{}'", name)));
        }

        let alternatives = self.parse_alternatives()?;

        if !self.matches(&Token::Period) {
            return Err(self.error(format!(
                "expected '.' at end of rule '{}', found {}",
                name,
                self.describe_current()
            )));
        }
        self.consume();

        Ok(Rule::new(name, alternatives, line))
    }

    // alternatives := sequence (("|" | ";") sequence)*
    fn parse_alternatives(&mut self) -> Result<Alternatives> {
        let mut alts = vec![self.parse_sequence()?];

        while self.matches(&Token::Pipe) || self.matches(&Token::Semicolon) {
            self.consume();
            alts.push(self.parse_sequence()?);
        }

        Ok(Alternatives::new(alts))
    }

    fn at_sequence_end(&self) -> bool {
        self.at_end()
            || self.matches(&Token::Period)
            || self.matches(&Token::Pipe)
            || self.matches(&Token::Semicolon)
            || self.matches(&Token::RParen)
    }

    // sequence := factor ("," factor)* | factor* | ε
    fn parse_sequence(&mut self) -> Result<Sequence> {
        if self.at_sequence_end() {
            return Ok(Sequence::empty());
        }

        let mut factors = vec![self.parse_factor()?];

        if self.matches(&Token::Comma) {
            while self.matches(&Token::Comma) {
                self.consume();
                factors.push(self.parse_factor()?);
            }
        } else {
            while !self.at_sequence_end() {
                factors.push(self.parse_factor()?);
            }
        }

        Ok(Sequence::new(factors))
    }

    // separator after ** or ++: a single base factor, which may be a group
    fn parse_separator(&mut self) -> Result<Box<Sequence>> {
        let base = match self.parse_base_factor()? {
            // a group of one sequence is just that sequence
            BaseFactor::Group(mut alts) if alts.alts.len() == 1 => {
                return Ok(Box::new(alts.alts.remove(0)));
            }
            base => base,
        };
        Ok(Box::new(Sequence::new(vec![Factor::simple(base)])))
    }

    // factor := base ("*" | "+" | "?" | "**" sep | "++" sep)?
    fn parse_factor(&mut self) -> Result<Factor> {
        let base = self.parse_base_factor()?;

        let repetition = match self.peek() {
            Some(Token::Star) => {
                self.consume();
                Repetition::ZeroOrMore
            }
            Some(Token::Plus) => {
                self.consume();
                Repetition::OneOrMore
            }
            Some(Token::Question) => {
                self.consume();
                Repetition::Optional
            }
            Some(Token::DoubleStar) => {
                self.consume();
                Repetition::SeparatedZeroOrMore(self.parse_separator()?)
            }
            Some(Token::DoublePlus) => {
                self.consume();
                Repetition::SeparatedOneOrMore(self.parse_separator()?)
            }
            _ => Repetition::None,
        };

        Ok(Factor::new(base, repetition))
    }

    fn parse_base_factor(&mut self) -> Result<BaseFactor> {
        if self.matches(&Token::Plus) {
            // insertion: +string or +#hex
            self.consume();
            return match self.consume() {
                Some(Token::String(s)) => Ok(BaseFactor::Insertion(s)),
                Some(Token::HexChar(h)) => Ok(BaseFactor::Insertion(self.hex_to_char(&h)?.to_string())),
                _ => Err(self.error("expected string after '+'")),
            };
        }

        self.skip_mark();

        match self.peek().cloned() {
            Some(Token::Ident(name)) => {
                self.consume();
                Ok(BaseFactor::Nonterminal(name))
            }
            Some(Token::String(s)) => {
                self.consume();
                Ok(BaseFactor::Literal(s))
            }
            Some(Token::HexChar(h)) => {
                let ch = self.hex_to_char(&h)?;
                self.consume();
                Ok(BaseFactor::Literal(ch.to_string()))
            }
            Some(Token::CharClass(content)) => {
                self.consume();
                Ok(BaseFactor::CharClass {
                    content,
                    negated: false,
                })
            }
            Some(Token::Tilde) => {
                self.consume();
                match self.peek().cloned() {
                    Some(Token::CharClass(content)) => {
                        self.consume();
                        Ok(BaseFactor::CharClass {
                            content,
                            negated: true,
                        })
                    }
                    _ => Err(self.error("expected character class after '~'")),
                }
            }
            Some(Token::LParen) => {
                self.consume();
                let alts = self.parse_alternatives()?;
                self.expect(Token::RParen, "')' after grouped alternatives")?;
                Ok(BaseFactor::Group(Box::new(alts)))
            }
            _ => Err(self.error(format!("expected factor, found {}", self.describe_current()))),
        }
    }
}

/// Parse grammar text into its AST
pub fn parse_grammar(input: &str) -> Result<GrammarAst> {
    let tokens = tokenize(input)?;
    Parser::new(tokens).parse_grammar()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_factor(ast: &GrammarAst) -> &Factor {
        &ast.rules[0].alternatives.alts[0].factors[0]
    }

    #[test]
    fn test_rule_with_literal() {
        let ast = parse_grammar(r#"rule: "hello"."#).unwrap();
        assert_eq!(ast.rules.len(), 1);
        assert_eq!(ast.rules[0].name, "rule");
        assert_eq!(first_factor(&ast).base, BaseFactor::Literal("hello".to_string()));
    }

    #[test]
    fn test_alternatives_with_either_separator() {
        let ast = parse_grammar(r#"a: "x" | "y"; "z"."#).unwrap();
        assert_eq!(ast.rules[0].alternatives.alts.len(), 3);
    }

    #[test]
    fn test_sequences_with_and_without_commas() {
        let ast = parse_grammar(r#"a: "x", b, "y". b = "p" "q" "r"."#).unwrap();
        assert_eq!(ast.rules[0].alternatives.alts[0].factors.len(), 3);
        assert_eq!(ast.rules[1].alternatives.alts[0].factors.len(), 3);
        assert_eq!(ast.rules[1].name, "b");
    }

    #[test]
    fn test_empty_alternative() {
        let ast = parse_grammar(r#"a: ; "x". b: ."#).unwrap();
        assert_eq!(ast.rules[0].alternatives.alts[0], Sequence::empty());
        assert_eq!(ast.rules[1].alternatives.alts, vec![Sequence::empty()]);
    }

    #[test]
    fn test_repetitions() {
        let ast = parse_grammar(r#"a: x*, y+, z?, w**",", v++(",", " ")."#).unwrap();
        let reps: Vec<_> = ast.rules[0].alternatives.alts[0]
            .factors
            .iter()
            .map(|f| f.repetition.clone())
            .collect();

        assert_eq!(reps[0], Repetition::ZeroOrMore);
        assert_eq!(reps[1], Repetition::OneOrMore);
        assert_eq!(reps[2], Repetition::Optional);
        assert!(matches!(&reps[3], Repetition::SeparatedZeroOrMore(sep) if sep.factors.len() == 1));
        assert!(matches!(&reps[4], Repetition::SeparatedOneOrMore(sep) if sep.factors.len() == 2));
    }

    #[test]
    fn test_separator_with_alternatives() {
        let ast = parse_grammar(r#"e: t ++ ("+" | "-")."#).unwrap();
        match &first_factor(&ast).repetition {
            Repetition::SeparatedOneOrMore(sep) => {
                assert_eq!(sep.factors.len(), 1);
                assert!(matches!(&sep.factors[0].base, BaseFactor::Group(alts) if alts.alts.len() == 2));
            }
            other => panic!("expected ++, got {:?}", other),
        }
    }

    #[test]
    fn test_marks_are_dropped() {
        let ast = parse_grammar(r#"-a: @id, -sep, ^body, +"ins"."#).unwrap();
        let factors = &ast.rules[0].alternatives.alts[0].factors;
        assert_eq!(ast.rules[0].name, "a");
        assert_eq!(factors[0].base, BaseFactor::Nonterminal("id".to_string()));
        assert_eq!(factors[3].base, BaseFactor::Insertion("ins".to_string()));
    }

    #[test]
    fn test_grouping_and_classes() {
        let ast = parse_grammar(r#"a: ("x" | "y")+, ~["0"-"9"], #41."#).unwrap();
        let factors = &ast.rules[0].alternatives.alts[0].factors;

        assert_eq!(factors[0].repetition, Repetition::OneOrMore);
        assert!(matches!(&factors[0].base, BaseFactor::Group(alts) if alts.alts.len() == 2));
        assert!(matches!(&factors[1].base, BaseFactor::CharClass { negated: true, .. }));
        assert_eq!(factors[2].base, BaseFactor::Literal("A".to_string()));
    }

    #[test]
    fn test_rule_lines() {
        let ast = parse_grammar("a: b.\n\nb: \"x\".").unwrap();
        assert_eq!(ast.rules[0].line, 1);
        assert_eq!(ast.rules[1].line, 3);
    }

    #[test]
    fn test_missing_period() {
        let err = parse_grammar(r#"a: "x""#).unwrap_err();
        match err {
            GrammarError::Syntax { message, line, column } => {
                assert!(message.contains("expected '.'"), "{}", message);
                assert_eq!((line, column), (1, 4));
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_rule_runs_into_next_rule() {
        assert!(matches!(
            parse_grammar(r#"a: "x" b: "y"."#),
            Err(GrammarError::Syntax { line: 1, column: 9, .. })
        ));
    }

    #[test]
    fn test_empty_grammar() {
        assert_eq!(parse_grammar("  {just a comment}  "), Err(GrammarError::NoRules));
    }

    #[test]
    fn test_unclosed_group() {
        assert!(matches!(
            parse_grammar(r#"a: ("x" | "y"."#),
            Err(GrammarError::Syntax { .. })
        ));
    }
}
