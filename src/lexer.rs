//! Lexer for the rule notation
//!
//! Converts grammar text into a stream of positioned tokens, skipping
//! whitespace and `{nested {comments}}`.

use crate::error::{GrammarError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Ident(String),
    String(String),
    CharClass(String), // Content between [ and ], e.g. "'a'-'z'" or "Nd"
    HexChar(String),   // Digits after #, e.g. "41"
    Colon,
    Equals,
    Period,
    Semicolon,
    Pipe,
    Comma,
    Plus,
    Star,
    DoublePlus,
    DoubleStar,
    Question,
    At,
    Minus,
    Caret,
    Tilde,
    LParen,
    RParen,
}

/// A token with the 1-based line and column it starts at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
    pub column: usize,
}

pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Spanned>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;
            if self.pos >= self.input.len() {
                break;
            }

            let (line, column) = (self.line, self.column);
            let token = self.next_token()?;
            tokens.push(Spanned {
                token,
                line,
                column,
            });
        }

        Ok(tokens)
    }

    fn error(&self, message: impl Into<String>) -> GrammarError {
        GrammarError::Lex {
            message: message.into(),
            line: self.line,
            column: self.column,
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<()> {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.advance();
            }

            if self.peek() == Some('{') {
                self.skip_comment()?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_comment(&mut self) -> Result<()> {
        let start = self.error("unclosed comment");
        self.advance(); // consume '{'
        let mut depth = 1;

        while depth > 0 {
            match self.advance() {
                Some('{') => depth += 1,
                Some('}') => depth -= 1,
                Some(_) => {}
                None => return Err(start),
            }
        }

        Ok(())
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.input.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Consume one character and return `token`
    fn single(&mut self, token: Token) -> Result<Token> {
        self.advance();
        Ok(token)
    }

    /// Consume `ch` or `chch`, picking the doubled token for the latter
    fn maybe_doubled(&mut self, ch: char, single: Token, doubled: Token) -> Result<Token> {
        self.advance();
        if self.peek() == Some(ch) {
            self.advance();
            Ok(doubled)
        } else {
            Ok(single)
        }
    }

    fn next_token(&mut self) -> Result<Token> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => self.read_quoted(quote),
            Some('#') => self.read_hex(),
            Some('[') => self.read_char_class(),
            Some(':') => self.single(Token::Colon),
            Some('=') => self.single(Token::Equals),
            Some('.') => self.single(Token::Period),
            Some(';') => self.single(Token::Semicolon),
            Some('|') => self.single(Token::Pipe),
            Some(',') => self.single(Token::Comma),
            Some('?') => self.single(Token::Question),
            Some('@') => self.single(Token::At),
            Some('-') => self.single(Token::Minus),
            Some('^') => self.single(Token::Caret),
            Some('~') => self.single(Token::Tilde),
            Some('(') => self.single(Token::LParen),
            Some(')') => self.single(Token::RParen),
            Some('+') => self.maybe_doubled('+', Token::Plus, Token::DoublePlus),
            Some('*') => self.maybe_doubled('*', Token::Star, Token::DoubleStar),
            Some(']') => Err(self.error("unexpected ']' outside character class")),
            Some(ch) if ch.is_alphabetic() || ch == '_' => Ok(self.read_ident()),
            Some(ch) => Err(self.error(format!("unexpected character '{}'", ch))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn read_quoted(&mut self, quote: char) -> Result<Token> {
        let start = self.error("unterminated string");
        self.advance(); // skip opening quote
        let mut s = String::new();

        while let Some(ch) = self.advance() {
            if ch != quote {
                s.push(ch);
            } else if self.peek() == Some(quote) {
                // doubled quote is an escaped quote
                s.push(quote);
                self.advance();
            } else {
                return Ok(Token::String(s));
            }
        }

        Err(start)
    }

    fn read_hex(&mut self) -> Result<Token> {
        self.advance(); // skip '#'
        let mut digits = String::new();
        while let Some(ch) = self.peek().filter(char::is_ascii_hexdigit) {
            digits.push(ch);
            self.advance();
        }

        if digits.is_empty() {
            return Err(self.error("expected hex digits after '#'"));
        }
        Ok(Token::HexChar(digits))
    }

    fn read_ident(&mut self) -> Token {
        let mut ident = String::new();

        while let Some(ch) = self.peek() {
            // a '-' only continues a name when more name follows it
            let continues = ch.is_alphanumeric()
                || ch == '_'
                || (ch == '-' && self.peek_next().is_some_and(char::is_alphanumeric));
            if !continues {
                break;
            }
            ident.push(ch);
            self.advance();
        }

        Token::Ident(ident)
    }

    fn read_char_class(&mut self) -> Result<Token> {
        let start = self.error("unterminated character class");
        self.advance(); // skip opening bracket
        let mut content = String::new();
        let mut quote = None;

        while let Some(ch) = self.advance() {
            match quote {
                Some(q) if ch == q => quote = None,
                Some(_) => {}
                None if ch == '"' || ch == '\'' => quote = Some(ch),
                None if ch == ']' => return Ok(Token::CharClass(content)),
                None => {}
            }
            content.push(ch);
        }

        Err(start)
    }
}

/// Tokenize grammar text
pub fn tokenize(input: &str) -> Result<Vec<Spanned>> {
    Lexer::new(input).tokenize()
}
