//! Tokenizer for C source text
//!
//! Produces a flat token stream with byte spans. Comments are dropped,
//! preprocessor lines (including `\` continuations) become a single
//! [`TokenKind::Directive`] token, and every other character sequence maps to
//! an identifier, literal or punctuator. Keywords are plain identifiers; the
//! parser decides what they mean.

use crate::error::ParseError;
use crate::tree::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Number,
    Str,
    Char,
    Punct,
    Directive,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/* Longest first so that `<<=` wins over `<<` and `<` */
const PUNCTUATORS: &[&str] = &[
    "...", "<<=", ">>=", "->", "++", "--", "<<", ">>", "<=", ">=", "==", "!=", "&&", "||", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "##",
];

const STRING_PREFIXES: &[&str] = &["L", "u", "U", "u8"];

/// Tokenize `source`. The returned stream always ends with an `Eof` token.
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<ParseError>) {
    Lexer::new(source).run()
}

struct Lexer<'s> {
    src: &'s str,
    pos: usize,
    at_line_start: bool,
    errors: Vec<ParseError>,
}

impl<'s> Lexer<'s> {
    fn new(src: &'s str) -> Self {
        Self {
            src,
            pos: 0,
            at_line_start: true,
            errors: Vec::new(),
        }
    }

    fn run(mut self) -> (Vec<Token>, Vec<ParseError>) {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let start = self.pos;
            let Some(c) = self.peek() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    span: Span::new(start, start),
                });
                break;
            };

            let kind = if c == '#' && self.at_line_start {
                self.directive()
            } else if is_ident_start(c) {
                self.ident_or_prefixed_literal()
            } else if c.is_ascii_digit()
                || (c == '.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit()))
            {
                self.number()
            } else if c == '"' {
                self.quoted('"');
                TokenKind::Str
            } else if c == '\'' {
                self.quoted('\'');
                TokenKind::Char
            } else {
                self.punct();
                TokenKind::Punct
            };
            self.at_line_start = false;

            let mut end = self.pos;
            if kind == TokenKind::Directive {
                end = start + self.src[start..end].trim_end().len();
            }
            tokens.push(Token {
                kind,
                span: Span::new(start, end),
            });
        }
        (tokens, self.errors)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some('\n') => {
                    self.bump();
                    self.at_line_start = true;
                }
                Some('\\') if self.peek_at(1) == Some('\n') => {
                    self.pos += 2;
                }
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => self.block_comment(),
                _ => break,
            }
        }
    }

    fn block_comment(&mut self) {
        let start = self.pos;
        self.pos += 2;
        match self.src[self.pos..].find("*/") {
            Some(idx) => self.pos += idx + 2,
            None => {
                self.errors
                    .push(ParseError::at(self.src, start, "unterminated block comment"));
                self.pos = self.src.len();
            }
        }
    }

    fn directive(&mut self) -> TokenKind {
        while let Some(c) = self.peek() {
            match c {
                '\\' if self.peek_at(1) == Some('\n') => self.pos += 2,
                '\\' if self.peek_at(1) == Some('\r') && self.peek_at(2) == Some('\n') => {
                    self.pos += 3
                }
                '/' if self.peek_at(1) == Some('*') => self.block_comment(),
                '/' if self.peek_at(1) == Some('/') => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                '\n' => break,
                _ => {
                    self.bump();
                }
            }
        }
        TokenKind::Directive
    }

    fn ident_or_prefixed_literal(&mut self) -> TokenKind {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_continue) {
            self.bump();
        }
        let word = &self.src[start..self.pos];
        if STRING_PREFIXES.contains(&word) {
            match self.peek() {
                Some('"') => {
                    self.quoted('"');
                    return TokenKind::Str;
                }
                Some('\'') => {
                    self.quoted('\'');
                    return TokenKind::Char;
                }
                _ => {}
            }
        }
        TokenKind::Ident
    }

    /* pp-number: digits, letters, `.`, `_`, and a sign right after an exponent marker */
    fn number(&mut self) -> TokenKind {
        let mut prev = '\0';
        while let Some(c) = self.peek() {
            let exponent_sign = (c == '+' || c == '-') && matches!(prev, 'e' | 'E' | 'p' | 'P');
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || exponent_sign {
                prev = c;
                self.bump();
            } else {
                break;
            }
        }
        TokenKind::Number
    }

    fn quoted(&mut self, quote: char) {
        let start = self.pos;
        self.bump();
        loop {
            match self.peek() {
                Some('\\') => {
                    self.bump();
                    self.bump();
                }
                Some(c) if c == quote => {
                    self.bump();
                    return;
                }
                Some('\n') | None => {
                    let what = if quote == '"' { "string" } else { "character" };
                    self.errors.push(ParseError::at(
                        self.src,
                        start,
                        format!("unterminated {} literal", what),
                    ));
                    return;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn punct(&mut self) {
        let rest = &self.src[self.pos..];
        if let Some(p) = PUNCTUATORS.iter().find(|p| rest.starts_with(**p)) {
            self.pos += p.len();
        } else {
            self.bump();
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}
