//! Tokenizer for the action language.
//!
//! Rules are tried in declaration order and the first one matching a
//! non-empty prefix wins, so the keywords shadow identifiers of the same
//! spelling and `m"..."` is claimed before the bare `m` identifier.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

/// Kinds of token produced by [`tokenize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Set,
    Add,
    Sub,
    Mul,
    Div,
    MdString,
    String,
    Integer,
    Identifier,
    OParen,
    CParen,
    Comma,
    Whitespace,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Set => "set",
            TokenKind::Add => "add",
            TokenKind::Sub => "sub",
            TokenKind::Mul => "mul",
            TokenKind::Div => "div",
            TokenKind::MdString => "md_string",
            TokenKind::String => "string",
            TokenKind::Integer => "integer",
            TokenKind::Identifier => "identifier",
            TokenKind::OParen => "oparen",
            TokenKind::CParen => "cparen",
            TokenKind::Comma => "comma",
            TokenKind::Whitespace => "whitespace",
        }
    }

    /// True for the five function keywords that can start an action.
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Set | TokenKind::Add | TokenKind::Sub | TokenKind::Mul | TokenKind::Div
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single lexeme tagged with its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_TOKEN (`{}`)", self.kind.as_str().to_uppercase(), self.lexeme)
    }
}

/// No rule matched at `offset`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Undefined token `{}` in `{remaining}`, in action `{action}`", first_char(.remaining))]
pub struct LexError {
    /// Unconsumed input starting at the offending character.
    pub remaining: String,
    /// Byte offset of `remaining` inside `action`.
    pub offset: usize,
    pub action: String,
}

fn first_char(s: &str) -> char {
    s.chars().next().unwrap_or(' ')
}

lazy_static! {
    static ref RULES: Vec<(TokenKind, Regex)> = build_rules();
}

fn build_rules() -> Vec<(TokenKind, Regex)> {
    [
        (TokenKind::Set, r"^set\b"),
        (TokenKind::Add, r"^add\b"),
        (TokenKind::Sub, r"^sub\b"),
        (TokenKind::Mul, r"^mul\b"),
        (TokenKind::Div, r"^div\b"),
        (TokenKind::MdString, r#"^m"(?:[^"\\]|\\")*""#),
        (TokenKind::String, r#"^"(?:[^"\\]|\\")*""#),
        (TokenKind::Integer, r"^[+-]?[0-9]+\b"),
        (TokenKind::Identifier, r"^[A-Za-z][A-Za-z0-9_]*\b"),
        (TokenKind::OParen, r"^\("),
        (TokenKind::CParen, r"^\)"),
        (TokenKind::Comma, r"^,"),
        (TokenKind::Whitespace, r"^[ \t\r]+"),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).expect("token pattern must compile")))
    .collect()
}

/// Split `input` into tokens, whitespace included.
///
/// # Errors
/// Returns [`LexError`] at the first position where no rule matches.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut offset = 0usize;

    while offset < input.len() {
        let rest = &input[offset..];
        let (kind, len) = RULES
            .iter()
            .find_map(|(kind, re)| re.find(rest).filter(|m| !m.is_empty()).map(|m| (*kind, m.end())))
            .ok_or_else(|| LexError {
                remaining: rest.to_string(),
                offset,
                action: input.to_string(),
            })?;
        tokens.push(Token::new(kind, &rest[..len]));
        offset += len;
    }

    Ok(tokens)
}

/// Drop whitespace tokens; the parser never sees them.
pub fn significant_tokens(tokens: Vec<Token>) -> Vec<Token> {
    tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Whitespace)
        .collect()
}
