//! The action language.
//!
//! Actions are single calls such as `set(description, m"_Dusty_", "old door")`
//! or `sub(1, amount, coin)` embedded in item metadata. Each one is lexed,
//! parsed into an [`ActionAst`] and rendered as a statement that mutates a
//! room or item through the runtime's `getRoomOrItem` accessor.

use std::fmt;
use std::num::NonZeroI64;

mod compiler;
mod lexer;
mod parser;

pub use compiler::{ActionCompiler, UnbalancedQuoteError, compile_action, render_action, unquote};
pub use lexer::{LexError, Token, TokenKind, significant_tokens, tokenize};

/// Parsed form of one action call.
///
/// `key` and `element` keep their surrounding quotes when they were written
/// as string literals; they are unquoted only when rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionAst {
    /// `set(key, value, element)`
    Set { key: String, value: ActionValue, element: String },
    /// `add(value, key, element)`
    Add { key: String, value: ActionValue, element: String },
    /// `sub(value, key, element)`
    Sub { key: String, value: i64, element: String },
    /// `mul(value, key, element)`
    Mul { key: String, value: i64, element: String },
    /// `div(value, key, element)`
    Div { key: String, value: NonZeroI64, element: String },
}

impl ActionAst {
    pub fn name(&self) -> &'static str {
        match self {
            ActionAst::Set { .. } => "set",
            ActionAst::Add { .. } => "add",
            ActionAst::Sub { .. } => "sub",
            ActionAst::Mul { .. } => "mul",
            ActionAst::Div { .. } => "div",
        }
    }

    /// Assignment operator emitted for this action.
    pub fn operator(&self) -> &'static str {
        match self {
            ActionAst::Set { .. } => "=",
            ActionAst::Add { .. } => "+=",
            ActionAst::Sub { .. } => "-=",
            ActionAst::Mul { .. } => "*=",
            ActionAst::Div { .. } => "/=",
        }
    }

    pub fn key(&self) -> &str {
        match self {
            ActionAst::Set { key, .. }
            | ActionAst::Add { key, .. }
            | ActionAst::Sub { key, .. }
            | ActionAst::Mul { key, .. }
            | ActionAst::Div { key, .. } => key,
        }
    }

    pub fn element(&self) -> &str {
        match self {
            ActionAst::Set { element, .. }
            | ActionAst::Add { element, .. }
            | ActionAst::Sub { element, .. }
            | ActionAst::Mul { element, .. }
            | ActionAst::Div { element, .. } => element,
        }
    }

    pub fn value(&self) -> ActionValue {
        match self {
            ActionAst::Set { value, .. } | ActionAst::Add { value, .. } => value.clone(),
            ActionAst::Sub { value, .. } | ActionAst::Mul { value, .. } => ActionValue::Integer(*value),
            ActionAst::Div { value, .. } => ActionValue::Integer(value.get()),
        }
    }
}

impl fmt::Display for ActionAst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_NODE({}, {}, {})",
            self.name().to_uppercase(),
            self.key(),
            self.value(),
            self.element()
        )
    }
}

/// Right-hand side of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionValue {
    Integer(i64),
    /// A string literal, quotes included, ready to embed verbatim.
    Text(String),
}

impl fmt::Display for ActionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionValue::Integer(n) => write!(f, "{n}"),
            ActionValue::Text(s) => f.write_str(s),
        }
    }
}

/// Grammar errors raised while parsing a token stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Undefined structure starting with `{token}` for action `{action}`")]
    UndefinedStructure { token: String, action: String },
    #[error("Expected token type `{expected}` but got `{found}` in action `{action}`")]
    UnexpectedToken {
        expected: &'static str,
        found: &'static str,
        action: String,
    },
    #[error("Expected token type `{expected}` but there are no more tokens in action `{action}`")]
    UnexpectedEnd { expected: &'static str, action: String },
    #[error("Unexpected `{found}` after the closing parenthesis in action `{action}`")]
    TrailingTokens { found: String, action: String },
    #[error("Integer `{lexeme}` out of range in action `{action}`")]
    IntegerOutOfRange { lexeme: String, action: String },
}

/// Any failure while compiling one action string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("div() action with 0 detected, cannot divide by 0")]
    DivisionByZero,
    #[error(transparent)]
    UnbalancedQuote(#[from] UnbalancedQuoteError),
}
