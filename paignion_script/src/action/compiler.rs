//! Statement generation for parsed actions.

use log::trace;

use super::lexer::{significant_tokens, tokenize};
use super::{ActionAst, ActionError, parser};
use crate::markdown::MarkdownOptions;

/// A name was quoted on one side only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unbalanced quotes in `{text}`")]
pub struct UnbalancedQuoteError {
    pub text: String,
}

/// Strip one pair of enclosing double quotes from `text`, if present.
///
/// Bare text is returned unchanged.
///
/// # Errors
/// Returns [`UnbalancedQuoteError`] when only one end carries a quote.
pub fn unquote(text: &str) -> Result<&str, UnbalancedQuoteError> {
    let opens = text.starts_with('"');
    let closes = text.len() > 1 && text.ends_with('"') && !text.ends_with("\\\"");
    match (opens, closes) {
        (true, true) => Ok(&text[1..text.len() - 1]),
        (false, false) if !text.ends_with('"') => Ok(text),
        _ => Err(UnbalancedQuoteError { text: text.to_string() }),
    }
}

/// Render `action` as a `getRoomOrItem` statement, terminated by `;`.
///
/// # Errors
/// Fails only if the key or element has unbalanced quotes.
pub fn render_action(action: &ActionAst) -> Result<String, ActionError> {
    let element = unquote(action.element())?;
    let key = unquote(action.key())?;
    Ok(format!(
        "getRoomOrItem(\"{element}\")[\"{key}\"] {} {};",
        action.operator(),
        action.value()
    ))
}

/// Compiles action strings with a fixed set of Markdown options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionCompiler {
    markdown: MarkdownOptions,
}

impl ActionCompiler {
    pub fn new(markdown: MarkdownOptions) -> Self {
        Self { markdown }
    }

    pub fn markdown(&self) -> &MarkdownOptions {
        &self.markdown
    }

    /// Lex and parse `action` without rendering it.
    ///
    /// # Errors
    /// Returns the first lexing or grammar error.
    pub fn parse(&self, action: &str) -> Result<ActionAst, ActionError> {
        let tokens = significant_tokens(tokenize(action)?);
        parser::parse(&tokens, action, &self.markdown)
    }

    /// Compile one action to a statement.
    ///
    /// Blank input compiles to an empty string.
    ///
    /// # Errors
    /// Returns any lexing, grammar, division or quoting error.
    pub fn compile(&self, action: &str) -> Result<String, ActionError> {
        let tokens = significant_tokens(tokenize(action)?);
        if tokens.is_empty() {
            return Ok(String::new());
        }
        let ast = parser::parse(&tokens, action, &self.markdown)?;
        trace!("compiled action {ast}");
        render_action(&ast)
    }

    /// Compile every action and concatenate the resulting statements.
    ///
    /// # Errors
    /// Stops at the first failing action.
    pub fn compile_actions<S: AsRef<str>>(&self, actions: &[S]) -> Result<String, ActionError> {
        let mut out = String::new();
        for action in actions {
            out.push_str(&self.compile(action.as_ref())?);
        }
        Ok(out)
    }
}

/// Compile one action with the default Markdown options.
///
/// ```
/// use paignion_script::compile_action;
///
/// let stmt = compile_action("sub(1, amount, coin)").unwrap();
/// assert_eq!(stmt, r#"getRoomOrItem("coin")["amount"] -= 1;"#);
/// ```
///
/// # Errors
/// See [`ActionCompiler::compile`].
pub fn compile_action(action: &str) -> Result<String, ActionError> {
    ActionCompiler::default().compile(action)
}
