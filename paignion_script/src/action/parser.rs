//! Recursive-descent parser for action calls.
//!
//! `set` takes `(key, value, element)` while the arithmetic functions take
//! `(value, key, element)`; authors rely on that order so it must not be
//! normalised.

use std::num::NonZeroI64;

use super::lexer::{Token, TokenKind};
use super::{ActionAst, ActionError, ActionValue, ParseError};
use crate::markdown::MarkdownOptions;

/// Parse one action from whitespace-free `tokens`.
///
/// `source` is the original action text, used only in error messages.
pub(super) fn parse(tokens: &[Token], source: &str, markdown: &MarkdownOptions) -> Result<ActionAst, ActionError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        source,
        markdown,
    };
    let action = parser.parse_action()?;
    parser.expect_end()?;
    Ok(action)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    source: &'a str,
    markdown: &'a MarkdownOptions,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    /// Consume the next token, which must be of kind `expected`.
    fn consume(&mut self, expected: TokenKind) -> Result<&'a Token, ParseError> {
        match self.tokens.get(self.pos) {
            Some(token) if token.kind == expected => {
                self.pos += 1;
                Ok(token)
            },
            Some(token) => Err(ParseError::UnexpectedToken {
                expected: expected.as_str(),
                found: token.kind.as_str(),
                action: self.source.to_string(),
            }),
            None => Err(ParseError::UnexpectedEnd {
                expected: expected.as_str(),
                action: self.source.to_string(),
            }),
        }
    }

    fn expect_end(&self) -> Result<(), ParseError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(ParseError::TrailingTokens {
                found: token.lexeme.clone(),
                action: self.source.to_string(),
            }),
        }
    }

    fn parse_action(&mut self) -> Result<ActionAst, ActionError> {
        let Some(first) = self.peek() else {
            return Err(ParseError::UnexpectedEnd {
                expected: "set|add|sub|mul|div",
                action: self.source.to_string(),
            }
            .into());
        };
        match first.kind {
            TokenKind::Set => self.parse_set(),
            TokenKind::Add => self.parse_add(),
            TokenKind::Sub => {
                let (value, key, element) = self.parse_integer_call(TokenKind::Sub)?;
                Ok(ActionAst::Sub { key, value, element })
            },
            TokenKind::Mul => {
                let (value, key, element) = self.parse_integer_call(TokenKind::Mul)?;
                Ok(ActionAst::Mul { key, value, element })
            },
            TokenKind::Div => self.parse_div(),
            _ => Err(ParseError::UndefinedStructure {
                token: first.to_string(),
                action: self.source.to_string(),
            }
            .into()),
        }
    }

    // set(key, value, element)
    fn parse_set(&mut self) -> Result<ActionAst, ActionError> {
        self.consume(TokenKind::Set)?;
        self.consume(TokenKind::OParen)?;
        let key = self.parse_name()?;
        self.consume(TokenKind::Comma)?;
        let value = self.parse_value()?;
        self.consume(TokenKind::Comma)?;
        let element = self.parse_name()?;
        self.consume(TokenKind::CParen)?;
        Ok(ActionAst::Set { key, value, element })
    }

    // add(value, key, element)
    fn parse_add(&mut self) -> Result<ActionAst, ActionError> {
        self.consume(TokenKind::Add)?;
        self.consume(TokenKind::OParen)?;
        let value = self.parse_value()?;
        self.consume(TokenKind::Comma)?;
        let key = self.parse_name()?;
        self.consume(TokenKind::Comma)?;
        let element = self.parse_name()?;
        self.consume(TokenKind::CParen)?;
        Ok(ActionAst::Add { key, value, element })
    }

    /// Shared shape of `sub` and `mul`: `kw(integer, key, element)`.
    fn parse_integer_call(&mut self, keyword: TokenKind) -> Result<(i64, String, String), ActionError> {
        self.consume(keyword)?;
        self.consume(TokenKind::OParen)?;
        let value = self.parse_integer()?;
        let (key, element) = self.parse_key_and_element()?;
        Ok((value, key, element))
    }

    // div(value, key, element); the zero check happens before the rest is read
    fn parse_div(&mut self) -> Result<ActionAst, ActionError> {
        self.consume(TokenKind::Div)?;
        self.consume(TokenKind::OParen)?;
        let value = NonZeroI64::new(self.parse_integer()?).ok_or(ActionError::DivisionByZero)?;
        let (key, element) = self.parse_key_and_element()?;
        Ok(ActionAst::Div { key, value, element })
    }

    fn parse_key_and_element(&mut self) -> Result<(String, String), ActionError> {
        self.consume(TokenKind::Comma)?;
        let key = self.parse_name()?;
        self.consume(TokenKind::Comma)?;
        let element = self.parse_name()?;
        self.consume(TokenKind::CParen)?;
        Ok((key, element))
    }

    /// Keys and elements: a quoted string when the name has spaces, else an identifier.
    fn parse_name(&mut self) -> Result<String, ActionError> {
        if self.peek_is(TokenKind::String) {
            self.parse_string()
        } else {
            Ok(self.consume(TokenKind::Identifier)?.lexeme.clone())
        }
    }

    /// Values of `set`/`add`: integer, then Markdown string, then plain string.
    fn parse_value(&mut self) -> Result<ActionValue, ActionError> {
        if self.peek_is(TokenKind::Integer) {
            Ok(ActionValue::Integer(self.parse_integer()?))
        } else if self.peek_is(TokenKind::MdString) {
            Ok(ActionValue::Text(self.parse_md_string()?))
        } else {
            Ok(ActionValue::Text(self.parse_string()?))
        }
    }

    fn parse_integer(&mut self) -> Result<i64, ActionError> {
        let lexeme = &self.consume(TokenKind::Integer)?.lexeme;
        lexeme.parse::<i64>().map_err(|_| {
            ParseError::IntegerOutOfRange {
                lexeme: lexeme.clone(),
                action: self.source.to_string(),
            }
            .into()
        })
    }

    /// Plain strings keep their quotes; raw line breaks become `\n`.
    fn parse_string(&mut self) -> Result<String, ActionError> {
        Ok(escape_line_breaks(&self.consume(TokenKind::String)?.lexeme))
    }

    /// Markdown strings are rendered and re-quoted as a single-line literal.
    fn parse_md_string(&mut self) -> Result<String, ActionError> {
        let lexeme = &self.consume(TokenKind::MdString)?.lexeme;
        let interior = &lexeme[2..lexeme.len() - 1];
        let html = self.markdown.render(&interior.replace("\\\"", "\""));
        Ok(quote_literal(&html))
    }
}

fn escape_line_breaks(lexeme: &str) -> String {
    lexeme.replace('\r', "").replace('\n', "\\n")
}

/// Wrap `text` in double quotes, escaping what would end or break the literal.
fn quote_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => {},
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::lexer::{significant_tokens, tokenize};

    fn parse_str(src: &str) -> Result<ActionAst, ActionError> {
        let tokens = significant_tokens(tokenize(src)?);
        parse(&tokens, src, &MarkdownOptions::default())
    }

    #[test]
    fn set_keeps_key_value_element_order() {
        let ast = parse_str(r#"set(west, "hidden room", origin)"#).unwrap();
        assert_eq!(
            ast,
            ActionAst::Set {
                key: "west".into(),
                value: ActionValue::Text("\"hidden room\"".into()),
                element: "origin".into(),
            }
        );
    }

    #[test]
    fn arithmetic_takes_value_first() {
        let ast = parse_str(r#"sub(10, amount, "health points")"#).unwrap();
        assert_eq!(
            ast,
            ActionAst::Sub {
                key: "amount".into(),
                value: 10,
                element: "\"health points\"".into(),
            }
        );
        assert_eq!(ast.operator(), "-=");
    }

    #[test]
    fn add_accepts_every_value_kind() {
        assert!(matches!(
            parse_str("add(-10, amount, coin)").unwrap(),
            ActionAst::Add { value: ActionValue::Integer(-10), .. }
        ));
        assert!(matches!(
            parse_str(r#"add("x", description, coin)"#).unwrap(),
            ActionAst::Add { value: ActionValue::Text(_), .. }
        ));
        let ast = parse_str(r#"add(m"*x*", description, coin)"#).unwrap();
        assert_eq!(ast.value(), ActionValue::Text("\"<p><em>x</em></p>\"".into()));
    }

    #[test]
    fn div_by_zero_is_caught_before_remaining_arguments() {
        // The rest of the call is malformed, but the zero is reported first.
        let err = parse_str("div(0, amount").unwrap_err();
        assert_eq!(err, ActionError::DivisionByZero);
        assert_eq!(err.to_string(), "div() action with 0 detected, cannot divide by 0");
    }

    #[test]
    fn integer_functions_reject_strings() {
        for src in [r#"mul("aaa", description, origin)"#, r#"div(m"_aaa_", description, origin)"#] {
            let err = parse_str(src).unwrap_err();
            assert!(
                matches!(err, ActionError::Parse(ParseError::UnexpectedToken { expected: "integer", .. })),
                "{src}: {err:?}"
            );
        }
    }

    #[test]
    fn missing_close_paren_runs_out_of_tokens() {
        let err = parse_str(r#"set(west, "hidden room", origin"#).unwrap_err();
        assert_eq!(
            err,
            ActionError::Parse(ParseError::UnexpectedEnd {
                expected: "cparen",
                action: r#"set(west, "hidden room", origin"#.into(),
            })
        );
    }

    #[test]
    fn unknown_leading_token_is_an_undefined_structure() {
        let err = parse_str("137").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Undefined structure starting with `INTEGER_TOKEN (`137`)` for action `137`"
        );
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let err = parse_str("set(a, 1, b) set").unwrap_err();
        assert!(matches!(err, ActionError::Parse(ParseError::TrailingTokens { .. })));
    }

    #[test]
    fn oversized_integers_are_reported() {
        let err = parse_str("add(99999999999999999999, amount, coin)").unwrap_err();
        assert!(matches!(err, ActionError::Parse(ParseError::IntegerOutOfRange { .. })));
    }

    #[test]
    fn plain_strings_stay_on_one_line() {
        let ast = parse_str("set(description, \"a\r\nb\", \"back\nroom\")").unwrap();
        assert_eq!(
            ast,
            ActionAst::Set {
                key: "description".into(),
                value: ActionValue::Text(r#""a\nb""#.into()),
                element: r#""back\nroom""#.into(),
            }
        );
    }

    #[test]
    fn quote_literal_escapes_quotes_and_newlines() {
        assert_eq!(
            quote_literal("<a href=\"x\">y</a>\n<p>z</p>"),
            r#""<a href=\"x\">y</a>\n<p>z</p>""#
        );
    }
}
