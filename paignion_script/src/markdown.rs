//! Markdown rendering for room bodies, item text and `m"..."` literals.

use std::borrow::Cow;

use lazy_static::lazy_static;
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, TextMergeStream, html};
use regex::{Captures, Regex};
use serde::Deserialize;

lazy_static! {
    static ref SHORTCODE: Regex = Regex::new(r":([a-z0-9_+\-]+):").expect("valid shortcode regex");
}

/// Markdown extensions enabled for a project.
///
/// Read from the `[markdown]` table of `paignion.toml`; absent keys keep
/// their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownOptions {
    /// `~~text~~` becomes `<del>`.
    pub strikethrough: bool,
    /// `~text~` becomes `<sub>`.
    pub subscript: bool,
    pub tables: bool,
    pub footnotes: bool,
    pub definition_lists: bool,
    /// `# Title {#id .class}`
    pub heading_attributes: bool,
    pub smart_punctuation: bool,
    /// Replace `:shortcode:` with the emoji it names.
    pub emoji: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            strikethrough: true,
            subscript: true,
            tables: true,
            footnotes: true,
            definition_lists: true,
            heading_attributes: true,
            smart_punctuation: false,
            emoji: true,
        }
    }
}

impl MarkdownOptions {
    fn extensions(&self) -> Options {
        let mut opts = Options::empty();
        opts.set(Options::ENABLE_STRIKETHROUGH, self.strikethrough);
        opts.set(Options::ENABLE_SUBSCRIPT, self.subscript);
        opts.set(Options::ENABLE_TABLES, self.tables);
        opts.set(Options::ENABLE_FOOTNOTES, self.footnotes);
        opts.set(Options::ENABLE_DEFINITION_LIST, self.definition_lists);
        opts.set(Options::ENABLE_HEADING_ATTRIBUTES, self.heading_attributes);
        opts.set(Options::ENABLE_SMART_PUNCTUATION, self.smart_punctuation);
        opts
    }

    /// Render `text` to HTML with trailing whitespace removed.
    pub fn render(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() * 3 / 2);
        let events = TextMergeStream::new(Parser::new_ext(text, self.extensions()));
        if self.emoji {
            let mut in_code_block = false;
            let events = events.map(move |event| match event {
                Event::Start(Tag::CodeBlock(_)) => {
                    in_code_block = true;
                    event
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    event
                }
                Event::Text(chunk) if !in_code_block => Event::Text(replace_shortcodes(chunk)),
                other => other,
            });
            html::push_html(&mut out, events);
        } else {
            html::push_html(&mut out, events);
        }
        out.truncate(out.trim_end().len());
        out
    }
}

/// Swap known `:shortcode:` names for their emoji; unknown names stay as written.
fn replace_shortcodes(text: CowStr<'_>) -> CowStr<'_> {
    let emoji_for = |caps: &Captures| match emojis::get_by_shortcode(&caps[1]) {
        Some(emoji) => emoji.as_str().to_string(),
        None => caps[0].to_string(),
    };
    let replaced = match SHORTCODE.replace_all(&text, emoji_for) {
        Cow::Borrowed(_) => None,
        Cow::Owned(replaced) => Some(replaced),
    };
    replaced.map_or(text, CowStr::from)
}

/// Render with the default options.
pub fn markdownify(text: &str) -> String {
    MarkdownOptions::default().render(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_emphasis_in_a_paragraph() {
        assert_eq!(
            markdownify("Very, _very_ **broken**"),
            "<p>Very, <em>very</em> <strong>broken</strong></p>"
        );
    }

    #[test]
    fn strikethrough_follows_options() {
        assert_eq!(markdownify("~~gone~~"), "<p><del>gone</del></p>");
        let plain = MarkdownOptions {
            strikethrough: false,
            ..MarkdownOptions::default()
        };
        assert_eq!(plain.render("~~gone~~"), "<p>~~gone~~</p>");
    }

    #[test]
    fn single_tilde_is_subscript() {
        assert_eq!(
            markdownify("a ~faded~ note, ~~gone~~"),
            "<p>a <sub>faded</sub> note, <del>gone</del></p>"
        );
        // a single tilde does not open inside a word
        assert_eq!(markdownify("H~2~O"), "<p>H~2~O</p>");
    }

    #[test]
    fn shortcodes_become_emoji() {
        assert_eq!(markdownify("Hello :smile:"), "<p>Hello \u{1F604}</p>");
        assert_eq!(markdownify("at 10:30: :not_an_emoji_name:"), "<p>at 10:30: :not_an_emoji_name:</p>");
        assert_eq!(markdownify("`:smile:`"), "<p><code>:smile:</code></p>");
        let plain = MarkdownOptions {
            emoji: false,
            ..MarkdownOptions::default()
        };
        assert_eq!(plain.render("Hello :smile:"), "<p>Hello :smile:</p>");
    }

    #[test]
    fn shortcodes_in_code_blocks_are_kept() {
        assert_eq!(markdownify("    :smile:\n"), "<pre><code>:smile:\n</code></pre>");
    }

    #[test]
    fn definition_lists_and_heading_attributes() {
        assert_eq!(
            markdownify("Lamp\n:   Gives light.\n"),
            "<dl>\n<dt>Lamp</dt>\n<dd>Gives light.</dd>\n</dl>"
        );
        assert_eq!(markdownify("# Hall {#hall}"), "<h1 id=\"hall\">Hall</h1>");
    }

    #[test]
    fn tables_are_enabled_by_default() {
        let html = markdownify("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.starts_with("<table>"), "{html}");
    }

    #[test]
    fn empty_text_renders_empty() {
        assert_eq!(markdownify(""), "");
        assert_eq!(markdownify("\n\n"), "");
    }

    #[test]
    fn multiple_paragraphs_keep_inner_newlines() {
        assert_eq!(markdownify("one\n\ntwo\n"), "<p>one</p>\n<p>two</p>");
    }
}
