//! Text utilities shared by the renderer and the quality scorer

use pulldown_cmark::{Event, Parser, TagEnd};
use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));
static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}'\-]*").expect("word pattern"));
static SENTENCE_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("sentence pattern"));

/// Escape text for inclusion in HTML element content or attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}

/// Decode the entities produced by [`escape_html`] plus `&nbsp;`
pub fn decode_entities(input: &str) -> String {
    input
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Remove HTML tags and decode entities, leaving plain text
pub fn strip_tags(html: &str) -> String {
    decode_entities(&TAG_RE.replace_all(html, " "))
}

/// Count words in plain text
pub fn count_words(text: &str) -> usize {
    WORD_RE.find_iter(text).count()
}

/// Iterate over the words in plain text
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    WORD_RE.find_iter(text).map(|m| m.as_str())
}

/// Count runs of sentence-ending punctuation
pub fn count_sentence_endings(text: &str) -> usize {
    SENTENCE_END_RE.find_iter(text).count()
}

/// Split text into trimmed, non-empty sentences
pub fn sentences(text: &str) -> Vec<String> {
    SENTENCE_END_RE
        .split(text)
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Plain text of a markdown document with all markup removed
///
/// Inline markup and escapes split text into several events, so separators
/// are only emitted at line breaks and block boundaries.
pub fn markdown_to_plain_text(markdown: &str) -> String {
    let mut text = String::with_capacity(markdown.len());
    for event in Parser::new(markdown) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::InlineHtml(h) => text.push_str(&decode_entities(&TAG_RE.replace_all(&h, ""))),
            Event::Html(h) => {
                text.push_str(&strip_tags(&h));
                text.push(' ');
            }
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::TableCell
                | TagEnd::CodeBlock,
            ) => text.push(' '),
            _ => {}
        }
    }
    text
}

/// Word count of a markdown document with markup stripped
pub fn markdown_word_count(markdown: &str) -> usize {
    count_words(&markdown_to_plain_text(markdown))
}

/// Uppercase the first letter of every whitespace-separated word
pub fn title_case(input: &str) -> String {
    input
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Longest prefix of `input` holding at most `max_chars` characters
pub fn truncate_chars(input: &str, max_chars: usize) -> &str {
    match input.char_indices().nth(max_chars) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}
