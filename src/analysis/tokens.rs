//! Space-delimited tokenizer and lexical classifier
//!
//! Each line is split strictly on `' '` and every word is classified on its
//! own, without looking at its neighbours. The same spelling always yields
//! the same class; only the set of local variables depends on the document.

use crate::framework::FrameworkTable;

use super::legend::{TokenModifier, TokenType};
use super::variables::extract_variables;

/// How long the last word of a line is reported to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpanLengthMode {
    /// The last word of a line spans the length of the whole line. Editors
    /// clamp the overflow.
    #[default]
    LineLength,
    /// Every word spans exactly its own characters.
    Exact,
}

/// A classified span of a document, positioned in UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub line: u32,
    pub start_character: u32,
    pub length: u32,
    pub token_type: TokenType,
    pub token_modifiers: Vec<TokenModifier>,
}

/// Result of classifying one word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub token_type: TokenType,
    pub token_modifiers: Vec<TokenModifier>,
}

impl Classification {
    fn plain(token_type: TokenType) -> Self {
        Self { token_type, token_modifiers: Vec::new() }
    }
}

/// A word of a line with its UTF-16 offset and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span<'a> {
    pub text: &'a str,
    pub start: u32,
    pub length: u32,
}

fn utf16_len(s: &str) -> u32 {
    s.encode_utf16().count() as u32
}

/// Splits a document into lines on `\r\n`, `\r` or `\n`.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(text);
    std::iter::from_fn(move || {
        let current = rest?;
        match current.find(|c: char| c == '\r' || c == '\n') {
            Some(i) => {
                let skip = if current[i..].starts_with("\r\n") { 2 } else { 1 };
                rest = Some(&current[i + skip..]);
                Some(&current[..i])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}

/// Splits a line on the space character, dropping the empty pieces left by
/// repeated, leading or trailing spaces.
pub fn split_spans(line: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    let mut offset = 0;
    for piece in line.split(' ') {
        let length = utf16_len(piece);
        if length > 0 {
            spans.push(Span { text: piece, start: offset, length });
        }
        // The separator is one UTF-16 unit.
        offset += length + 1;
    }
    spans
}

/// Removes one leading `(` and one trailing `)`.
fn strip_parens(word: &str) -> &str {
    let word = word.strip_prefix('(').unwrap_or(word);
    word.strip_suffix(')').unwrap_or(word)
}

/// Classifies a single word against the framework and the document's variables.
///
/// Precedence is fixed: operator, builtin keyword, framework function, local
/// variable, framework variable, framework keyword, then label.
pub fn classify_word(word: &str, framework: &FrameworkTable, variables: &[String]) -> Classification {
    let text = strip_parens(word.trim());
    let contains = |list: &[String]| list.iter().any(|entry| entry == text);

    if text == "=" {
        Classification::plain(TokenType::Operator)
    } else if text == "forever" || text == "scope" {
        Classification::plain(TokenType::Keyword)
    } else if contains(framework.funcs()) {
        Classification::plain(TokenType::Function)
    } else if contains(variables) {
        Classification::plain(TokenType::Variable)
    } else if contains(framework.vars()) {
        Classification {
            token_type: TokenType::Variable,
            token_modifiers: vec![TokenModifier::Readonly],
        }
    } else if contains(framework.keyword_other()) {
        Classification::plain(TokenType::KeywordOther)
    } else {
        Classification::plain(TokenType::Label)
    }
}

/// Tokenizes and classifies a whole document.
///
/// Tokens come out line-major and left to right, which is the order the
/// delta encoding of semantic tokens requires.
pub fn classify(text: &str, framework: &FrameworkTable, mode: SpanLengthMode) -> Vec<Token> {
    let variables = extract_variables(text);
    let mut tokens = Vec::new();

    for (line_index, line) in split_lines(text).enumerate() {
        let spans = split_spans(line);
        let line_length = utf16_len(line);
        let last = spans.len().saturating_sub(1);

        for (i, span) in spans.iter().enumerate() {
            let Classification { token_type, token_modifiers } =
                classify_word(span.text, framework, &variables);

            let length = match mode {
                SpanLengthMode::LineLength if i == last => line_length,
                _ => span.length,
            };

            tokens.push(Token {
                line: line_index as u32,
                start_character: span.start,
                length,
                token_type,
                token_modifiers,
            });
        }
    }

    tokens
}
