//! Utility types and functions for the LSP backend

use tower_lsp::lsp_types::SemanticToken;

use crate::analysis::{Token, encode_modifiers};

/// Helper for building semantic tokens using delta encoding
///
/// LSP semantic tokens use delta encoding where each token's position
/// is relative to the previous token, reducing payload size.
pub(crate) struct SemanticTokensBuilder {
    tokens: Vec<SemanticToken>,
    prev_line: u32,
    prev_start: u32,
}

impl SemanticTokensBuilder {
    pub(crate) fn new() -> Self {
        Self {
            tokens: Vec::new(),
            prev_line: 0,
            prev_start: 0,
        }
    }

    /// Add a semantic token with absolute position
    ///
    /// The builder automatically converts to delta encoding
    pub(crate) fn push(&mut self, line: u32, start: u32, length: u32, token_type: u32, modifiers: u32) {
        let delta_line = if line >= self.prev_line {
            line - self.prev_line
        } else {
            // Should not happen - tokens arrive line-major
            0
        };

        let delta_start = if delta_line == 0 && start >= self.prev_start {
            start - self.prev_start
        } else if delta_line == 0 {
            // Should not happen - tokens on same line should be in order
            0
        } else {
            start
        };

        self.tokens.push(SemanticToken {
            delta_line,
            delta_start,
            length,
            token_type,
            token_modifiers_bitset: modifiers,
        });

        self.prev_line = line;
        self.prev_start = start;
    }

    /// Add a classified token
    pub(crate) fn push_token(&mut self, token: &Token) {
        self.push(
            token.line,
            token.start_character,
            token.length,
            token.token_type.encode(),
            encode_modifiers(&token.token_modifiers),
        );
    }

    /// Build the final vector of semantic tokens
    pub(crate) fn build(self) -> Vec<SemanticToken> {
        self.tokens
    }
}
