//! Utility types and functions for the LSP backend

use tower_lsp::lsp_types::{
    SemanticToken, SemanticTokenModifier, SemanticTokenType, SemanticTokensLegend,
};

use crate::language::TokenKind;

const MODIFIER_HEX: u32 = 1 << 0;
const MODIFIER_BINARY: u32 = 1 << 1;
const MODIFIER_FLOAT: u32 = 1 << 2;

/// Legend advertised in `initialize`; indices must match `token_type_index`
/// and the modifier bits above.
pub(super) fn semantic_tokens_legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: vec![
            SemanticTokenType::COMMENT,
            SemanticTokenType::STRING,
            SemanticTokenType::NUMBER,
            SemanticTokenType::KEYWORD,
            SemanticTokenType::VARIABLE,
        ],
        token_modifiers: vec![
            SemanticTokenModifier::new("hex"),
            SemanticTokenModifier::new("binary"),
            SemanticTokenModifier::new("float"),
        ],
    }
}

/// Legend index and modifier bits for a token kind. `Default` tokens are not
/// reported.
pub(super) fn semantic_token_type(kind: TokenKind) -> Option<(u32, u32)> {
    match kind {
        TokenKind::Comment => Some((0, 0)),
        TokenKind::String => Some((1, 0)),
        TokenKind::NumberHex => Some((2, MODIFIER_HEX)),
        TokenKind::NumberBinary => Some((2, MODIFIER_BINARY)),
        TokenKind::NumberFloat => Some((2, MODIFIER_FLOAT)),
        TokenKind::NumberInt => Some((2, 0)),
        TokenKind::Keyword => Some((3, 0)),
        TokenKind::Identifier => Some((4, 0)),
        TokenKind::Default => None,
    }
}

/// Helper for building semantic tokens using delta encoding
///
/// LSP semantic tokens use delta encoding where each token's position
/// is relative to the previous token, reducing payload size.
pub(super) struct SemanticTokensBuilder {
    tokens: Vec<SemanticToken>,
    prev_line: u32,
    prev_start: u32,
}

impl SemanticTokensBuilder {
    pub(super) fn new() -> Self {
        Self {
            tokens: Vec::new(),
            prev_line: 0,
            prev_start: 0,
        }
    }

    /// Add a semantic token with absolute position. Tokens must be pushed in
    /// document order.
    pub(super) fn push(
        &mut self,
        line: u32,
        start: u32,
        length: u32,
        token_type: u32,
        modifiers: u32,
    ) {
        let delta_line = line.saturating_sub(self.prev_line);
        let delta_start = if delta_line == 0 {
            start.saturating_sub(self.prev_start)
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

    pub(super) fn build(self) -> Vec<SemanticToken> {
        self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_encoding() {
        let mut builder = SemanticTokensBuilder::new();
        builder.push(0, 0, 4, 3, 0);
        builder.push(0, 5, 1, 2, 0);
        builder.push(2, 2, 3, 4, 0);
        let tokens = builder.build();

        let deltas: Vec<_> = tokens
            .iter()
            .map(|t| (t.delta_line, t.delta_start, t.length))
            .collect();
        assert_eq!(deltas, vec![(0, 0, 4), (0, 5, 1), (2, 2, 3)]);
    }

    #[test]
    fn test_legend_covers_every_reported_kind() {
        let legend = semantic_tokens_legend();
        for kind in [
            TokenKind::Comment,
            TokenKind::String,
            TokenKind::NumberHex,
            TokenKind::NumberBinary,
            TokenKind::NumberFloat,
            TokenKind::NumberInt,
            TokenKind::Keyword,
            TokenKind::Identifier,
        ] {
            let (index, modifiers) = semantic_token_type(kind).unwrap();
            assert!((index as usize) < legend.token_types.len());
            assert!(modifiers < 1 << legend.token_modifiers.len());
        }
        assert!(semantic_token_type(TokenKind::Default).is_none());
    }
}
