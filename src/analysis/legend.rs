//! Semantic token legend shared with the editor at initialization
//!
//! The order of both lists is part of the protocol: a token type is encoded as
//! its index in [`TokenType::ALL`], and modifiers as a bitset of indices into
//! [`TokenModifier::ALL`].

use tower_lsp::lsp_types::{SemanticTokenModifier, SemanticTokenType, SemanticTokensLegend};

/// Highlighting categories, in legend order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Comment,
    String,
    Keyword,
    KeywordOther,
    Number,
    Regexp,
    Operator,
    Namespace,
    Type,
    Struct,
    Class,
    Interface,
    Enum,
    TypeParameter,
    Function,
    Method,
    Decorator,
    Macro,
    Variable,
    Parameter,
    Property,
    Label,
}

impl TokenType {
    pub const ALL: [TokenType; 22] = [
        TokenType::Comment,
        TokenType::String,
        TokenType::Keyword,
        TokenType::KeywordOther,
        TokenType::Number,
        TokenType::Regexp,
        TokenType::Operator,
        TokenType::Namespace,
        TokenType::Type,
        TokenType::Struct,
        TokenType::Class,
        TokenType::Interface,
        TokenType::Enum,
        TokenType::TypeParameter,
        TokenType::Function,
        TokenType::Method,
        TokenType::Decorator,
        TokenType::Macro,
        TokenType::Variable,
        TokenType::Parameter,
        TokenType::Property,
        TokenType::Label,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TokenType::Comment => "comment",
            TokenType::String => "string",
            TokenType::Keyword => "keyword",
            TokenType::KeywordOther => "keywordOther",
            TokenType::Number => "number",
            TokenType::Regexp => "regexp",
            TokenType::Operator => "operator",
            TokenType::Namespace => "namespace",
            TokenType::Type => "type",
            TokenType::Struct => "struct",
            TokenType::Class => "class",
            TokenType::Interface => "interface",
            TokenType::Enum => "enum",
            TokenType::TypeParameter => "typeParameter",
            TokenType::Function => "function",
            TokenType::Method => "method",
            TokenType::Decorator => "decorator",
            TokenType::Macro => "macro",
            TokenType::Variable => "variable",
            TokenType::Parameter => "parameter",
            TokenType::Property => "property",
            TokenType::Label => "label",
        }
    }

    /// Index of this type in the legend.
    pub fn encode(self) -> u32 {
        self as u32
    }
}

/// Token modifiers, in legend order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenModifier {
    Declaration,
    Documentation,
    Readonly,
    Static,
    Abstract,
    Deprecated,
    Modification,
    Async,
}

impl TokenModifier {
    pub const ALL: [TokenModifier; 8] = [
        TokenModifier::Declaration,
        TokenModifier::Documentation,
        TokenModifier::Readonly,
        TokenModifier::Static,
        TokenModifier::Abstract,
        TokenModifier::Deprecated,
        TokenModifier::Modification,
        TokenModifier::Async,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TokenModifier::Declaration => "declaration",
            TokenModifier::Documentation => "documentation",
            TokenModifier::Readonly => "readonly",
            TokenModifier::Static => "static",
            TokenModifier::Abstract => "abstract",
            TokenModifier::Deprecated => "deprecated",
            TokenModifier::Modification => "modification",
            TokenModifier::Async => "async",
        }
    }

    pub fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// Packs a set of modifiers into the protocol bitset.
pub fn encode_modifiers(modifiers: &[TokenModifier]) -> u32 {
    modifiers.iter().fold(0, |bits, modifier| bits | modifier.bit())
}

/// The legend advertised in the server capabilities.
pub fn legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: TokenType::ALL
            .iter()
            .map(|t| SemanticTokenType::new(t.as_str()))
            .collect(),
        token_modifiers: TokenModifier::ALL
            .iter()
            .map(|m| SemanticTokenModifier::new(m.as_str()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_indices_follow_legend_order() {
        for (index, token_type) in TokenType::ALL.iter().enumerate() {
            assert_eq!(token_type.encode(), index as u32);
        }
        assert_eq!(TokenType::KeywordOther.encode(), 3);
        assert_eq!(TokenType::Operator.encode(), 6);
        assert_eq!(TokenType::Function.encode(), 14);
        assert_eq!(TokenType::Variable.encode(), 18);
        assert_eq!(TokenType::Label.encode(), 21);
    }

    #[test]
    fn test_modifier_bits() {
        assert_eq!(encode_modifiers(&[]), 0);
        assert_eq!(encode_modifiers(&[TokenModifier::Readonly]), 0b100);
        assert_eq!(
            encode_modifiers(&[TokenModifier::Declaration, TokenModifier::Async]),
            0b1000_0001
        );
    }

    #[test]
    fn test_legend_names() {
        let legend = legend();
        assert_eq!(legend.token_types.len(), 22);
        assert_eq!(legend.token_modifiers.len(), 8);
        assert_eq!(legend.token_types[3].as_str(), "keywordOther");
        assert_eq!(legend.token_modifiers[2].as_str(), "readonly");
    }
}
