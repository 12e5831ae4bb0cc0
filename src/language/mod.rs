//! Stacky language support: vocabulary, tokenizer, symbol extraction,
//! completion and registration with a language-service host.

pub mod completion;
pub mod registry;
pub mod symbols;
pub mod tokenizer;
pub mod vocabulary;

pub use completion::{
    complete, CompletionContext, CompletionProvider, CursorPosition, DocumentSnapshot,
    StackyCompletionProvider, Suggestion, SuggestionKind, WordRange,
};
pub use registry::{
    register_stacky, LanguageConfig, LanguageEntry, LanguageHost, LanguageRegistry,
    LINE_COMMENT, STACKY_LANGUAGE_ID,
};
pub use symbols::{extract, SymbolTable};
pub use tokenizer::{
    tokenize_document, tokenize_line, LineTokenizer, StackyTokenizer, Token, TokenKind,
};
