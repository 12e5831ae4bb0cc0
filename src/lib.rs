pub mod error;
pub mod language;
pub mod logging;
pub mod lsp;
