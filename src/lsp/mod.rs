pub mod backend;
pub mod document;
pub mod execution_provider;
pub mod process_engine;
