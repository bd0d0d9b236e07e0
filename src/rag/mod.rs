//! Question answering over the full document collection.
//!
//! - `context_builder`: concatenates every document into one context blob
//! - `prompt`: instruction block and answer schema
//! - `dispatcher`: one structured LLM call per question
//! - `normalizer`: defaults whatever the model returned into a `QueryResult`

pub mod context_builder;
pub mod dispatcher;
pub mod normalizer;
pub mod prompt;

pub use context_builder::assemble;
pub use dispatcher::QueryDispatcher;
pub use normalizer::{normalize, QueryResult};
