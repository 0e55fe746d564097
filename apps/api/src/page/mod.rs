// Page documents: markup validation, prompt compilation, and the HTTP
// handlers that expose them.

pub mod compiler;
pub mod example;
pub mod handlers;
pub mod markup;
pub mod prompts;

pub use compiler::compile;
pub use markup::{parse_page, MarkupError};
