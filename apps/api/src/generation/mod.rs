// Page generation: the request-scoped pipeline and its HTTP handler.
// All endpoint calls go through gemini_client; nothing here talks HTTP directly.

pub mod generator;
pub mod handlers;
