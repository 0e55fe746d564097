//! Manga page generator: YAML page markup in, a generated manga page image out.
//!
//! The same pipeline backs the HTTP API (`manga-api`) and the batch CLI
//! (`generate-page`).

pub mod assets;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod gemini_client;
pub mod generation;
pub mod models;
pub mod output;
pub mod page;
pub mod routes;
pub mod state;
