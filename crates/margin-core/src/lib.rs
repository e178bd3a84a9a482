//! margin-core - Core library for margin
//!
//! Readwise highlight retrieval and Markdown documents, plus read/write
//! access to a local Things task store. Used by the `margin` CLI.

pub mod config;
pub mod error;
pub mod readwise;
pub mod tasks;
pub mod util;

pub use error::{Error, Result};
