//! Readwise highlights integration

pub mod client;
pub mod content;
pub mod document;
pub mod models;
pub mod paginate;
pub mod sync;

pub use client::ReadwiseClient;
pub use models::{AuthStatus, Book, BookSummary, Highlight, Tag};
pub use sync::{import_book, resync_document, search_books, ImportReport, SyncReport};
