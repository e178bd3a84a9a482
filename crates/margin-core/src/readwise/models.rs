//! Wire models for the Readwise v2 API.

use serde::{Deserialize, Serialize};

/// A tag attached to a book or highlight
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
}

/// A book, article, tweet or podcast in the Readwise library
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub num_highlights: Option<u64>,
    #[serde(default)]
    pub document_note: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Book {
    pub fn title_or_default(&self) -> &str {
        non_empty(self.title.as_deref()).unwrap_or("Untitled")
    }

    pub fn author_or_default(&self) -> &str {
        non_empty(self.author.as_deref()).unwrap_or("Unknown")
    }

    pub fn category_or_default(&self) -> &str {
        non_empty(self.category.as_deref()).unwrap_or("unknown")
    }

    pub fn source_or_default(&self) -> &str {
        non_empty(self.source.as_deref()).unwrap_or("unknown")
    }
}

/// A single highlight belonging to a book
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub location: Option<i64>,
    #[serde(default)]
    pub location_type: Option<String>,
    #[serde(default)]
    pub highlighted_at: Option<String>,
    #[serde(default)]
    pub book_id: Option<u64>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Compact search hit returned by `search_books`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookSummary {
    pub id: u64,
    pub title: String,
    pub author: String,
    pub category: String,
    pub source: String,
    pub num_highlights: u64,
    pub updated: String,
    pub source_url: String,
    pub cover_image_url: String,
    pub document_note: String,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title_or_default().to_string(),
            author: book.author_or_default().to_string(),
            category: book.category_or_default().to_string(),
            source: book.source_or_default().to_string(),
            num_highlights: book.num_highlights.unwrap_or(0),
            updated: book.updated.clone().unwrap_or_default(),
            source_url: book.source_url.clone().unwrap_or_default(),
            cover_image_url: book.cover_image_url.clone().unwrap_or_default(),
            document_note: book.document_note.clone().unwrap_or_default(),
        }
    }
}

/// Outcome of probing `/auth/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthStatus {
    pub success: bool,
    pub message: String,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}
