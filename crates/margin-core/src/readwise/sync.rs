//! Import, resync and search flows on top of the Readwise client.
//!
//! Resync regenerates the whole document from the latest remote state and
//! overwrites the file. Anything added by hand below the generated sections is
//! lost; the scaffold sections come back empty. Concurrent resyncs of one file
//! are last-writer-wins.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::readwise::client::ReadwiseClient;
use crate::readwise::document::{
    count_highlights, extract_book_id, render_document, suggested_file_name,
};
use crate::readwise::models::{Book, BookSummary, Highlight};

/// Remote operations the import/resync flows depend on.
#[allow(async_fn_in_trait)]
pub trait HighlightSource {
    async fn fetch_book(&self, book_id: u64) -> Result<Book>;
    async fn fetch_highlights(&self, book_id: u64) -> Result<Vec<Highlight>>;
    async fn fetch_books(&self, category: Option<&str>) -> Result<Vec<Book>>;
}

impl HighlightSource for ReadwiseClient {
    async fn fetch_book(&self, book_id: u64) -> Result<Book> {
        self.get_book(book_id).await
    }

    async fn fetch_highlights(&self, book_id: u64) -> Result<Vec<Highlight>> {
        self.get_highlights(book_id).await
    }

    async fn fetch_books(&self, category: Option<&str>) -> Result<Vec<Book>> {
        self.list_books(category).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub success: bool,
    pub filename: String,
    pub filepath: String,
    pub title: String,
    pub author: String,
    pub category: Option<String>,
    pub num_highlights: usize,
    pub book_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub success: bool,
    pub filepath: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub old_count: usize,
    pub new_count: usize,
    /// Signed: negative when highlights were removed upstream
    pub added: i64,
    pub message: String,
}

/// Fetch a book with all of its highlights and write a new source document
/// into `output_dir`.
pub async fn import_book<S: HighlightSource>(
    source: &S,
    book_id: u64,
    output_dir: &Path,
    today: NaiveDate,
) -> Result<ImportReport> {
    let book = source.fetch_book(book_id).await?;
    let highlights = source.fetch_highlights(book_id).await?;

    if highlights.is_empty() {
        return Err(Error::NoResults(
            "No highlights found for this item.".to_string(),
        ));
    }

    let filename = suggested_file_name(&book, today);
    let output_path = output_dir.join(&filename);
    let content = render_document(&book, &highlights, today);

    std::fs::create_dir_all(output_dir)?;
    write_atomically(&output_path, &content)?;

    tracing::info!(
        "Imported {} highlight(s) from book {} into {}",
        highlights.len(),
        book.id,
        output_path.display()
    );

    Ok(ImportReport {
        success: true,
        filename,
        filepath: output_path.display().to_string(),
        title: book.title_or_default().to_string(),
        author: book.author_or_default().to_string(),
        category: book.category.clone(),
        num_highlights: highlights.len(),
        book_id,
    })
}

/// Refresh a previously imported document in place.
///
/// Fails with [`Error::MissingIdentifier`] before any network call when the
/// file has no book id anchor.
pub async fn resync_document<S: HighlightSource>(
    source: &S,
    path: &Path,
    today: NaiveDate,
) -> Result<SyncReport> {
    let existing = std::fs::read_to_string(path)?;
    let book_id = extract_book_id(&existing).ok_or(Error::MissingIdentifier)?;
    let old_count = count_highlights(&existing);

    let book = source.fetch_book(book_id).await?;
    let highlights = source.fetch_highlights(book_id).await?;
    let new_count = highlights.len();

    let content = render_document(&book, &highlights, today);
    write_atomically(path, &content)?;

    let added = signed_delta(old_count, new_count);
    tracing::info!(
        "Resynced book {} at {}: {} -> {} highlight(s)",
        book_id,
        path.display(),
        old_count,
        new_count
    );

    Ok(SyncReport {
        success: true,
        filepath: path.display().to_string(),
        title: book.title,
        author: book.author,
        old_count,
        new_count,
        added,
        message: if added > 0 {
            format!("Updated: {added} new highlight(s)")
        } else {
            "No new highlights".to_string()
        },
    })
}

/// Case-insensitive substring search over titles and authors.
///
/// The API has no text search, so the whole (optionally category-filtered)
/// library is fetched and filtered locally.
pub async fn search_books<S: HighlightSource>(
    source: &S,
    query: &str,
    category: Option<&str>,
) -> Result<Vec<BookSummary>> {
    let books = source.fetch_books(category).await?;
    Ok(filter_books(&books, query))
}

pub fn filter_books(books: &[Book], query: &str) -> Vec<BookSummary> {
    let needle = query.to_lowercase();
    books
        .iter()
        .filter(|book| {
            let title = book.title.as_deref().unwrap_or_default().to_lowercase();
            let author = book.author.as_deref().unwrap_or_default().to_lowercase();
            title.contains(&needle) || author.contains(&needle)
        })
        .map(BookSummary::from)
        .collect()
}

/// Replace `path` with `content` via a sibling temp file and rename, so a crash
/// mid-write never leaves a truncated document behind. An existing file keeps
/// its permissions.
pub fn write_atomically(path: &Path, content: &str) -> Result<()> {
    let directory = parent_directory(path);
    let existing = match std::fs::metadata(path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => None,
        Err(error) => return Err(error.into()),
    };

    let mut temp = NamedTempFile::new_in(&directory)?;
    temp.write_all(content.as_bytes())?;
    if let Some(permissions) = existing {
        temp.as_file().set_permissions(permissions)?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|error| Error::Io(error.error))?;
    Ok(())
}

fn parent_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn signed_delta(old_count: usize, new_count: usize) -> i64 {
    let old = i64::try_from(old_count).unwrap_or(i64::MAX);
    let new = i64::try_from(new_count).unwrap_or(i64::MAX);
    new.saturating_sub(old)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::readwise::models::Tag;

    struct FakeSource {
        book: Book,
        highlights: Vec<Highlight>,
        books: Vec<Book>,
        calls: Cell<usize>,
    }

    impl FakeSource {
        fn with_highlights(count: usize) -> Self {
            let highlights = (0..count)
                .map(|index| Highlight {
                    text: Some(format!("highlight {index}")),
                    location: Some(i64::try_from(index).unwrap() + 1),
                    ..Highlight::default()
                })
                .collect();

            Self {
                book: Book {
                    id: 77,
                    title: Some("Thinking, Fast and Slow".to_string()),
                    author: Some("Daniel Kahneman".to_string()),
                    category: Some("books".to_string()),
                    ..Book::default()
                },
                highlights,
                books: Vec::new(),
                calls: Cell::new(0),
            }
        }
    }

    impl HighlightSource for FakeSource {
        async fn fetch_book(&self, book_id: u64) -> Result<Book> {
            self.calls.set(self.calls.get() + 1);
            assert_eq!(book_id, self.book.id);
            Ok(self.book.clone())
        }

        async fn fetch_highlights(&self, _book_id: u64) -> Result<Vec<Highlight>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.highlights.clone())
        }

        async fn fetch_books(&self, _category: Option<&str>) -> Result<Vec<Book>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.books.clone())
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn seed_document(dir: &Path, highlight_count: usize) -> PathBuf {
        let source = FakeSource::with_highlights(highlight_count);
        let path = dir.join("existing.md");
        std::fs::write(
            &path,
            render_document(&source.book, &source.highlights, today()),
        )
        .unwrap();
        path
    }

    #[tokio::test(flavor = "current_thread")]
    async fn resync_reports_added_highlights() {
        let dir = tempfile::tempdir().unwrap();
        let path = seed_document(dir.path(), 3);
        let source = FakeSource::with_highlights(5);

        let report = resync_document(&source, &path, today()).await.unwrap();

        assert_eq!(report.old_count, 3);
        assert_eq!(report.new_count, 5);
        assert_eq!(report.added, 2);
        assert_eq!(report.message, "Updated: 2 new highlight(s)");
        let rewritten = std::fs::read_to_string(&path).unwrap();
        assert_eq!(count_highlights(&rewritten), 5);
        assert_eq!(extract_book_id(&rewritten), Some(77));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn resync_surfaces_negative_delta() {
        let dir = tempfile::tempdir().unwrap();
        let path = seed_document(dir.path(), 3);
        let source = FakeSource::with_highlights(2);

        let report = resync_document(&source, &path, today()).await.unwrap();

        assert_eq!(report.old_count, 3);
        assert_eq!(report.new_count, 2);
        assert_eq!(report.added, -1);
        assert_eq!(report.message, "No new highlights");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn resync_output_matches_fresh_render() {
        let dir = tempfile::tempdir().unwrap();
        let path = seed_document(dir.path(), 1);
        std::fs::write(
            &path,
            format!(
                "{}\nMy hand-written analysis\n",
                std::fs::read_to_string(&path).unwrap()
            ),
        )
        .unwrap();
        let source = FakeSource::with_highlights(4);

        resync_document(&source, &path, today()).await.unwrap();

        let rewritten = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            rewritten,
            render_document(&source.book, &source.highlights, today())
        );
        assert!(!rewritten.contains("My hand-written analysis"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn resync_without_anchor_fails_before_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.md");
        std::fs::write(&path, "# Notes\n\n### Highlight 1 (Page 2)\n").unwrap();
        let source = FakeSource::with_highlights(2);

        let error = resync_document(&source, &path, today()).await.unwrap_err();

        assert!(matches!(error, Error::MissingIdentifier));
        assert_eq!(source.calls.get(), 0);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "# Notes\n\n### Highlight 1 (Page 2)\n"
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn import_writes_document_with_derived_name() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("sources");
        let source = FakeSource::with_highlights(2);

        let report = import_book(&source, 77, &output_dir, today()).await.unwrap();

        assert_eq!(
            report.filename,
            "2025-01-15_Daniel Kahneman_Thinking, Fast and Slow_Readwise.md"
        );
        assert_eq!(report.num_highlights, 2);
        assert_eq!(report.category.as_deref(), Some("books"));
        let written = std::fs::read_to_string(output_dir.join(&report.filename)).unwrap();
        assert!(written.starts_with("# Thinking, Fast and Slow | Daniel Kahneman - Readwise"));
        assert_eq!(count_highlights(&written), 2);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn import_without_highlights_is_no_results() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource::with_highlights(0);

        let error = import_book(&source, 77, dir.path(), today())
            .await
            .unwrap_err();

        assert!(matches!(error, Error::NoResults(_)));
        assert_eq!(error.to_string(), "No highlights found for this item.");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn search_matches_title_or_author_case_insensitively() {
        let mut source = FakeSource::with_highlights(0);
        source.books = vec![
            Book {
                id: 1,
                title: Some("Atomic Habits".to_string()),
                author: Some("James Clear".to_string()),
                ..Book::default()
            },
            Book {
                id: 2,
                title: Some("Wait But Why".to_string()),
                author: Some("Tim Urban".to_string()),
                tags: vec![Tag::default()],
                ..Book::default()
            },
            Book {
                id: 3,
                title: None,
                author: None,
                ..Book::default()
            },
        ];

        let by_title = search_books(&source, "ATOMIC", None).await.unwrap();
        let by_author = search_books(&source, "tim urban", None).await.unwrap();
        let none = search_books(&source, "nothing here", None).await.unwrap();

        assert_eq!(by_title.iter().map(|hit| hit.id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(by_author.iter().map(|hit| hit.id).collect::<Vec<_>>(), vec![2]);
        assert!(none.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test(flavor = "current_thread")]
    async fn resync_keeps_document_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = seed_document(dir.path(), 1);
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        let source = FakeSource::with_highlights(2);

        resync_document(&source, &path, today()).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[test]
    fn write_atomically_replaces_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "old content that is longer than the new one").unwrap();

        write_atomically(&path, "new").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
