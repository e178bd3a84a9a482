//! Markdown source documents generated from Readwise data.
//!
//! Two line anchors are machine-read on resync and form a small, versioned
//! format (v1):
//!
//! - `- **Readwise Book ID**: <digits>` in the `## Source Information` section
//!   identifies the remote book.
//! - `### Highlight <n> (<location>)` at the start of a line marks one highlight;
//!   `<n>` is a 1-based position in the current render, not a stable id.
//!
//! Rendering is a pure function of its inputs. The import date is passed in so
//! output can be pinned.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::readwise::models::{Book, Highlight, Tag};
use crate::util::title_case;

pub const ANCHOR_FORMAT_VERSION: u32 = 1;
pub const BOOK_ID_LABEL: &str = "**Readwise Book ID**";
pub const HIGHLIGHT_HEADING_PREFIX: &str = "### Highlight ";

const MAX_FILENAME_COMPONENT: usize = 100;
const ANALYSIS_PLACEHOLDER: &str = "_To be completed during analysis phase_\n";

static BOOK_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^- \*\*Readwise Book ID\*\*:[ \t]*(\d+)[ \t]*\r?$")
        .expect("valid book id pattern")
});

static HIGHLIGHT_HEADING_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^### Highlight \d+").expect("valid heading pattern"));

/// Render the full source document for a book and its highlights.
pub fn render_document(book: &Book, highlights: &[Highlight], imported_on: NaiveDate) -> String {
    let title = book.title_or_default();
    let author = book.author_or_default();
    let category = book.category_or_default();
    let source_url = non_empty(book.source_url.as_deref());
    let cover_url = non_empty(book.cover_image_url.as_deref());
    let document_note = non_empty(book.document_note.as_deref());
    let total = book
        .num_highlights
        .unwrap_or_else(|| u64::try_from(highlights.len()).unwrap_or(u64::MAX));

    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("# {title} | {author} - Readwise\n"));

    lines.push("## Metadata\n".to_string());
    lines.push(format!("- **Type**: {}", title_case(category)));
    lines.push(format!("- **Author**: {author}"));
    if let Some(url) = source_url {
        lines.push(format!("- **Source URL**: {url}"));
    }
    lines.push(format!("- **Source**: {}", book.source_or_default()));
    lines.push(format!(
        "- **Date Imported**: {}",
        imported_on.format("%Y-%m-%d")
    ));
    lines.push(format!("- **Total Highlights**: {total}"));
    if !book.tags.is_empty() {
        lines.push(format!("- **Readwise Tags**: {}", render_tags(&book.tags)));
    }
    if let Some(cover) = cover_url {
        lines.push(format!("- **Cover**: {cover}"));
    }
    lines.push(String::new());

    if let Some(note) = document_note {
        lines.push("## Document Notes\n".to_string());
        lines.push(note.to_string());
        lines.push(String::new());
    }

    lines.push("## Your Highlights\n".to_string());
    for (index, highlight) in sort_highlights(highlights).into_iter().enumerate() {
        lines.push(format!(
            "{HIGHLIGHT_HEADING_PREFIX}{} ({})\n",
            index + 1,
            location_label(highlight)
        ));
        lines.push(format!(
            "> {}\n",
            highlight.text.as_deref().unwrap_or_default().trim()
        ));

        let note = highlight.note.as_deref().unwrap_or_default().trim();
        if !note.is_empty() {
            lines.push(format!("**Your Note**: {note}\n"));
        }
        if !highlight.tags.is_empty() {
            lines.push(format!("**Tags**: {}\n", render_tags(&highlight.tags)));
        }
        lines.push("---\n".to_string());
    }

    lines.push("## Synthesis Analysis\n".to_string());
    lines.push(ANALYSIS_PLACEHOLDER.to_string());
    lines.push("## Key Themes Identified\n".to_string());
    lines.push(ANALYSIS_PLACEHOLDER.to_string());
    lines.push("## Related Synthesis Documents\n".to_string());
    lines.push("_Add connections to existing themes:_\n".to_string());
    lines.push("- [[Theme 1]]".to_string());
    lines.push("- [[Theme 2]]\n".to_string());

    lines.push("## Source Information\n".to_string());
    lines.push(format!("- {BOOK_ID_LABEL}: {}", book.id));
    lines.push(format!("- **Category**: {category}"));
    if let Some(url) = source_url {
        lines.push(format!("- **Original URL**: {url}"));
    }
    lines.push(String::new());

    lines.join("\n")
}

/// Order highlights by `(location, highlighted_at)`.
///
/// Absent locations count as 0 and absent timestamps as the empty string. The
/// sort is stable, so ties keep arrival order.
pub fn sort_highlights(highlights: &[Highlight]) -> Vec<&Highlight> {
    let mut sorted = highlights.iter().collect::<Vec<_>>();
    sorted.sort_by(|left, right| {
        let left_key = (
            left.location.unwrap_or(0),
            left.highlighted_at.as_deref().unwrap_or(""),
        );
        let right_key = (
            right.location.unwrap_or(0),
            right.highlighted_at.as_deref().unwrap_or(""),
        );
        left_key.cmp(&right_key)
    });
    sorted
}

/// Human label for where a highlight sits in its source.
pub fn location_label(highlight: &Highlight) -> String {
    let Some(location) = highlight.location.filter(|location| *location != 0) else {
        return "Location unknown".to_string();
    };

    match highlight.location_type.as_deref() {
        Some("page") => format!("Page {location}"),
        Some("order") => format!("Position {location}"),
        _ => format!("Location {location}"),
    }
}

/// Recover the book id from a previously rendered document.
///
/// Only a whole `- **Readwise Book ID**: <digits>` line counts. The last such
/// line wins, since the source section is rendered after every highlight.
pub fn extract_book_id(content: &str) -> Option<u64> {
    BOOK_ID_PATTERN
        .captures_iter(content)
        .last()
        .and_then(|captures| captures[1].parse().ok())
}

/// Count `### Highlight <n>` headings in a rendered document.
pub fn count_highlights(content: &str) -> usize {
    HIGHLIGHT_HEADING_PATTERN.find_iter(content).count()
}

/// Make text safe to use as part of a file name.
pub fn sanitize_filename(text: &str) -> String {
    let replaced = text
        .chars()
        .filter_map(|ch| match ch {
            '/' | '\\' | ':' => Some('-'),
            '?' | '*' | '"' | '<' | '>' | '|' => None,
            other => Some(other),
        })
        .take(MAX_FILENAME_COMPONENT)
        .collect::<String>();
    replaced.trim().to_string()
}

/// `<date>_<first author>_<title>_Readwise.md`
pub fn suggested_file_name(book: &Book, imported_on: NaiveDate) -> String {
    let first_author = book
        .author_or_default()
        .split(',')
        .next()
        .unwrap_or_default()
        .trim();

    format!(
        "{}_{}_{}_Readwise.md",
        imported_on.format("%Y-%m-%d"),
        sanitize_filename(first_author),
        sanitize_filename(book.title_or_default())
    )
}

fn render_tags(tags: &[Tag]) -> String {
    tags.iter()
        .map(|tag| format!("#{}", tag.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}
