//! Content change detection between consecutive captures.

use super::snapshot::ContentDiff;
use sha2::{Digest, Sha256};
use similar::{ChangeTag, TextDiff};

/// Preview length when the text changed.
pub const CHANGED_PREVIEW_CHARS: usize = 500;

/// Preview length when the text is unchanged.
pub const UNCHANGED_PREVIEW_CHARS: usize = 200;

/// Hex characters kept from the digest.
const HASH_PREFIX_LEN: usize = 8;

/// Context lines around each hunk.
const CONTEXT_RADIUS: usize = 1;

impl ContentDiff {
    /// Summarise `current` against the previous text of the same buffer.
    #[must_use]
    pub fn compute(current: &str, previous: Option<&str>) -> Self {
        let content_hash = content_hash(current);

        // An empty cached text is still a prior capture.
        match previous {
            Some(prev) if prev != current => Self {
                content_hash,
                diff_lines: changed_line_count(prev, current),
                has_changes: true,
                content_preview: preview(current, CHANGED_PREVIEW_CHARS),
            },
            _ => Self {
                content_hash,
                diff_lines: 0,
                has_changes: false,
                content_preview: preview(current, UNCHANGED_PREVIEW_CHARS),
            },
        }
    }
}

/// Short fingerprint of the text.
#[must_use]
pub fn content_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(HASH_PREFIX_LEN);
    hex
}

/// Inserted plus deleted lines in a unified diff with one line of context.
///
/// Only change lines count. The `---`/`+++` file headers, hunk headers and
/// context lines do not.
#[must_use]
pub fn changed_line_count(old: &str, new: &str) -> usize {
    let diff = TextDiff::from_lines(old, new);
    diff.unified_diff()
        .context_radius(CONTEXT_RADIUS)
        .iter_hunks()
        .map(|hunk| {
            hunk.iter_changes()
                .filter(|change| change.tag() != ChangeTag::Equal)
                .count()
        })
        .sum()
}

/// First `limit` characters, suffixed with `...` when cut.
#[must_use]
pub fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
