use serde::{Deserialize, Serialize};

use std::path::PathBuf;

/// A campaign backed by a single journal file.
///
/// The id is the slug of the character name and doubles as the journal file
/// stem (`{journal_dir}/{id}.md`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    /// Display name, read from the `# Ironsworn: <Name>` title line.
    pub name: String,
    pub journal_path: PathBuf,
}

/// Slug used when a name has no usable characters.
pub const UNTITLED_SLUG: &str = "untitled";

/// Generate a filesystem-safe campaign id from a character name.
///
/// Rules:
/// - Lowercase
/// - Replace anything outside `[a-z0-9]` with hyphens
/// - Collapse consecutive hyphens into one
/// - Trim leading/trailing hyphens
/// - Fall back to `untitled` when nothing is left
///
/// # Examples
///
/// ```
/// use ironlog_types::campaign::slugify;
///
/// assert_eq!(slugify("Test Hero"), "test-hero");
/// assert_eq!(slugify("Kira  of the Ironlands!"), "kira-of-the-ironlands");
/// assert_eq!(slugify("   "), "untitled");
/// ```
pub fn slugify(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut prev_was_hyphen = true; // treat start as hyphen to trim leading

    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c);
            prev_was_hyphen = false;
        } else if !prev_was_hyphen {
            result.push('-');
            prev_was_hyphen = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    if result.is_empty() {
        return UNTITLED_SLUG.to_string();
    }
    result
}
