//! Clean-up of generated narration before it is appended to a journal.

use super::parser::is_mechanical_line;

/// Strip stray quote markers from narration.
///
/// A model sometimes echoes the `> ` prefix used for mechanical lines onto
/// ordinary prose. Those prefixes are removed; lines that are themselves
/// mechanical are kept verbatim.
pub fn sanitize_narrative(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if is_mechanical_line(line) {
                return line;
            }
            match line.strip_prefix('>') {
                Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
                None => line,
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove oracle result lines (`> **Oracle**: ...`, `- **Oracle:** ...`).
///
/// Used when the oracle result has already been shown separately and the
/// narration repeats it.
pub fn strip_oracle_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !is_oracle_line(line))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn is_oracle_line(line: &str) -> bool {
    let mut payload = line.trim();
    if let Some(rest) = payload.strip_prefix('>') {
        payload = rest.trim_start();
    }
    if let Some(rest) = payload.strip_prefix("- ") {
        payload = rest;
    }
    payload.starts_with("**Oracle**") || payload.starts_with("**Oracle:**")
}
