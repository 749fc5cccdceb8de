//! Reading and writing the character header of a journal file.
//!
//! The header is matched line by line with fixed-format patterns. Anything
//! that fails to match keeps its default value, since journals are plain
//! markdown and may be edited by hand.

use std::sync::LazyLock;

use ironlog_types::character::{CharacterSheet, Rank, Vow};
use ironlog_types::journal::JOURNAL_MARKER;
use regex::Regex;

use super::journal_marker_line;

static STATS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\*\*Edge\*\*:\s*(\d+)\s*\|\s*\*\*Heart\*\*:\s*(\d+)\s*\|\s*\*\*Iron\*\*:\s*(\d+)\s*\|\s*\*\*Shadow\*\*:\s*(\d+)\s*\|\s*\*\*Wits\*\*:\s*(\d+)",
    )
    .expect("stats pattern is valid")
});

static METERS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\*\*Health\*\*:\s*(-?\d+)\s*\|\s*\*\*Spirit\*\*:\s*(-?\d+)\s*\|\s*\*\*Supply\*\*:\s*(-?\d+)\s*\|\s*\*\*Momentum\*\*:\s*(-?\d+)",
    )
    .expect("meters pattern is valid")
});

static VOW_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*-\s*\[([xX ])\]\s*(.+?)\s*—\s*(\w+)\s*\((\d+)/10\)")
        .expect("vow pattern is valid")
});

static TITLE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#\s+Ironsworn:\s*(.+)$").expect("title pattern is valid")
});

const VOWS_HEADING: &str = "### Vows";
const SEPARATOR: &str = "---";

/// Lines before the `## Journal` marker (the whole text if there is none).
fn header_lines(content: &str) -> Vec<&str> {
    let lines: Vec<&str> = content.lines().collect();
    let end = journal_marker_line(&lines).unwrap_or(lines.len());
    lines[..end].to_vec()
}

/// Display name from the `# Ironsworn: <Name>` title line.
pub fn campaign_title(content: &str) -> Option<String> {
    header_lines(content).into_iter().find_map(|line| {
        TITLE_LINE
            .captures(line.trim())
            .map(|caps| caps[1].trim().to_string())
    })
}

/// Parse the character sheet from the header.
///
/// Missing or malformed lines leave the defaults in place: stats 1, meters
/// 5/5/5/2, no vows. Vow lines with an unknown rank are skipped.
pub fn parse_character(content: &str) -> CharacterSheet {
    let lines = header_lines(content);
    let name = lines
        .iter()
        .find_map(|line| TITLE_LINE.captures(line.trim()).map(|c| c[1].trim().to_string()))
        .unwrap_or_default();
    let mut sheet = CharacterSheet::defaults(name);

    for line in &lines {
        if let Some(caps) = STATS_LINE.captures(line) {
            let stat = |i: usize, current: u8| caps[i].parse().unwrap_or(current);
            sheet.edge = stat(1, sheet.edge);
            sheet.heart = stat(2, sheet.heart);
            sheet.iron = stat(3, sheet.iron);
            sheet.shadow = stat(4, sheet.shadow);
            sheet.wits = stat(5, sheet.wits);
        } else if let Some(caps) = METERS_LINE.captures(line) {
            let meter = |i: usize, current: i32| caps[i].parse().unwrap_or(current);
            sheet.health = meter(1, sheet.health);
            sheet.spirit = meter(2, sheet.spirit);
            sheet.supply = meter(3, sheet.supply);
            sheet.momentum = meter(4, sheet.momentum);
        } else if let Some(caps) = VOW_LINE.captures(line) {
            let rank: Rank = match caps[3].parse() {
                Ok(rank) => rank,
                Err(e) => {
                    tracing::debug!(line = %line, error = %e, "skipping vow line");
                    continue;
                }
            };
            let progress = caps[4].parse::<u32>().unwrap_or(0).min(u32::from(u8::MAX)) as u8;
            sheet.vows.push(Vow::new(caps[2].to_string(), rank, progress));
        }
    }

    sheet
}

pub fn format_stats_line(sheet: &CharacterSheet) -> String {
    format!(
        "- **Edge**: {} | **Heart**: {} | **Iron**: {} | **Shadow**: {} | **Wits**: {}",
        sheet.edge, sheet.heart, sheet.iron, sheet.shadow, sheet.wits
    )
}

pub fn format_meters_line(sheet: &CharacterSheet) -> String {
    format!(
        "- **Health**: {} | **Spirit**: {} | **Supply**: {} | **Momentum**: {}",
        sheet.health, sheet.spirit, sheet.supply, sheet.momentum
    )
}

/// `- [x] description — Rank (progress/10)`; checked once the track is full.
pub fn format_vow_line(vow: &Vow) -> String {
    let mark = if vow.is_fulfilled() { 'x' } else { ' ' };
    format!(
        "- [{mark}] {} — {} ({}/10)",
        vow.description.trim(),
        vow.rank,
        vow.progress
    )
}

/// Render a brand new journal: header, empty vow block, journal marker, and
/// the optional backstory as the first narrative.
pub fn render_journal(sheet: &CharacterSheet, backstory: Option<&str>) -> String {
    let mut out = format!("# Ironsworn: {}\n\n## Character\n", sheet.name.trim());
    out.push_str(&format_stats_line(sheet));
    out.push('\n');
    out.push_str(&format_meters_line(sheet));
    out.push_str("\n\n");
    out.push_str(VOWS_HEADING);
    out.push('\n');
    for vow in &sheet.vows {
        out.push_str(&format_vow_line(vow));
        out.push('\n');
    }
    out.push_str(SEPARATOR);
    out.push_str("\n\n");
    out.push_str(JOURNAL_MARKER);
    out.push_str("\n\n");
    if let Some(story) = backstory.map(str::trim).filter(|s| !s.is_empty()) {
        out.push_str(story);
        out.push_str("\n\n");
    }
    out
}

/// Rewrite the stats line, meters line and vow block of `content` from
/// `sheet`. Everything else, including the journal section, is untouched.
pub fn apply_character(content: &str, sheet: &CharacterSheet) -> String {
    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();
    let header_end = {
        let borrowed: Vec<&str> = lines.iter().map(String::as_str).collect();
        journal_marker_line(&borrowed).unwrap_or(lines.len())
    };

    for line in lines.iter_mut().take(header_end) {
        if STATS_LINE.is_match(line) {
            *line = format_stats_line(sheet);
        } else if METERS_LINE.is_match(line) {
            *line = format_meters_line(sheet);
        }
    }

    let vows_start = lines[..header_end]
        .iter()
        .position(|line| line.trim() == VOWS_HEADING);
    let Some(vows_start) = vows_start else {
        tracing::warn!("no vow heading in journal header; vows not updated");
        return lines.join("\n");
    };
    let separator = lines[vows_start + 1..header_end]
        .iter()
        .position(|line| line.trim() == SEPARATOR)
        .map(|offset| vows_start + 1 + offset);
    let Some(separator) = separator else {
        tracing::warn!("vow block has no closing separator; vows not updated");
        return lines.join("\n");
    };

    let mut block: Vec<String> = sheet.vows.iter().map(format_vow_line).collect();
    block.push(String::new());
    lines.splice(vows_start + 1..separator, block);
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hero() -> CharacterSheet {
        CharacterSheet::defaults("Test Hero")
    }

    #[test]
    fn test_render_new_journal_layout() {
        let content = render_journal(&hero(), None);
        assert_eq!(
            content,
            "# Ironsworn: Test Hero\n\n## Character\n\
- **Edge**: 1 | **Heart**: 1 | **Iron**: 1 | **Shadow**: 1 | **Wits**: 1\n\
- **Health**: 5 | **Spirit**: 5 | **Supply**: 5 | **Momentum**: 2\n\n\
### Vows\n---\n\n## Journal\n\n"
        );
    }

    #[test]
    fn test_render_with_backstory() {
        let content = render_journal(&hero(), Some("  Raised by wolves.  "));
        assert!(content.ends_with("## Journal\n\nRaised by wolves.\n\n"));
    }

    #[test]
    fn test_parse_defaults_from_garbage() {
        let sheet = parse_character("nothing useful here");
        assert!(sheet.has_default_stats());
        assert_eq!(sheet.momentum, 2);
        assert!(sheet.vows.is_empty());
        assert_eq!(sheet.name, "");
    }

    #[test]
    fn test_parse_round_trips_rendered_sheet() {
        let mut sheet = hero();
        sheet.edge = 3;
        sheet.wits = 2;
        sheet.momentum = -4;
        sheet.vows.push(Vow::new("Avenge my kin", Rank::Extreme, 4));
        let parsed = parse_character(&render_journal(&sheet, None));
        assert_eq!(parsed, sheet);
    }

    #[test]
    fn test_parse_ignores_vow_like_lines_in_journal_section() {
        let content = format!(
            "{}- [ ] Not a vow — Epic (3/10)\n",
            render_journal(&hero(), None)
        );
        assert!(parse_character(&content).vows.is_empty());
    }

    #[test]
    fn test_parse_skips_unknown_rank() {
        let content = "### Vows\n- [ ] Find the spring — Legendary (2/10)\n- [x] Guard the gate — Dangerous (10/10)\n---";
        let sheet = parse_character(content);
        assert_eq!(sheet.vows.len(), 1);
        assert_eq!(sheet.vows[0].rank, Rank::Dangerous);
        assert!(sheet.vows[0].is_fulfilled());
    }

    #[test]
    fn test_vow_line_checked_when_fulfilled() {
        let vow = Vow::new("Reach the peak", Rank::Formidable, 14);
        assert_eq!(format_vow_line(&vow), "- [x] Reach the peak — Formidable (10/10)");
    }

    #[test]
    fn test_apply_character_replaces_only_header_lines() {
        let original = format!(
            "{}The journey begins.\n",
            render_journal(&hero(), None)
        );
        let mut sheet = hero();
        sheet.iron = 3;
        sheet.vows.push(Vow::new("Find my sister", Rank::Dangerous, 2));
        sheet.vows.push(Vow::new("Slay the wyrm", Rank::Epic, 0));

        let updated = apply_character(&original, &sheet);
        assert!(updated.contains("**Iron**: 3"));
        assert!(updated.contains(
            "### Vows\n- [ ] Find my sister — Dangerous (2/10)\n- [ ] Slay the wyrm — Epic (0/10)\n\n---"
        ));
        assert!(updated.ends_with("## Journal\n\nThe journey begins.\n"));
        assert_eq!(parse_character(&updated), sheet);
    }

    #[test]
    fn test_apply_character_twice_is_stable() {
        let mut sheet = hero();
        sheet.vows.push(Vow::new("Hold the line", Rank::Troublesome, 9));
        let once = apply_character(&render_journal(&hero(), None), &sheet);
        let twice = apply_character(&once, &sheet);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_campaign_title() {
        assert_eq!(
            campaign_title("# Ironsworn: Kira of Iskar\n\n## Journal\n"),
            Some("Kira of Iskar".to_string())
        );
        assert_eq!(campaign_title("# Something else"), None);
    }
}
