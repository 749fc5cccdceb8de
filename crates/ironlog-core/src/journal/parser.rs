//! Block parser for the narrative section of a journal.
//!
//! Every public operation here is a projection of one boundary walk
//! ([`block_spans`]), so block counts, block start lines, typed blocks and
//! exchanges can never disagree about where a block begins or ends.

use ironlog_types::journal::{Block, BlockKind, Exchange, PLAYER_CLOSE_TAG, PLAYER_OPEN_TAG};

/// True if the line is exactly the player-block opening tag (ignoring
/// surrounding whitespace).
pub fn is_player_open(line: &str) -> bool {
    line.trim() == PLAYER_OPEN_TAG
}

/// True if the line is exactly the player-block closing tag.
pub fn is_player_close(line: &str) -> bool {
    line.trim() == PLAYER_CLOSE_TAG
}

/// A mechanical line is a quote marker, optional inline whitespace, then
/// bold markup: `> **Face Danger** ...`, `>**Oracle**: ...`.
pub fn is_mechanical_line(line: &str) -> bool {
    line.trim_start()
        .strip_prefix('>')
        .is_some_and(|rest| rest.trim_start_matches([' ', '\t']).starts_with("**"))
}

fn line_kind(line: &str) -> BlockKind {
    if is_mechanical_line(line) {
        BlockKind::Mechanical
    } else {
        BlockKind::Narrative
    }
}

/// Position of one block within the parsed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    pub kind: BlockKind,
    pub start_line: usize,
    /// Inclusive.
    pub end_line: usize,
    /// False only for a player block that reached end of input unclosed.
    pub complete: bool,
}

/// Iterator over block spans; see [`block_spans`].
pub struct BlockSpans<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

/// Walk `text` line by line and yield one span per block.
///
/// Blank lines separate blocks and belong to none. A player block runs from
/// its opening tag through its closing tag (blank lines inside it are kept);
/// other blocks are maximal runs of same-kind non-blank lines.
pub fn block_spans(text: &str) -> BlockSpans<'_> {
    BlockSpans {
        lines: text.lines().collect(),
        pos: 0,
    }
}

impl Iterator for BlockSpans<'_> {
    type Item = BlockSpan;

    fn next(&mut self) -> Option<BlockSpan> {
        let len = self.lines.len();
        while self.pos < len && self.lines[self.pos].trim().is_empty() {
            self.pos += 1;
        }
        if self.pos >= len {
            return None;
        }

        let start_line = self.pos;
        if is_player_open(self.lines[start_line]) {
            self.pos += 1;
            while self.pos < len {
                let line = self.lines[self.pos];
                self.pos += 1;
                if is_player_close(line) {
                    return Some(BlockSpan {
                        kind: BlockKind::Player,
                        start_line,
                        end_line: self.pos - 1,
                        complete: true,
                    });
                }
            }
            return Some(BlockSpan {
                kind: BlockKind::Player,
                start_line,
                end_line: len - 1,
                complete: false,
            });
        }

        let kind = line_kind(self.lines[start_line]);
        self.pos += 1;
        while self.pos < len {
            let line = self.lines[self.pos];
            if line.trim().is_empty() || is_player_open(line) || line_kind(line) != kind {
                break;
            }
            self.pos += 1;
        }
        Some(BlockSpan {
            kind,
            start_line,
            end_line: self.pos - 1,
            complete: true,
        })
    }
}

/// Full typed segmentation of the narrative section.
pub fn parse_to_blocks(text: &str) -> Vec<Block> {
    let lines: Vec<&str> = text.lines().collect();
    block_spans(text)
        .enumerate()
        .map(|(index, span)| Block {
            index,
            kind: span.kind,
            text: block_text(&lines, &span),
            start_line: span.start_line,
            end_line: span.end_line,
            complete: span.complete,
        })
        .collect()
}

fn block_text(lines: &[&str], span: &BlockSpan) -> String {
    match span.kind {
        BlockKind::Player => player_inner_text(lines, span),
        _ => lines[span.start_line..=span.end_line].join("\n").trim().to_string(),
    }
}

fn player_inner_text(lines: &[&str], span: &BlockSpan) -> String {
    let inner_end = if span.complete {
        span.end_line
    } else {
        span.end_line + 1
    };
    let inner_start = (span.start_line + 1).min(inner_end);
    lines[inner_start..inner_end].join("\n").trim().to_string()
}

pub fn count_blocks(text: &str) -> usize {
    block_spans(text).count()
}

/// Line offset (relative to `text`) at which block `index` begins.
pub fn find_block_start_line(text: &str, index: usize) -> Option<usize> {
    block_spans(text).nth(index).map(|span| span.start_line)
}

/// Number of player blocks (complete or not).
pub fn count_player_turns(text: &str) -> usize {
    block_spans(text)
        .filter(|span| span.kind == BlockKind::Player)
        .count()
}

/// Segment the narrative section into exchanges.
///
/// Each player or mechanical block opens a new exchange that absorbs every
/// following block up to the next boundary. Narrative that precedes the
/// first boundary (a backstory, for example) forms exchange 0.
pub fn parse_exchanges(text: &str) -> Vec<Exchange> {
    let lines: Vec<&str> = text.lines().collect();
    let mut groups: Vec<(usize, usize)> = Vec::new();

    for span in block_spans(text) {
        match groups.last_mut() {
            Some(group) if !span.kind.is_exchange_boundary() => group.1 = span.end_line,
            _ => groups.push((span.start_line, span.end_line)),
        }
    }

    groups
        .into_iter()
        .enumerate()
        .map(|(index, (start_line, end_line))| Exchange {
            index,
            content: lines[start_line..=end_line].join("\n").trim().to_string(),
            start_line,
            end_line,
        })
        .collect()
}

/// The last `count` exchanges joined by a blank line. Text with no more
/// than `count` exchanges is returned whole (trimmed).
pub fn last_exchanges(text: &str, count: usize) -> String {
    let exchanges = parse_exchanges(text);
    if exchanges.len() <= count {
        return text.trim().to_string();
    }
    exchanges[exchanges.len() - count..]
        .iter()
        .map(|exchange| exchange.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Inner text of the most recent closed player block.
pub fn extract_last_player_input(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    block_spans(text)
        .filter(|span| span.kind == BlockKind::Player && span.complete)
        .last()
        .map(|span| player_inner_text(&lines, &span))
}

/// True when the last non-blank line closes a player block or is mechanical,
/// i.e. the story is waiting for narration.
pub fn needs_narration(text: &str) -> bool {
    text.lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .is_some_and(|line| is_player_close(line) || is_mechanical_line(line))
}

/// True when the last block is a closed player block.
pub fn ends_with_player_entry(text: &str) -> bool {
    block_spans(text)
        .last()
        .is_some_and(|span| span.kind == BlockKind::Player && span.complete)
}

/// Drop player tag lines and mechanical lines, keeping prose and the
/// player's own words. Used to build embedding input.
pub fn strip_markup_lines(text: &str) -> String {
    text.lines()
        .filter(|line| {
            !is_mechanical_line(line) && !is_player_open(line) && !is_player_close(line)
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::arb_narrative_section;
    use proptest::prelude::*;

    const SAMPLE: &str = "The rain falls on Iskar.\n\
\n\
<player>\n\
I search the ruins.\n\
\n\
Carefully.\n\
</player>\n\
\n\
> **Gather Information** (+wits): Action 6, Challenge 2|9 → **Weak Hit**\n\
> **Oracle**: Action: Reveal | Theme: Secret\n\
You find a cracked seal.\n\
\n\
It bears a raven.";

    #[test]
    fn test_mechanical_line_rule() {
        assert!(is_mechanical_line("> **Face Danger** (+edge): Strong Hit"));
        assert!(is_mechanical_line(">**Oracle**: yes"));
        assert!(is_mechanical_line(">   **Oracle**: no"));
        assert!(is_mechanical_line("  > **Pay the Price**"));
        assert!(!is_mechanical_line("**Face Danger** without a marker"));
        assert!(!is_mechanical_line("> A quoted line of prose"));
        assert!(!is_mechanical_line(""));
    }

    #[test]
    fn test_parse_to_blocks_kinds_and_indices() {
        let blocks = parse_to_blocks(SAMPLE);
        let kinds: Vec<BlockKind> = blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Narrative,
                BlockKind::Player,
                BlockKind::Mechanical,
                BlockKind::Narrative,
                BlockKind::Narrative,
            ]
        );
        for (i, block) in blocks.iter().enumerate() {
            assert_eq!(block.index, i);
        }
        assert_eq!(blocks[1].text, "I search the ruins.\n\nCarefully.");
        assert_eq!(blocks[2].start_line, 8);
        assert_eq!(blocks[2].end_line, 9);
        assert_eq!(blocks[3].text, "You find a cracked seal.");
    }

    #[test]
    fn test_count_and_start_lines_agree_with_blocks() {
        let inputs = [
            SAMPLE,
            "",
            "\n\n\n",
            "<player>\nunterminated",
            "> plain quote\n> **Move**\nprose\n<player>\nx\n</player>\n</player>",
            "a\n\nb\n\n\nc",
        ];
        for text in inputs {
            let blocks = parse_to_blocks(text);
            assert_eq!(count_blocks(text), blocks.len(), "input: {text:?}");
            let starts: Vec<usize> = (0..blocks.len())
                .map(|i| find_block_start_line(text, i).expect("block start"))
                .collect();
            assert!(starts.windows(2).all(|w| w[0] < w[1]), "input: {text:?}");
            for block in &blocks {
                assert_eq!(Some(block.start_line), find_block_start_line(text, block.index));
            }
            assert_eq!(find_block_start_line(text, blocks.len()), None);
        }
    }

    proptest! {
        #[test]
        fn prop_block_starts_agree_with_parsed_blocks(text in arb_narrative_section()) {
            let blocks = parse_to_blocks(&text);
            prop_assert_eq!(count_blocks(&text), blocks.len());

            let mut previous = None;
            for block in &blocks {
                let start = find_block_start_line(&text, block.index);
                prop_assert_eq!(start, Some(block.start_line));
                prop_assert!(previous.is_none_or(|p| p < block.start_line));
                previous = Some(block.start_line);
            }
            prop_assert_eq!(find_block_start_line(&text, blocks.len()), None);
        }

        #[test]
        fn prop_only_the_last_block_can_be_unterminated(text in arb_narrative_section()) {
            let blocks = parse_to_blocks(&text);
            if let Some((_, earlier)) = blocks.split_last() {
                prop_assert!(earlier.iter().all(|b| b.complete));
            }
        }
    }

    #[test]
    fn test_unterminated_player_block_is_kept() {
        let text = "Prose.\n\n<player>\nI wait";
        let blocks = parse_to_blocks(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].kind, BlockKind::Player);
        assert!(!blocks[1].complete);
        assert_eq!(blocks[1].text, "I wait");
    }

    #[test]
    fn test_quote_without_bold_is_narrative() {
        let blocks = parse_to_blocks("> The wind howls.\nThe door creaks.");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Narrative);
    }

    #[test]
    fn test_parse_exchanges_leading_narrative_is_exchange_zero() {
        let exchanges = parse_exchanges(SAMPLE);
        assert_eq!(exchanges.len(), 3);
        assert_eq!(exchanges[0].content, "The rain falls on Iskar.");
        assert!(exchanges[1].content.starts_with("<player>"));
        assert!(exchanges[1].content.ends_with("</player>"));
        assert!(exchanges[2].content.starts_with("> **Gather Information**"));
        assert!(exchanges[2].content.ends_with("It bears a raven."));
    }

    #[test]
    fn test_multiline_player_block_then_narrative_is_one_exchange() {
        let text = "<player>\nI climb.\nI look.\n</player>\n\nThe peak is cold.";
        let exchanges = parse_exchanges(text);
        assert_eq!(exchanges.len(), 1);
        assert_eq!(count_player_turns(text), 1);
    }

    #[test]
    fn test_last_exchanges_window() {
        assert_eq!(last_exchanges(SAMPLE, 5), SAMPLE.trim());
        let window = last_exchanges(SAMPLE, 1);
        assert!(window.starts_with("> **Gather Information**"));
        assert!(!window.contains("<player>"));
    }

    #[test]
    fn test_extract_last_player_input() {
        assert_eq!(
            extract_last_player_input("<player>\nHello\nworld\n</player>"),
            Some("Hello\nworld".to_string())
        );
        let text = "<player>\nfirst\n</player>\n\nProse.\n\n<player>\nsecond, unfinished";
        assert_eq!(extract_last_player_input(text), Some("first".to_string()));
        assert_eq!(extract_last_player_input("Just prose."), None);
    }

    #[test]
    fn test_needs_narration() {
        assert!(needs_narration("<player>\nI run\n</player>\n\n"));
        assert!(needs_narration("Prose.\n> **Strong Hit**"));
        assert!(!needs_narration("Prose after a roll."));
        assert!(!needs_narration("> just a quote"));
        assert!(!needs_narration(""));
        assert!(!needs_narration("   \n\n  "));
    }

    #[test]
    fn test_ends_with_player_entry() {
        assert!(ends_with_player_entry("Prose.\n\n<player>\nI run\n</player>\n"));
        assert!(!ends_with_player_entry("<player>\nI run\n</player>\nThe wolf follows."));
        assert!(!ends_with_player_entry("<player>\nunfinished"));
        assert!(!ends_with_player_entry(""));
    }

    #[test]
    fn test_player_then_mechanical_scenario() {
        let text = "<player>\nI head north\n</player>\n\n\
> **Move** (+edge): Action 5, Challenge 3|7 → **Strong Hit**\n";
        assert!(needs_narration(text));
        assert!(!ends_with_player_entry(text));
        assert_eq!(parse_exchanges(text).len(), 2);
    }

    #[test]
    fn test_strip_markup_lines_keeps_player_words() {
        let stripped = strip_markup_lines(SAMPLE);
        assert!(stripped.contains("I search the ruins."));
        assert!(stripped.contains("You find a cracked seal."));
        assert!(!stripped.contains("<player>"));
        assert!(!stripped.contains("**Oracle**"));
        assert_eq!(strip_markup_lines("> **Oracle**: yes\n> **Face Danger**"), "");
    }
}
