//! Fenced code block scanning.

/// A fenced code region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedBlock {
    /// 1-based line of the opening fence, relative to the scanned text.
    pub start_line: usize,
    /// Info string after the opening fence (e.g. `bash`).
    pub lang: String,
    /// Number of content lines between the fences.
    pub line_count: usize,
    /// Whether a closing fence was found.
    pub closed: bool,
}

fn fence_of(line: &str) -> Option<(char, usize, &str)> {
    let trimmed = line.trim_start();
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let ch = trimmed.chars().next()?;
    if ch != '`' && ch != '~' {
        return None;
    }
    let run = trimmed.chars().take_while(|&c| c == ch).count();
    if run < 3 {
        return None;
    }
    Some((ch, run, trimmed[run..].trim()))
}

/// Find every fenced code block in `text`.
///
/// A block closes on a fence of the same character at least as long as the
/// opener. An unclosed block runs to the end of the text.
pub fn fenced_blocks(text: &str) -> Vec<FencedBlock> {
    let mut blocks = Vec::new();
    let mut open: Option<(char, usize, FencedBlock)> = None;

    for (idx, line) in text.lines().enumerate() {
        match open.take() {
            None => {
                if let Some((ch, run, info)) = fence_of(line) {
                    let block = FencedBlock {
                        start_line: idx + 1,
                        lang: info.split_whitespace().next().unwrap_or("").to_string(),
                        line_count: 0,
                        closed: false,
                    };
                    open = Some((ch, run, block));
                }
            }
            Some((ch, run, mut block)) => match fence_of(line) {
                Some((c, r, info)) if c == ch && r >= run && info.is_empty() => {
                    block.closed = true;
                    blocks.push(block);
                }
                _ => {
                    block.line_count += 1;
                    open = Some((ch, run, block));
                }
            },
        }
    }

    if let Some((_, _, block)) = open {
        blocks.push(block);
    }

    blocks
}

/// Replace every line inside (and including) fenced code with an empty line.
///
/// Line numbering is preserved so positions found in the masked text map back
/// to the original.
pub fn mask_fenced_code(text: &str) -> String {
    let mut out = Vec::new();
    let mut open: Option<(char, usize)> = None;

    for line in text.lines() {
        match open {
            None => {
                if let Some((ch, run, _)) = fence_of(line) {
                    open = Some((ch, run));
                    out.push("");
                } else {
                    out.push(line);
                }
            }
            Some((ch, run)) => {
                if let Some((c, r, info)) = fence_of(line) {
                    if c == ch && r >= run && info.is_empty() {
                        open = None;
                    }
                }
                out.push("");
            }
        }
    }

    out.join("\n")
}
