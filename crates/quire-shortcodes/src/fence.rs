//! Code fence tracking.
//!
//! Shortcode tags inside fenced code blocks are literal text. The expander asks
//! for the byte ranges of all fenced blocks up front and never looks for tags
//! inside them.

use std::ops::Range;

/// Open-fence state while scanning lines.
///
/// A fence is three or more backticks or tildes; it closes on a run of the
/// same character that is no shorter.
#[derive(Debug, Default)]
struct FenceTracker {
    fence_char: Option<char>,
    fence_len: usize,
}

impl FenceTracker {
    fn in_fence(&self) -> bool {
        self.fence_char.is_some()
    }

    /// Feed one line; `true` when it opened or closed a fence.
    fn update(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();

        if let Some(fence_char) = self.fence_char {
            if is_closing_fence(trimmed, fence_char, self.fence_len) {
                self.fence_char = None;
                self.fence_len = 0;
                return true;
            }
            false
        } else if let Some((ch, len)) = detect_fence(trimmed) {
            self.fence_char = Some(ch);
            self.fence_len = len;
            true
        } else {
            false
        }
    }
}

/// Byte ranges of every fenced code block in `text`, fence lines included.
///
/// An unclosed fence runs to the end of the text, as in `CommonMark`.
pub(crate) fn code_regions(text: &str) -> Vec<Range<usize>> {
    let mut regions = Vec::new();
    let mut tracker = FenceTracker::default();
    let mut start = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let line_end = offset + line.len();
        if tracker.update(line) {
            if tracker.in_fence() {
                start = Some(offset);
            } else if let Some(s) = start.take() {
                regions.push(s..line_end);
            }
        }
        offset = line_end;
    }

    if let Some(s) = start {
        regions.push(s..text.len());
    }

    regions
}

/// Region containing `offset`, if any.
pub(crate) fn region_at(regions: &[Range<usize>], offset: usize) -> Option<&Range<usize>> {
    regions.iter().find(|region| region.contains(&offset))
}

/// Fence character and run length of an opening fence line.
fn detect_fence(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = trimmed.chars().take_while(|&c| c == first).count();
    (count >= 3).then_some((first, count))
}

/// A closing fence carries nothing but whitespace after the run.
fn is_closing_fence(trimmed: &str, expected_char: char, min_len: usize) -> bool {
    if !trimmed.starts_with(expected_char) {
        return false;
    }

    let count = trimmed.chars().take_while(|&c| c == expected_char).count();
    count >= min_len && trimmed[count..].chars().all(char::is_whitespace)
}
