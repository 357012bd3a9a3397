//! Character-offset helpers shared by the renderers and the locator
//!
//! Every offset pegview exchanges with callers counts Unicode scalar values
//! (chars), never bytes. Editor surfaces address text by character, and the
//! engine's trace offsets do the same.

/// Escape control characters so a matched substring fits on one output line.
///
/// `\n` and `\t` become the two-character sequences `\n` and `\t`. A `\r\n`
/// pair collapses to a single `\n`, and a lone `\r` is shown as `\n` too.
pub fn escape_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => {
                if chars.peek() != Some(&'\n') {
                    out.push_str("\\n");
                }
            }
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

/// Substring between two char offsets, clamped to the text.
pub fn char_slice(chars: &[char], start: usize, end: usize) -> String {
    let end = end.min(chars.len());
    let start = start.min(end);
    chars[start..end].iter().collect()
}

/// Number of chars in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Convert a byte index inside `text` to a char offset.
pub fn byte_to_char_offset(text: &str, byte: usize) -> usize {
    text[..byte.min(text.len())].chars().count()
}

/// Convert a 1-based line/column pair to a 0-based char offset.
///
/// Lines are found by counting `\n` characters. A line past the end of the
/// text lands on the text length, and the result is clamped to
/// `[0, char_len(text)]`. Zero line or column values are read as 1.
pub fn line_col_to_offset(text: &str, line: usize, column: usize) -> usize {
    let len = char_len(text);
    let target_line = line.max(1);

    let mut line_start = 0;
    if target_line > 1 {
        let mut seen = 0;
        line_start = len;
        for (i, c) in text.chars().enumerate() {
            if c == '\n' {
                seen += 1;
                if seen == target_line - 1 {
                    line_start = i + 1;
                    break;
                }
            }
        }
    }

    (line_start + column.max(1) - 1).min(len)
}

/// Convert a char offset to a 1-based `(line, column)` pair.
pub fn offset_to_line_col(text: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for c in text.chars().take(offset) {
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

/// Text of the 1-based `line`, without its terminator.
pub fn line_text(text: &str, line: usize) -> &str {
    text.split('\n')
        .nth(line.saturating_sub(1))
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or("")
}
