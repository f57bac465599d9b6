//! Distribution of resolved caption texts into template lines.
//!
//! Blank lines and ordinary wildcards draw from a shared cursor in line
//! order. An indexed wildcard (`*_2`) reads the text at that position of the
//! full text sequence and leaves the cursor alone.

use super::{EngineError, EngineResult};

/// Substitution ceiling per line.
pub const MAX_SUBSTITUTIONS_PER_LINE: usize = 20;

/// Placeholder for a blank line with no text left to draw.
const BLANK_FALLBACK: &str = " ";

/// Index referenced by a `_<digit>` suffix directly after a marker.
fn indexed_reference(rest: &str) -> Option<usize> {
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some('_'), Some(digit)) if digit.is_ascii_digit() => {
            digit.to_digit(10).map(|d| d as usize)
        }
        _ => None,
    }
}

/// Fill every template line from `texts`, preserving line order.
pub fn distribute<S: AsRef<str>>(
    lines: &[S],
    texts: &[String],
    marker: &str,
) -> EngineResult<Vec<String>> {
    let mut cursor = texts.iter();

    lines
        .iter()
        .map(|line| {
            let line = line.as_ref();
            if line.is_empty() {
                Ok(cursor
                    .next()
                    .cloned()
                    .unwrap_or_else(|| BLANK_FALLBACK.to_string()))
            } else {
                fill_line(line, texts, &mut cursor, marker)
            }
        })
        .collect()
}

fn fill_line<'a>(
    line: &str,
    texts: &[String],
    cursor: &mut impl Iterator<Item = &'a String>,
    marker: &str,
) -> EngineResult<String> {
    let mut line = line.to_string();
    if marker.is_empty() {
        return Ok(line);
    }

    // Markers before `search_from` were left in place after the cursor ran dry.
    let mut search_from = 0;
    let mut exhausted = false;
    let mut substitutions = 0;

    while substitutions < MAX_SUBSTITUTIONS_PER_LINE {
        let Some(offset) = line[search_from..].find(marker) else {
            break;
        };
        let start = search_from + offset;
        let end = start + marker.len();

        if let Some(index) = indexed_reference(&line[end..]) {
            let text = texts.get(index).ok_or(EngineError::IndexOutOfRange {
                index,
                available: texts.len(),
            })?;
            // `_` and the digit are both single-byte.
            line.replace_range(start..end + 2, text);
            substitutions += 1;
            continue;
        }

        if exhausted {
            search_from = end;
            continue;
        }

        match cursor.next() {
            Some(text) => {
                line.replace_range(start..end, text);
                substitutions += 1;
            }
            None => {
                exhausted = true;
                search_from = end;
            }
        }
    }

    Ok(line)
}
