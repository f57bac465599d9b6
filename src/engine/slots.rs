//! Slot counting for caption templates

use regex::Regex;

/// Compile a marker into a pattern that matches it literally.
pub fn literal_pattern(marker: &str) -> Result<Regex, regex::Error> {
    Regex::new(&regex::escape(marker))
}

/// Number of caption texts a template needs.
///
/// A blank line is one slot; any other line contributes one slot per
/// non-overlapping occurrence of the template marker.
pub fn count_slots<S: AsRef<str>>(lines: &[S], marker: &Regex) -> usize {
    lines
        .iter()
        .map(|line| {
            let line = line.as_ref();
            if line.is_empty() {
                1
            } else {
                marker.find_iter(line).count()
            }
        })
        .sum()
}
