//! URL encoding for the image API.
//!
//! The image API reserves `_`, `-` and a handful of URL-structural
//! characters, and defines its own escape sequences for them.
//!
//! The escape vocabulary has no form for `.`, so a caption line that is
//! exactly `.` or `..` becomes a dot segment, and URL path normalisation
//! collapses it: `["..", "x"]` under `cmm` yields `/images/x.png`, dropping
//! the image id. Callers that accept free-form caption text should keep such
//! lines out of the pool.

use url::Url;

use crate::template::Template;

/// Escape table, applied in order on the already-substituted string.
const ESCAPES: [(&str, &str); 11] = [
    ("_", "__"),
    ("-", "--"),
    (" ", "_"),
    ("\n", "~n"),
    ("?", "~q"),
    ("&", "~a"),
    ("%", "~p"),
    ("#", "~h"),
    ("/", "~s"),
    ("\\", "~b"),
    ("\"", "''"),
];

/// Escape a caption line into the image API's path vocabulary.
pub fn sanitize_for_url(input: &str) -> String {
    ESCAPES
        .iter()
        .fold(input.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Length of the lines joined with `/`, in characters.
pub fn joined_length<S: AsRef<str>>(lines: &[S]) -> usize {
    let text: usize = lines.iter().map(|l| l.as_ref().chars().count()).sum();
    text + lines.len().saturating_sub(1)
}

/// Build `<api>/images/<id>/<line>/.../<line>.png[?background=<image>]`.
///
/// The background address is passed through untouched.
pub fn build_image_url<S: AsRef<str>>(api_url: &Url, lines: &[S], template: &Template) -> String {
    let slug: String = lines
        .iter()
        .map(|line| format!("/{}", sanitize_for_url(line.as_ref())))
        .collect();

    let mut url = api_url.clone();
    url.set_path(&format!("images/{}{}.png", template.image_id(), slug));

    let background = template.custom_image().map(|image| format!("background={}", image));
    url.set_query(background.as_deref());
    url.set_fragment(None);

    url.to_string()
}
