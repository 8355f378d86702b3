//! Output file naming

use std::sync::OnceLock;

use regex::Regex;

const MAX_STEM_CHARS: usize = 50;

fn separators() -> &'static Regex {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    SEPARATORS.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"))
}

/// Derive a download-safe PDF file name from a checklist title
///
/// Lowercases the title, turns every run of characters outside `[a-z0-9]`
/// into one underscore, trims underscores at both ends and keeps at most 50
/// characters. A title with nothing left becomes `checklist`.
pub fn download_filename(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let replaced = separators().replace_all(&lowered, "_");
    let stem: String = replaced
        .trim_matches('_')
        .chars()
        .take(MAX_STEM_CHARS)
        .collect();

    if stem.is_empty() {
        "checklist.pdf".to_string()
    } else {
        format!("{}.pdf", stem)
    }
}
