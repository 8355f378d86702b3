//! LaTeX text escaping
//!
//! Every piece of user text goes through [`escape_text`] before it reaches
//! the markup. The output is plain text in LaTeX's eyes: no combination of
//! input characters can open a group, start a command, switch to math mode,
//! comment out the rest of a line, or end a paragraph.

/// Reserved characters and their escaped form
pub const RESERVED: &[(char, &str)] = &[
    ('\\', "\\textbackslash{}"),
    ('{', "\\{"),
    ('}', "\\}"),
    ('#', "\\#"),
    ('$', "\\$"),
    ('%', "\\%"),
    ('&', "\\&"),
    ('_', "\\_"),
    ('^', "\\textasciicircum{}"),
    ('~', "\\textasciitilde{}"),
];

/// ASCII characters the default font encoding would typeset as other glyphs
const SYMBOLS: &[(char, &str)] = &[
    ('<', "\\textless{}"),
    ('>', "\\textgreater{}"),
    ('|', "\\textbar{}"),
];

/// Adjacent pairs the TeX font mapping would merge into a single glyph
/// (dashes, curly quotes, low quotes, inverted punctuation)
const LIGATURES: &[(char, char)] = &[
    ('-', '-'),
    ('`', '`'),
    ('\'', '\''),
    (',', ','),
    ('!', '`'),
    ('?', '`'),
];

/// Escape user text for insertion into LaTeX markup
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    push_escaped(&mut out, text);
    out
}

/// Append `text` to `out`, escaped
pub(crate) fn push_escaped(out: &mut String, text: &str) {
    let mut previous = None;
    for ch in text.chars() {
        if ch.is_control() && !matches!(ch, '\n' | '\r' | '\t') {
            continue;
        }
        if let Some(prev) = previous {
            if LIGATURES.contains(&(prev, ch)) {
                out.push_str("{}");
            }
        }
        previous = Some(ch);

        if let Some(escaped) = lookup(RESERVED, ch).or_else(|| lookup(SYMBOLS, ch)) {
            out.push_str(escaped);
            continue;
        }
        match ch {
            // A blank line inside a command argument ends the paragraph
            '\n' | '\r' | '\t' => out.push(' '),
            c => out.push(c),
        }
    }
}

fn lookup(table: &[(char, &'static str)], ch: char) -> Option<&'static str> {
    table
        .iter()
        .find(|(reserved, _)| *reserved == ch)
        .map(|(_, escaped)| *escaped)
}
