// src/core/sanitize.rs

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Decode a single entity body (the part between `&` and `;`).
pub fn decode_entity(body: &str) -> Option<char> {
    if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return match char::from_u32(code)? {
            '\u{a0}' => Some(' '),
            c => Some(c),
        };
    }
    match body {
        "nbsp" | "ensp" | "emsp" | "thinsp" => Some(' '),
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "ndash" => Some('–'),
        "mdash" => Some('—'),
        "bull" => Some('•'),
        "oacute" => Some('ó'),
        "Oacute" => Some('Ó'),
        "aogon" => Some('ą'),
        "Aogon" => Some('Ą'),
        "cacute" => Some('ć'),
        "Cacute" => Some('Ć'),
        "eogon" => Some('ę'),
        "Eogon" => Some('Ę'),
        "lstrok" => Some('ł'),
        "Lstrok" => Some('Ł'),
        "nacute" => Some('ń'),
        "Nacute" => Some('Ń'),
        "sacute" => Some('ś'),
        "Sacute" => Some('Ś'),
        "zacute" => Some('ź'),
        "Zacute" => Some('Ź'),
        "zdot" => Some('ż'),
        "Zdot" => Some('Ż'),
        _ => None,
    }
}

pub fn normalize_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.replace('\u{a0}', " ");
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let decoded = tail
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&tail[..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out.replace('\u{a0}', " ")
}

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Drop combining marks after NFD; `ł`/`Ł` have no decomposition and are folded by hand.
pub fn strip_diacritics(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            'ł' => 'l',
            'Ł' => 'L',
            c => c,
        })
        .collect()
}

/// Lowercase ASCII-letter key used by the lecturer matchers.
pub fn fold_key(s: &str) -> String {
    strip_diacritics(s)
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Replace characters that are not allowed in file names.
pub fn sanitize_group_filename(group: &str) -> String {
    let out: String = group
        .trim()
        .chars()
        .map(|ch| match ch {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if out.is_empty() { s!("_") } else { out }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entities_named_and_numeric() {
        assert_eq!(normalize_entities("A&nbsp;&amp;&#66;&#x43;"), "A &BC");
        assert_eq!(normalize_entities("R&D; x & y"), "R&D; x & y");
    }

    #[test]
    fn polish_named_entities() {
        assert_eq!(normalize_entities("&sacute;r."), "śr.");
        assert_eq!(normalize_entities("&Lstrok;ukasz &Zdot;&oacute;&lstrok;&cacute;"), "Łukasz Żółć");
        assert_eq!(normalize_entities("pi&aogon;tek &eogon; &nacute; &zacute; &Sacute;"), "piątek ę ń ź Ś");
        assert_eq!(normalize_entities("&bogus;"), "&bogus;");
    }

    #[test]
    fn diacritics_fold_to_ascii() {
        assert_eq!(strip_diacritics("Łukasz Żółć"), "Lukasz Zolc");
        assert_eq!(fold_key("Śl-ą 1"), "sla");
    }

    #[test]
    fn group_filenames() {
        assert_eq!(sanitize_group_filename("WCY23IY1S1"), "WCY23IY1S1");
        assert_eq!(sanitize_group_filename("a/b:c*?"), "a_b_c__");
    }
}
