// src/core/html.rs
//
// Offset-preserving tag scanning. Every function that takes `lc` expects the
// output of `to_lower(s)` for the same `s`, so byte offsets line up.

use super::sanitize::{normalize_entities, normalize_ws};

pub fn to_lower(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii() {
                c.to_ascii_lowercase()
            } else {
                c
            }
        })
        .collect()
}

#[inline]
fn is_name_boundary(b: Option<&u8>) -> bool {
    matches!(b, None | Some(b' ' | b'\t' | b'\r' | b'\n' | b'>' | b'/'))
}

/// `rest` starts with `<name` (or `</name` when `closing`) on a name boundary.
/// `<th` never matches `<thead>`.
pub fn at_tag(rest: &str, name: &str, closing: bool) -> bool {
    let head = if closing { "</" } else { "<" };
    if !rest.starts_with(head) {
        return false;
    }
    let body = &rest[head.len()..];
    body.starts_with(name) && is_name_boundary(body.as_bytes().get(name.len()))
}

/// End of the tag opened at `at` (index just past its `>`), quote-aware so a
/// `>` inside an attribute value does not close the tag.
pub fn tag_close(s: &str, at: usize) -> usize {
    let b = s.as_bytes();
    let mut i = at + 1;
    let mut quote: Option<u8> = None;
    while i < b.len() {
        match (quote, b[i]) {
            (Some(q), c) if c == q => quote = None,
            (None, b'"') | (None, b'\'') => quote = Some(b[i]),
            (None, b'>') => return i + 1,
            _ => {}
        }
        i += 1;
    }
    b.len()
}

fn skip_comment(lc: &str, at: usize) -> usize {
    match lc[at + 4..].find("-->") {
        Some(rel) => at + 4 + rel + 3,
        None => lc.len(),
    }
}

/// Byte offset of the next `<name` opener at or after `from`.
pub fn find_open_tag_ci(lc: &str, name: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    while let Some(rel) = lc.get(pos..)?.find('<') {
        let at = pos + rel;
        if at_tag(&lc[at..], name, false) {
            return Some(at);
        }
        pos = at + 1;
    }
    None
}

fn implicit_stops(name: &str) -> &'static [(&'static str, bool)] {
    match name {
        "td" | "th" => &[
            ("td", false), ("th", false), ("tr", false), ("tr", true),
            ("tbody", true), ("thead", true), ("tfoot", true), ("table", true),
        ],
        "tr" => &[
            ("tr", false), ("tbody", true), ("thead", true), ("tfoot", true), ("table", true),
        ],
        _ => &[],
    }
}

/// Index just past the element opened at `start`.
///
/// Depth-aware for `name`; nested tables are skipped whole when scanning
/// anything but a table. Cells and rows with a missing close tag end where
/// the next sibling (or the enclosing row/table end) begins.
pub fn element_end_ci(lc: &str, start: usize, name: &str) -> usize {
    let n = lc.len();
    let mut pos = tag_close(lc, start);
    let mut depth = 1usize;
    let stops = implicit_stops(name);

    while let Some(rel) = lc.get(pos..).and_then(|r| r.find('<')) {
        let at = pos + rel;
        let rest = &lc[at..];

        if rest.starts_with("<!--") {
            pos = skip_comment(lc, at);
            continue;
        }
        if name != "table" && at_tag(rest, "table", false) {
            pos = element_end_ci(lc, at, "table");
            continue;
        }
        if at_tag(rest, name, true) {
            depth -= 1;
            let end = tag_close(lc, at);
            if depth == 0 {
                return end;
            }
            pos = end;
            continue;
        }
        if depth == 1 && stops.iter().any(|(t, closing)| at_tag(rest, t, *closing)) {
            return at;
        }
        if at_tag(rest, name, false) {
            depth += 1;
        }
        pos = at + 1;
    }
    n
}

/// Next `<name>…</name>` block at or after `from`, as `(start, end)`.
pub fn next_element_ci(lc: &str, name: &str, from: usize) -> Option<(usize, usize)> {
    let start = find_open_tag_ci(lc, name, from)?;
    Some((start, element_end_ci(lc, start, name)))
}

/// Elements named in `names` found between `from` and `to`, not descending
/// into them and not looking inside nested tables (unless `table` is asked for).
/// Returns `(start, end, name_index)`.
pub fn direct_children_ci(
    lc: &str,
    from: usize,
    to: usize,
    names: &[&str],
) -> Vec<(usize, usize, usize)> {
    let to = to.min(lc.len());
    let wants_tables = names.contains(&"table");
    let mut out = Vec::new();
    let mut pos = from;

    while pos < to {
        let Some(rel) = lc[pos..to].find('<') else { break };
        let at = pos + rel;
        let rest = &lc[at..to];

        if rest.starts_with("<!--") {
            pos = skip_comment(lc, at);
            continue;
        }
        if let Some(k) = names.iter().position(|nm| at_tag(rest, nm, false)) {
            let end = element_end_ci(lc, at, names[k]).min(to);
            out.push((at, end, k));
            pos = end.max(at + 1);
            continue;
        }
        if !wants_tables && at_tag(rest, "table", false) {
            pos = element_end_ci(lc, at, "table");
            continue;
        }
        pos = at + 1;
    }
    out
}

/// The opening tag of a block (`<td colspan=2>`), empty if malformed.
pub fn opener(block: &str) -> &str {
    if !block.starts_with('<') {
        return "";
    }
    &block[..tag_close(block, 0)]
}

/// Attribute value from an opening tag, case-insensitive on the name,
/// entity-decoded. Handles `a="x"`, `a='x'`, `a=x` and bare `a`.
pub fn attr_ci(open_tag: &str, name: &str) -> Option<String> {
    let b = open_tag.as_bytes();
    let n = b.len();
    let mut i = 1;
    // skip tag name
    while i < n && !b[i].is_ascii_whitespace() && b[i] != b'>' && b[i] != b'/' {
        i += 1;
    }
    while i < n {
        while i < n && (b[i].is_ascii_whitespace() || b[i] == b'/') {
            i += 1;
        }
        if i >= n || b[i] == b'>' {
            break;
        }
        let ks = i;
        while i < n && !b[i].is_ascii_whitespace() && b[i] != b'=' && b[i] != b'>' {
            i += 1;
        }
        let key = &open_tag[ks..i];
        while i < n && b[i].is_ascii_whitespace() {
            i += 1;
        }
        let mut value = None;
        if i < n && b[i] == b'=' {
            i += 1;
            while i < n && b[i].is_ascii_whitespace() {
                i += 1;
            }
            if i < n && (b[i] == b'"' || b[i] == b'\'') {
                let q = b[i];
                let vs = i + 1;
                i = vs;
                while i < n && b[i] != q {
                    i += 1;
                }
                value = Some(&open_tag[vs..i.min(n)]);
                i += 1;
            } else {
                let vs = i;
                while i < n && !b[i].is_ascii_whitespace() && b[i] != b'>' {
                    i += 1;
                }
                value = Some(&open_tag[vs..i]);
            }
        }
        if key.eq_ignore_ascii_case(name) {
            return Some(normalize_entities(value.unwrap_or("")));
        }
    }
    None
}

/// Inner HTML of an element block; tolerates a missing close tag.
pub fn inner_html<'a>(block: &'a str, name: &str) -> &'a str {
    if block.is_empty() {
        return block;
    }
    let start = tag_close(block, 0).min(block.len());
    let lc = to_lower(block);
    let close = join!("</", name);
    if let Some(ce) = lc.rfind(&close) {
        if ce >= start && !lc[ce + 1..].contains('<') {
            return &block[start..ce];
        }
    }
    &block[start..]
}

pub fn strip_tags<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();

    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&normalize_entities(&out))
}
