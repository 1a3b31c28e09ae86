// src/specs/groups.rs
//
// Faculty index page: links to the per-group timetables, either in the
// first `td valign=TOP` or, failing that, anywhere on the page. Pages that
// offer a `<select>` of groups instead are read from its options.

use crate::core::html::{attr_ci, element_end_ci, find_open_tag_ci, opener, strip_tags, tag_close, to_lower};

const SELECT_PROMPT: &str = "Wybierz";
const MIN_ID_LEN: usize = 3;

/// Group id from a timetable link: basename without query, fragment and
/// `.htm`/`.html` extension, inner whitespace as `_`.
fn id_from_href(href: &str) -> Option<String> {
    let base = href.rsplit('/').next()?;
    let base = base.split(['?', '#']).next()?;
    let lc = to_lower(base);
    let stem = if lc.ends_with(".html") {
        &base[..base.len() - 5]
    } else if lc.ends_with(".htm") {
        &base[..base.len() - 4]
    } else {
        return None;
    };
    let id = stem.split_whitespace().collect::<Vec<_>>().join("_");
    (id.chars().count() >= MIN_ID_LEN).then_some(id)
}

/// The first `<td>` with `valign=top`, or the whole page.
fn link_scope(html: &str) -> &str {
    let lc = to_lower(html);
    let mut pos = 0;
    while let Some(start) = find_open_tag_ci(&lc, "td", pos) {
        let end = element_end_ci(&lc, start, "td");
        let td = &html[start..end];
        if attr_ci(opener(td), "valign").is_some_and(|v| v.eq_ignore_ascii_case("top")) {
            return td;
        }
        pos = start + 1;
    }
    html
}

fn link_ids(scope: &str) -> Vec<String> {
    let lc = to_lower(scope);
    let mut out = Vec::new();
    let mut pos = 0;
    while let Some(start) = find_open_tag_ci(&lc, "a", pos) {
        pos = start + 1;
        if let Some(id) = attr_ci(opener(&scope[start..]), "href").as_deref().and_then(id_from_href) {
            push_unique!(out, id);
        }
    }
    out
}

fn option_ids(html: &str) -> Vec<String> {
    let lc = to_lower(html);
    let mut out = Vec::new();
    let mut pos = 0;
    // option text runs to the next tag; the close tag is optional
    while let Some(start) = find_open_tag_ci(&lc, "option", pos) {
        let from = tag_close(&lc, start);
        let to = lc[from..].find('<').map_or(lc.len(), |rel| from + rel);
        pos = to.max(start + 1);
        let text = strip_tags(&html[from..to]);
        let id = text.trim_end_matches('.').trim();
        if id.chars().count() >= MIN_ID_LEN && !id.contains(SELECT_PROMPT) {
            push_unique!(out, s!(id));
        }
    }
    out
}

/// Group ids named on a faculty index page, sorted.
pub fn parse_group_page(html: &str) -> Vec<String> {
    let mut ids = link_ids(link_scope(html));
    if ids.is_empty() {
        ids = option_ids(html);
    }
    ids.sort();
    logd!("group page: {} groups", ids.len());
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_in_top_cell_win() {
        let html = r#"<table><tr>
          <td><a href="Plany/IGNORED.htm">x</a></td>
          <TD VALIGN=TOP>
            <a href="Plany/WCY24IX1N2.htm">WCY24IX1N2</a><br>
            <a href="./WCY24IX1N1.HTML?v=2">WCY24IX1N1</a><br>
            <a href="Plany/WCY24IX1N1.htm#top">again</a>
            <a href="regulamin.pdf">pdf</a> <a href="X1.htm">short</a>
            <a href="Plany/WEL 24 EX.htm">spaced</a>
          </td>
          <td valign="top"><a href="Plany/LATER.htm">x</a></td>
        </tr></table>"#;
        assert_eq!(parse_group_page(html), vec!["WCY24IX1N1", "WCY24IX1N2", "WEL_24_EX"]);
    }

    #[test]
    fn plain_links_and_select_options() {
        let links = r#"<ul><li><a href="/plany/B2.htm">B2</a></li><li><a href='A11.htm'>A11</a></li></ul>"#;
        assert_eq!(parse_group_page(links), vec!["A11"]);

        let select = "<select><option>- Wybierz grupę -</option><option>WCY24KY2S1.</option>\
                      <option value=1> WCY24IY1S1 <option>WCY24KY2S1</select>";
        assert_eq!(parse_group_page(select), vec!["WCY24IY1S1", "WCY24KY2S1"]);

        assert!(parse_group_page("<p>nothing here</p>").is_empty());
    }
}
