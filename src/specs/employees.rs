// src/specs/employees.rs
//
// USOS staff directory page: one `td.uwb-staffuser-panel` per employee, the
// name in `<b>`, the degree in the panel title link next to the name.

use crate::core::html::{attr_ci, element_end_ci, find_open_tag_ci, inner_html, opener, strip_tags, to_lower};
use crate::core::sanitize::normalize_ws;
use crate::roster::Employee;

const PANEL_CLASS: &str = "uwb-staffuser-panel";
const TITLE_CLASS: &str = "uwb-photo-panel-title";

fn has_class(open_tag: &str, class: &str) -> bool {
    attr_ci(open_tag, "class").is_some_and(|v| v.split_whitespace().any(|c| c == class))
}

/// Inner text of the first `<name>` in `block` whose opener passes `pick`.
fn first_text(block: &str, name: &str, pick: impl Fn(&str) -> bool) -> Option<String> {
    let lc = to_lower(block);
    let mut pos = 0;
    while let Some(start) = find_open_tag_ci(&lc, name, pos) {
        let end = element_end_ci(&lc, start, name);
        let el = &block[start..end];
        if pick(opener(el)) {
            return Some(strip_tags(inner_html(el, name)));
        }
        pos = start + 1;
    }
    None
}

/// Employees listed on one staff page, in page order.
pub fn parse_staff_page(html: &str) -> Vec<Employee> {
    let lc = to_lower(html);
    let mut out = Vec::new();
    let mut pos = 0;
    while let Some(start) = find_open_tag_ci(&lc, "td", pos) {
        pos = start + 1;
        let end = element_end_ci(&lc, start, "td");
        let panel = &html[start..end];
        if !has_class(opener(panel), PANEL_CLASS) {
            continue;
        }
        let Some(name) = first_text(panel, "b", |_| true) else { continue };
        let Some(title) = first_text(panel, "a", |open| has_class(open, TITLE_CLASS)) else {
            continue;
        };
        let degree = normalize_ws(&title.replace(&name, ""));
        if !name.is_empty() && !degree.is_empty() {
            out.push(Employee { degree, name });
        }
        pos = end.max(pos);
    }
    logd!("staff page: {} employees", out.len());
    out
}
