// src/core/vischars.rs
// Visible-text character iterator over an HTML fragment.
// Skips tags (<...>), comments and script/style bodies, decodes entities.
//
// Flow::Inline  every tag and whitespace run becomes one ' ' (document text)
// Flow::Lines   every tag becomes '\n', inner spacing is kept (cell lines, legend lines)

use super::sanitize::decode_entity;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Inline,
    Lines,
}

pub struct VisChars<'a> {
    s: &'a str,
    b: &'a [u8],
    i: usize,
    n: usize,
    flow: Flow,
    last_space: bool,
}

impl<'a> VisChars<'a> {
    pub fn new(s: &'a str, flow: Flow) -> Self {
        Self { s, b: s.as_bytes(), i: 0, n: s.len(), flow, last_space: true }
    }

    #[inline]
    fn skip_tag(&mut self) {
        // called when current byte is '<'
        let raw_start = self.i + 1;
        if self.s[self.i..].starts_with("<!--") {
            self.i = match self.s[self.i + 4..].find("-->") {
                Some(rel) => self.i + 4 + rel + 3,
                None => self.n,
            };
            return;
        }
        self.i += 1;
        let mut in_s = false; // '
        let mut in_d = false; // "
        while self.i < self.n {
            match self.b[self.i] {
                b'\'' if !in_d => in_s = !in_s,
                b'"'  if !in_s => in_d = !in_d,
                b'>' if !in_s && !in_d => { self.i += 1; break; }
                _ => {}
            }
            self.i += 1;
        }
        // raw-text elements: jump over their bodies
        let name: String = self.s[raw_start..self.i]
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if name == "script" || name == "style" {
            let close = format!("</{name}");
            let lc_rest = self.s[self.i..].to_ascii_lowercase();
            self.i = match lc_rest.find(&close) {
                Some(rel) => self.i + rel,
                None => self.n,
            };
        }
    }

    #[inline]
    fn entity(&mut self) -> char {
        // called when current byte is '&'
        let tail = &self.s[self.i + 1..];
        if let Some(semi) = tail.find(';').filter(|&k| k <= 10) {
            if let Some(c) = decode_entity(&tail[..semi]) {
                self.i += semi + 2;
                return c;
            }
        }
        self.i += 1;
        '&'
    }

    #[inline]
    fn next_char(&mut self) -> Option<char> {
        let ch = self.s[self.i..].chars().next()?;
        self.i += ch.len_utf8();
        Some(ch)
    }

    fn raw_next(&mut self) -> Option<char> {
        while self.i < self.n {
            match self.b[self.i] {
                b'<' => {
                    self.skip_tag();
                    return Some(match self.flow { Flow::Inline => ' ', Flow::Lines => '\n' });
                }
                b'&' => return Some(self.entity()),
                b'\r' => { self.i += 1; continue; }
                _ => return self.next_char(),
            }
        }
        None
    }
}

impl<'a> Iterator for VisChars<'a> {
    type Item = char;
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let ch = self.raw_next()?;
            match self.flow {
                Flow::Lines => return Some(if ch == '\u{a0}' { ' ' } else { ch }),
                Flow::Inline => {
                    if ch.is_whitespace() {
                        // collapse runs to a single space
                        if self.last_space { continue; }
                        self.last_space = true;
                        return Some(' ');
                    }
                    self.last_space = false;
                    return Some(ch);
                }
            }
        }
    }
}

/// Whole fragment as one whitespace-normalized line.
pub fn visible_text(html: &str) -> String {
    let s: String = VisChars::new(html, Flow::Inline).collect();
    s.trim_end().to_string()
}

/// Text nodes as trimmed, non-empty lines (inner double spaces preserved).
pub fn visible_lines(html: &str) -> Vec<String> {
    let s: String = VisChars::new(html, Flow::Lines).collect();
    s.split('\n')
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_collapses_tags_and_space() {
        let html = "<p>Plan  <b>zajęć</b></p>\n<p>2024/2025</p>";
        assert_eq!(visible_text(html), "Plan zajęć 2024/2025");
    }

    #[test]
    fn lines_split_on_tags_and_keep_inner_spacing() {
        let html = "<td>ALG<br>(w)<br/>105</td><p>ALG&nbsp;&nbsp;Algebra liniowa</p>";
        assert_eq!(visible_lines(html), vec!["ALG", "(w)", "105", "ALG  Algebra liniowa"]);
    }

    #[test]
    fn script_and_comments_are_invisible() {
        let html = "<script>var a = '<td>';</script><!-- 1-2 -->x";
        assert_eq!(visible_lines(html), vec!["x"]);
    }
}
