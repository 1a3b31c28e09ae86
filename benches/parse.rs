// benches/parse.rs
use criterion::{criterion_group, criterion_main, Criterion, black_box};

use watcal::{
    config::layout::FacultyLayout,
    lessons::{parse_document, ParseContext},
    roster::{build_employee_index, Employee},
    specs::dates::YearRule,
};

const DAYS: &[&str] = &["pon.", "wt.", "śr.", "czw.", "pt."];
const BLOCKS: &[&str] = &["1-2", "3-4", "5-6", "7-8", "9-10", "11-12", "13-14"];
const SUBJECTS: &[(&str, &str, &str)] = &[
    ("ALG", "Algebra liniowa", "JKw"),
    ("ANM", "Analiza matematyczna", "Nw"),
    ("FIZ", "Fizyka", "Trzc"),
    ("PRG", "Podstawy programowania", "Lis"),
];

/// A semester-sized positional page: 5 days x 7 blocks x 15 weeks.
fn generated_page() -> String {
    let weeks = 15;
    let mut html = String::from("<html><body><p>Rozkład zajęć 2024/2025</p><table>");
    for (d, day) in DAYS.iter().enumerate() {
        html.push_str(&format!("<tr><td>{day}</td><td></td>"));
        for w in 0..weeks {
            let date = 3 + d + 7 * (w % 4);
            html.push_str(&format!("<td>{date:02} {}</td>", ["III", "IV", "V", "VI"][w / 4]));
        }
        html.push_str("</tr>");
        for (b, block) in BLOCKS.iter().enumerate() {
            html.push_str(&format!("<tr><td>{day}</td><td>{block}</td>"));
            for w in 0..weeks {
                if (d + b + w) % 3 == 0 {
                    html.push_str("<td></td>");
                    continue;
                }
                let (abbr, _, code) = SUBJECTS[(d + b + w) % SUBJECTS.len()];
                let kind = ["(w)", "ć", "L"][(b + w) % 3];
                html.push_str(&format!("<td>{abbr}<br>{kind}<br>1{b}{w:02}<br>{code}</td>"));
            }
            html.push_str("</tr>");
        }
    }
    html.push_str("</table><table>");
    for (abbr, full, _) in SUBJECTS {
        html.push_str(&format!("<tr><td>{abbr}</td><td>{full}</td></tr>"));
    }
    html.push_str("<tr><td>Nw</td><td>dr Adam Nowak</td></tr></table></body></html>");
    html
}

fn bench_parse(c: &mut Criterion) {
    let doc = generated_page();
    let roster = vec![
        Employee { degree: "dr".into(), name: "Jan Kowalski".into() },
        Employee { degree: "dr".into(), name: "Adam Nowak".into() },
        Employee { degree: "dr inż.".into(), name: "Piotr Trzciński".into() },
        Employee { degree: "mgr".into(), name: "Ewa Lis".into() },
    ];
    let index = build_employee_index(&roster);
    let layout = FacultyLayout::wtc();
    let ctx = ParseContext::new(&layout, &index, YearRule::Academic(2024));

    c.bench_function("parse_document_semester", |b| {
        b.iter(|| {
            let lessons = parse_document(Some(black_box(&doc)), &ctx);
            black_box(lessons.len())
        })
    });

    c.bench_function("build_employee_index", |b| {
        b.iter(|| black_box(build_employee_index(black_box(&roster))).variants.len())
    });
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
