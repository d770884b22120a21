// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable rendering of a report record, used by debug mode and as the
// email body.

use tonerwatch_core::{FieldValue, Reading, ReportRecord};

const TONER: &[(&str, &str)] = &[
    ("C", "cyan_toner"),
    ("M", "magenta_toner"),
    ("Y", "yellow_toner"),
    ("K", "black_toner"),
];

const DRUM: &[(&str, &str)] = &[
    ("C", "cyan_drum"),
    ("M", "magenta_drum"),
    ("Y", "yellow_drum"),
    ("K", "black_drum"),
];

const MISC: &[(&str, &str)] = &[
    ("Cleaner", "cleaner"),
    ("Fuser", "fuser"),
    ("Waste", "waste"),
    ("Transfer", "transfer"),
];

/// Render a record as an indented tree. Fields the variant does not track
/// are left out; failed fields show their error.
pub fn render_status(record: &ReportRecord) -> String {
    let mut lines = vec![
        format!("########## Report for {} ##########", record.description),
        "[i] Printer overview".to_string(),
        item("Name", &text(record.reading("name"))),
        item("Model", &text(record.reading("model"))),
        item("Address", &record.address),
        item("Serial number", record.serial.as_deref().unwrap_or("-")),
        item("Client", &record.client),
        item("Description", &record.description),
        item("Variant", &record.variant),
        item("Status", &format!("{:?}", record.status).to_uppercase()),
        item("Captured", &record.timestamp.to_rfc3339()),
    ];

    let counters: Vec<String> = [("Mono", "print_mono"), ("Color", "print_color"), ("Total", "print_count")]
        .iter()
        .filter_map(|(title, field)| record.reading(field).map(|r| item(title, &counter(r))))
        .collect();
    section(&mut lines, "[i] Printer statistics", counters);

    section(&mut lines, "[i] Toner", supplies(record, TONER, true));
    section(&mut lines, "[i] Drum", supplies(record, DRUM, true));
    section(&mut lines, "[i] Misc", supplies(record, MISC, false));

    lines.join("\n")
}

fn section(lines: &mut Vec<String>, title: &str, items: Vec<String>) {
    if items.is_empty() {
        return;
    }
    lines.push(title.to_string());
    lines.extend(items);
}

fn item(name: &str, value: &str) -> String {
    format!(" |-- {name}: {value}")
}

fn supplies(record: &ReportRecord, rows: &[(&str, &str)], bracketed: bool) -> Vec<String> {
    rows.iter()
        .filter_map(|(tag, field)| {
            let reading = record.reading(field)?;
            let mut line = if bracketed {
                format!(" |-- [{tag}] {}", supply(reading))
            } else {
                format!(" |-- {tag} {}", supply(reading))
            };
            if let Some(label) = &reading.label {
                line.push_str(&format!(" ({label})"));
            }
            Some(line)
        })
        .collect()
}

fn text(reading: Option<&Reading>) -> String {
    match reading {
        Some(r) => display(r, |v| v.to_string()),
        None => "-".to_string(),
    }
}

fn counter(reading: &Reading) -> String {
    display(reading, |v| match v {
        FieldValue::Number(n) => group_thousands(*n),
        other => other.to_string(),
    })
}

fn supply(reading: &Reading) -> String {
    display(reading, |v| match v {
        FieldValue::Number(n) => format!("{n}%"),
        other => other.to_string(),
    })
}

fn display(reading: &Reading, fmt: impl Fn(&FieldValue) -> String) -> String {
    match (&reading.value, &reading.error) {
        (_, Some(err)) => format!("n/a ({err})"),
        (Some(value), None) => fmt(value),
        (None, None) => "-".to_string(),
    }
}

/// `1234567` -> `1,234,567`.
fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
