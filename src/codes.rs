//! Department code generation and the small naming helpers the console shows.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Derives a department code of the form `DDMM_LETTERS`.
///
/// `DD` and `MM` are the zero-padded day and month of `start_date`, and
/// `LETTERS` is the upper-cased ASCII letters of the first word of `name`.
/// Returns an empty string when either input is empty or the date cannot be
/// read. A name made only of spaces is not empty and yields e.g. `"0302_"`.
///
/// ```
/// use attendease_store::codes::generate_department_code;
///
/// assert_eq!(generate_department_code("MERN Stack", "2026-02-03"), "0302_MERN");
/// ```
pub fn generate_department_code(name: &str, start_date: &str) -> String {
    if name.is_empty() || start_date.is_empty() {
        return String::new();
    }
    match parse_start_date(start_date) {
        Some(date) => department_code(name, date),
        None => String::new(),
    }
}

/// Same as [`generate_department_code`] for an already parsed date.
pub fn department_code(name: &str, date: NaiveDate) -> String {
    let letters: String = name
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_uppercase()
        .chars()
        .filter(char::is_ascii_uppercase)
        .collect();
    format!("{:02}{:02}_{}", date.day(), date.month(), letters)
}

/// Accepts `YYYY-MM-DD`, optionally followed by a `T`/space separated time.
fn parse_start_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S"))
                .ok()
                .map(|dt| dt.date())
        })
}

/// Display and comparison form of a subject or department code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase()
}

/// Avatar initials: the first letter of the first two words, or the first
/// two characters of a single-word name.
pub fn initials(name: &str) -> String {
    let words: Vec<&str> = name.split(' ').filter(|w| !w.is_empty()).collect();
    let picked: String = if words.len() >= 2 {
        words[..2].iter().filter_map(|w| w.chars().next()).collect()
    } else {
        name.trim().chars().take(2).collect()
    };
    picked.to_uppercase()
}
