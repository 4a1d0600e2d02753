// Utility helpers for field splitting, numeric cleanup and display formatting.
//
// Everything that deals with the "dirty" text of the export lives here so the
// loader can stay a straight pipeline and the rest of the code can assume
// clean, typed values.
use clap::ValueEnum;
use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use regex::Regex;

const BOM: char = '\u{feff}';

static SENTINEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(-|na|n/a|nan|null|undefined)$").unwrap());

static LEADING_FLOAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").unwrap());

/// Drops a byte-order mark at the very start of the text, if any.
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix(BOM).unwrap_or(text)
}

/// Split a line on `;`, ignoring semicolons inside a double-quoted span.
///
/// A semicolon counts as a separator only when an even number of `"` precede
/// it on the line.
pub fn split_fields(line: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                fields.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    fields.push(&line[start..]);
    fields
}

/// Remove one leading and one trailing `"` (when present), then trim.
pub fn strip_quotes(field: &str) -> String {
    let s = field.strip_prefix('"').unwrap_or(field);
    let s = s.strip_suffix('"').unwrap_or(s);
    s.trim().to_string()
}

/// True for the placeholder tokens exports use for "no value".
pub fn is_sentinel(s: &str) -> bool {
    SENTINEL.is_match(s)
}

/// Turn the raw diff column into a dot-decimal string ready for parsing.
///
/// - empty or sentinel values become `"0"`,
/// - `R$` and all whitespace are removed,
/// - with both `.` and `,` present, `.` is thousands and `,` is decimal,
/// - with only `,` present, it is the decimal separator.
pub fn normalize_diff_text(raw: &str) -> String {
    let trimmed = raw.trim();
    let s = if trimmed.is_empty() || is_sentinel(trimmed) {
        "0"
    } else {
        trimmed
    };
    let s: String = s.replace("R$", "").chars().filter(|c| !c.is_whitespace()).collect();
    match (s.contains('.'), s.contains(',')) {
        (true, true) => s.replace('.', "").replace(',', "."),
        (false, true) => s.replace(',', "."),
        _ => s,
    }
}

/// Parse the longest leading decimal number in `s`, ignoring trailing junk.
///
/// Returns `None` when there is no numeric prefix or the value is not finite.
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let m = LEADING_FLOAT.find(s)?;
    m.as_str().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Display convention for numbers and money. Only affects presentation; the
/// parsed values are always plain `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DisplayLocale {
    /// `1,234.56`
    En,
    /// `1.234,56`
    #[default]
    #[value(name = "pt-br")]
    PtBr,
}

impl DisplayLocale {
    fn grouping(self) -> Locale {
        match self {
            DisplayLocale::En => Locale::en,
            // Same grouping as pt-BR: `.` between thousands.
            DisplayLocale::PtBr => Locale::de,
        }
    }

    fn decimal_mark(self) -> char {
        match self {
            DisplayLocale::En => '.',
            DisplayLocale::PtBr => ',',
        }
    }
}

pub fn format_number(n: f64, decimals: usize, locale: DisplayLocale) -> String {
    // Fixed decimals first (`1234567.89`), then group the integer part.
    let s = format!("{:.*}", decimals, n.abs());
    let neg = n < 0.0 && s.bytes().any(|b| (b'1'..=b'9').contains(&b));
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };
    let mut res = group_digits(int_part, locale);
    if let Some(frac) = frac_part {
        res.push(locale.decimal_mark());
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

// `format!("{:.N}")` of a finite f64 can carry up to 309 integer digits,
// beyond u128; those are grouped by hand with the same separator.
fn group_digits(digits: &str, locale: DisplayLocale) -> String {
    let grouping = locale.grouping();
    if let Ok(v) = digits.parse::<u128>() {
        return v.to_formatted_string(&grouping);
    }
    let sep = grouping.separator();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * sep.len());
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(sep);
        }
        out.push(c);
    }
    out
}

/// Money with the `R$` marker the exports use.
pub fn format_currency(n: f64, locale: DisplayLocale) -> String {
    format!("R$ {}", format_number(n, 2, locale))
}

pub fn format_int(n: usize, locale: DisplayLocale) -> String {
    n.to_formatted_string(&locale.grouping())
}
