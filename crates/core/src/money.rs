use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Parse a locale-formatted price: dot thousands, comma decimal, optional
/// `$` sign. `"1.500,50"` is 1500.50.
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let s: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != '.' && !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(&s).ok()
}

/// Parse a plain number (`"52"`, `"0123"`, `"52.5"`); no locale handling.
pub fn parse_number(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s).ok()
}

/// Render a numeric sheet value in the sheet's own price notation so it
/// round-trips through [`parse_price`]: `1500.5` becomes `"1500,5"`.
pub fn price_text_from_f64(value: f64) -> String {
    match Decimal::from_f64(value) {
        Some(d) => d.normalize().to_string().replace('.', ","),
        None => String::new(),
    }
}

/// Peso amount without decimals, e.g. `"$ 1.500"`. Values that do not
/// parse are returned verbatim; blanks stay blank.
pub fn format_price(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }
    let Some(amount) = parse_price(raw) else {
        return raw.to_string();
    };
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}$ {}", group_thousands(&digits))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
