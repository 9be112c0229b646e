//! Text Formatting
//!
//! Rupiah amounts are written with comma-grouped thousands and no
//! decimals (`Rp 250,000,000`). Names are normalized the way the catalog
//! keys them.

use rust_decimal::{Decimal, RoundingStrategy};

/// Insert `,` every three digits from the right
pub fn group_digits(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped}")
}

/// Whole rupiah, grouped
pub fn rupiah(amount: u64) -> String {
    format!("Rp {}", group_digits(&amount.to_string()))
}

/// Decimal rupiah rounded to the nearest unit (ties to even), grouped
pub fn rupiah_rounded(amount: Decimal) -> String {
    let whole = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    format!("Rp {}", group_digits(&whole.trunc().to_string()))
}

/// First character upper-case, the rest lower-case (`AVANZA` -> `Avanza`)
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

/// Capitalize each space-separated word (`jakarta` -> `Jakarta`)
pub fn title_case(text: &str) -> String {
    text.split(' ').map(capitalize).collect::<Vec<_>>().join(" ")
}
