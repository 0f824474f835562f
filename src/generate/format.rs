//! Derived values: currency strings, day counts in words, conditional labels.

/// Format an amount as Brazilian currency digits: `.` for thousands, `,` for
/// decimals, always two decimal places.
///
/// ```
/// use docfill::generate::format_currency;
///
/// assert_eq!(format_currency(1000.5), "1.000,50");
/// assert_eq!(format_currency(0.0), "0,00");
/// ```
pub fn format_currency(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    // -0.001 rounds to "0.00" and must not print a sign
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{},{}", sign, grouped, dec_part)
}

const DAY_WORDS: [&str; 32] = [
    "zero",
    "um",
    "dois",
    "três",
    "quatro",
    "cinco",
    "seis",
    "sete",
    "oito",
    "nove",
    "dez",
    "onze",
    "doze",
    "treze",
    "quatorze",
    "quinze",
    "dezesseis",
    "dezessete",
    "dezoito",
    "dezenove",
    "vinte",
    "vinte e um",
    "vinte e dois",
    "vinte e três",
    "vinte e quatro",
    "vinte e cinco",
    "vinte e seis",
    "vinte e sete",
    "vinte e oito",
    "vinte e nove",
    "trinta",
    "trinta e um",
];

/// Spell out a day count in Portuguese.
///
/// Covers 0 through 31; any other value is returned as its numeral.
pub fn days_to_words(days: i64) -> String {
    usize::try_from(days)
        .ok()
        .and_then(|i| DAY_WORDS.get(i))
        .map(|w| w.to_string())
        .unwrap_or_else(|| days.to_string())
}

/// The diagnosis-code label, present only when a code was supplied.
pub fn cid_label(code: &str) -> String {
    let code = code.trim();
    if code.is_empty() {
        String::new()
    } else {
        format!("CID: {}", code)
    }
}

/// The image-use discount clause, present only for a positive discount.
pub fn image_discount_clause(discount: f64) -> String {
    if discount > 0.0 {
        format!("Desconto de imagem: R$ {}.", format_currency(discount))
    } else {
        String::new()
    }
}

/// Render a medication list as numbered lines (`1. A\n2. B\n`).
pub fn numbered_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}\n", i + 1, item.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1000.0), "1.000,00");
        assert_eq!(format_currency(0.0), "0,00");
        assert_eq!(format_currency(1234567.89), "1.234.567,89");
        assert_eq!(format_currency(1000.5), "1.000,50");
        assert_eq!(format_currency(999.999), "1.000,00");
        assert_eq!(format_currency(12.3), "12,30");
        assert_eq!(format_currency(100.0), "100,00");
    }

    #[test]
    fn test_format_currency_negative() {
        assert_eq!(format_currency(-1500.0), "-1.500,00");
        assert_eq!(format_currency(-0.001), "0,00");
    }

    #[test]
    fn test_format_currency_is_pure() {
        for value in [0.0, 1.5, 2500.75, 1_000_000.0] {
            assert_eq!(format_currency(value), format_currency(value));
        }
    }

    #[test]
    fn test_days_to_words_covers_month() {
        for day in 0..=31 {
            let words = days_to_words(day);
            assert!(!words.is_empty());
            assert!(!words.chars().any(|c| c.is_ascii_digit()), "{}", words);
        }
        assert_eq!(days_to_words(7), "sete");
        assert_eq!(days_to_words(21), "vinte e um");
        assert_eq!(days_to_words(31), "trinta e um");
    }

    #[test]
    fn test_days_to_words_out_of_range() {
        assert_eq!(days_to_words(32), "32");
        assert_eq!(days_to_words(100), "100");
        assert_eq!(days_to_words(-1), "-1");
    }

    #[test]
    fn test_conditional_labels() {
        assert_eq!(cid_label(""), "");
        assert_eq!(cid_label("  "), "");
        assert_eq!(cid_label("M54.5"), "CID: M54.5");

        assert_eq!(image_discount_clause(0.0), "");
        assert_eq!(image_discount_clause(-10.0), "");
        assert_eq!(
            image_discount_clause(250.0),
            "Desconto de imagem: R$ 250,00."
        );
    }

    #[test]
    fn test_numbered_list() {
        assert_eq!(numbered_list::<&str>(&[]), "");
        assert_eq!(
            numbered_list(&["Dipirona 500mg", "Arnica gel"]),
            "1. Dipirona 500mg\n2. Arnica gel\n"
        );
    }
}
