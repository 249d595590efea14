//! Currency table and locale-aware price formatting.
//!
//! Prices travel as JSON numbers. Sums are taken in integer cents (see
//! [`to_cents`]) so repeated additions do not drift.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    JPY,
    CAD,
    AUD,
    CHF,
    CNY,
    INR,
    MXN,
}

impl Currency {
    /// Get the currency code (e.g., "USD").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::CHF => "CHF",
            Currency::CNY => "CNY",
            Currency::INR => "INR",
            Currency::MXN => "MXN",
        }
    }

    /// Get the currency symbol (e.g., "$").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::JPY => "\u{00a5}",
            Currency::CAD => "CA$",
            Currency::AUD => "A$",
            Currency::CHF => "CHF",
            Currency::CNY => "CN\u{00a5}",
            Currency::INR => "\u{20b9}",
            Currency::MXN => "MX$",
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "JPY" => Some(Currency::JPY),
            "CAD" => Some(Currency::CAD),
            "AUD" => Some(Currency::AUD),
            "CHF" => Some(Currency::CHF),
            "CNY" => Some(Currency::CNY),
            "INR" => Some(Currency::INR),
            "MXN" => Some(Currency::MXN),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Symbol used by the fallback path; only the three launch currencies
/// have one, anything else prints a dollar sign.
fn fallback_symbol(code: &str) -> &'static str {
    match code.to_uppercase().as_str() {
        "EUR" => "\u{20ac}",
        "GBP" => "\u{00a3}",
        _ => "$",
    }
}

/// Where the symbol goes relative to the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolPlacement {
    Prefix,
    /// Suffix separated by a no-break space.
    Suffix,
}

/// Number formatting rules for one locale.
#[derive(Debug, Clone, Copy)]
struct LocaleFormat {
    group: &'static str,
    decimal: char,
    placement: SymbolPlacement,
    /// Grouping kicks in only when the integer part has more than this
    /// many digits beyond the first group (es-ES leaves "1234" alone).
    min_grouping_digits: usize,
}

fn locale_format(locale: &str) -> Option<LocaleFormat> {
    let normalized = locale.replace('_', "-").to_lowercase();
    let format = match normalized.as_str() {
        "en" | "en-us" | "en-gb" | "en-ca" | "en-au" => LocaleFormat {
            group: ",",
            decimal: '.',
            placement: SymbolPlacement::Prefix,
            min_grouping_digits: 1,
        },
        "es" | "es-es" => LocaleFormat {
            group: ".",
            decimal: ',',
            placement: SymbolPlacement::Suffix,
            min_grouping_digits: 2,
        },
        "de" | "de-de" => LocaleFormat {
            group: ".",
            decimal: ',',
            placement: SymbolPlacement::Suffix,
            min_grouping_digits: 1,
        },
        "fr" | "fr-fr" => LocaleFormat {
            group: "\u{202f}",
            decimal: ',',
            placement: SymbolPlacement::Suffix,
            min_grouping_digits: 1,
        },
        _ => return None,
    };
    Some(format)
}

/// Format an amount with two fraction digits for a currency and locale.
///
/// Unknown currencies, unknown locales and non-finite amounts take the
/// fallback path: fixed symbol followed by the amount to two decimals.
///
/// ```
/// use storefront_commerce::money::format_currency;
/// assert_eq!(format_currency(1234.5, "USD", "en-US"), "$1,234.50");
/// assert_eq!(format_currency(9.99, "EUR", "xx-XX"), "\u{20ac}9.99");
/// ```
pub fn format_currency(amount: f64, currency_code: &str, locale: &str) -> String {
    match (
        Currency::from_code(currency_code),
        locale_format(locale),
        amount.is_finite(),
    ) {
        (Some(currency), Some(format), true) => format_localized(amount, currency, format),
        _ => format!("{}{:.2}", fallback_symbol(currency_code), amount),
    }
}

fn format_localized(amount: f64, currency: Currency, format: LocaleFormat) -> String {
    let cents = to_cents(amount.abs());
    let integer = (cents / 100).to_string();
    let fraction = cents % 100;

    let grouped = group_digits(&integer, format.group, format.min_grouping_digits);
    let number = format!("{}{}{:02}", grouped, format.decimal, fraction);
    let sign = if amount < 0.0 && cents != 0 { "-" } else { "" };

    match format.placement {
        SymbolPlacement::Prefix => format!("{}{}{}", sign, currency.symbol(), number),
        SymbolPlacement::Suffix => format!("{}{}\u{a0}{}", sign, number, currency.symbol()),
    }
}

fn group_digits(integer: &str, separator: &str, min_grouping_digits: usize) -> String {
    if integer.len() < 4 + (min_grouping_digits - 1) {
        return integer.to_string();
    }

    let mut out = String::with_capacity(integer.len() + integer.len() / 3);
    let lead = integer.len() % 3;
    for (i, ch) in integer.chars().enumerate() {
        if i != 0 && (i + 3 - lead) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

/// Convert a decimal amount to integer cents, rounding half away from zero.
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Convert integer cents back to a decimal amount.
pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_en_us() {
        assert_eq!(format_currency(49.99, "USD", "en-US"), "$49.99");
        assert_eq!(format_currency(1234567.891, "USD", "en-US"), "$1,234,567.89");
        assert_eq!(format_currency(0.0, "USD", "en-US"), "$0.00");
    }

    #[test]
    fn test_format_negative() {
        assert_eq!(format_currency(-12.5, "GBP", "en-GB"), "-\u{00a3}12.50");
    }

    #[test]
    fn test_format_de_de() {
        assert_eq!(format_currency(1234.5, "EUR", "de-DE"), "1.234,50\u{a0}\u{20ac}");
    }

    #[test]
    fn test_format_es_min_grouping() {
        assert_eq!(format_currency(1234.5, "EUR", "es-ES"), "1234,50\u{a0}\u{20ac}");
        assert_eq!(format_currency(12345.5, "EUR", "es-ES"), "12.345,50\u{a0}\u{20ac}");
    }

    #[test]
    fn test_format_fallback_unknown_locale() {
        assert_eq!(format_currency(10.0, "GBP", "tlh"), "\u{00a3}10.00");
    }

    #[test]
    fn test_format_fallback_unknown_currency() {
        assert_eq!(format_currency(10.0, "XYZ", "en-US"), "$10.00");
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("USD"), Some(Currency::USD));
        assert_eq!(Currency::from_code("eur"), Some(Currency::EUR));
        assert_eq!(Currency::from_code("INVALID"), None);
    }

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits("123", ",", 1), "123");
        assert_eq!(group_digits("1234", ",", 1), "1,234");
        assert_eq!(group_digits("123456", ",", 1), "123,456");
        assert_eq!(group_digits("1234567", ",", 1), "1,234,567");
    }

    #[test]
    fn test_cents_round_trip() {
        assert_eq!(to_cents(19.99), 1999);
        assert_eq!(from_cents(1999), 19.99);
    }
}
