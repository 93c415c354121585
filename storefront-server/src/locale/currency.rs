//! Currencies, conversion and display formatting

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display currencies. Catalog prices are stored in USD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Kgs,
    Kzt,
    Usd,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Kgs, Currency::Kzt, Currency::Usd];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Kgs => "KGS",
            Currency::Kzt => "KZT",
            Currency::Usd => "USD",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Kgs => "сом",
            Currency::Kzt => "₸",
            Currency::Usd => "$",
        }
    }

    /// Units per USD used when the rates service is unavailable
    pub fn fallback_rate(&self) -> Decimal {
        match self {
            Currency::Kgs => Decimal::new(8950, 2),
            Currency::Kzt => Decimal::new(45000, 2),
            Currency::Usd => Decimal::ONE,
        }
    }

    /// Currency shown to shoppers from a given country (ISO alpha-2)
    pub fn for_country(country: &str) -> Self {
        match country.trim().to_ascii_uppercase().as_str() {
            "KG" => Currency::Kgs,
            "KZ" => Currency::Kzt,
            _ => Currency::Usd,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == upper)
            .ok_or_else(|| format!("unsupported currency: {s}"))
    }
}

/// USD amount in the target currency, truncated to cents
pub fn convert_price(usd_amount: Decimal, rate: Decimal) -> Decimal {
    (usd_amount * rate).round_dp_with_strategy(2, RoundingStrategy::ToZero)
}

/// Render an already-converted amount the way shoppers of that currency
/// expect: `1 234,56 сом`, `1 235 ₸`, `$1,234.56`.
pub fn format_price(amount: Decimal, currency: Currency) -> String {
    match currency {
        Currency::Kgs => {
            let (int, frac) = split_fixed(amount, 2);
            format!("{},{} {}", group_thousands(&int, ' '), frac, currency.symbol())
        }
        Currency::Kzt => {
            let (int, _) = split_fixed(amount, 0);
            format!("{} {}", group_thousands(&int, ' '), currency.symbol())
        }
        Currency::Usd => {
            let (int, frac) = split_fixed(amount, 2);
            let grouped = group_thousands(&int, ',');
            match grouped.strip_prefix('-') {
                Some(abs) => format!("-{}{}.{}", currency.symbol(), abs, frac),
                None => format!("{}{}.{}", currency.symbol(), grouped, frac),
            }
        }
    }
}

fn split_fixed(amount: Decimal, places: u32) -> (String, String) {
    let rounded = amount.round_dp(places);
    let text = format!("{:.*}", places as usize, rounded);
    match text.split_once('.') {
        Some((int, frac)) => (int.to_string(), frac.to_string()),
        None => (text, String::new()),
    }
}

fn group_thousands(int: &str, sep: char) -> String {
    let (sign, digits) = match int.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int),
    };
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(ch);
    }
    format!("{sign}{out}")
}
