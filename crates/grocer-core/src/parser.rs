//! Free-text shopping-list entry parser.
//!
//! Turns one raw line such as `"2kg rice 2.99€"` into a [`ParsedItem`]. The
//! parser never fails: anything it cannot interpret stays in the name and the
//! structured fields fall back to their defaults (quantity `1`, unit
//! [`Unit::Unit`], no price).

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::units::Unit;

/// Trailing `<number><currency>` token, e.g. `"2.99€"`, `"1,50 eur"`.
static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<rest>.*?)\s*(?P<price>\d+(?:[.,]\d+)?)\s*(?:€|\$|£|eur|usd)$")
        .expect("valid price regex")
});

/// Leading quantity, optional 1-2 letter unit token, then the name.
static QUANTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<qty>\d+(?:[.,]\d+)?)\s*(?P<unit>[A-Za-z]{1,2})?\s+(?P<name>\S.*)$")
        .expect("valid quantity regex")
});

/// Structured view of one shopping-list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedItem {
    /// Always strictly positive; `1` when no quantity was written.
    pub quantity: Decimal,
    pub unit: Unit,
    /// Trimmed product name. Empty only when the input was blank.
    pub name: String,
    /// Price typed after the name with a currency marker, if any.
    pub price: Option<Decimal>,
}

impl ParsedItem {
    /// The value produced for input with no recognizable structure.
    #[must_use]
    pub fn plain(name: &str) -> Self {
        Self {
            quantity: Decimal::ONE,
            unit: Unit::Unit,
            name: name.trim().to_string(),
            price: None,
        }
    }
}

/// Parses a raw shopping-list line.
///
/// Matching rules:
/// - A trailing number followed by `€`, `$`, `£`, `eur` or `usd` is the price.
/// - A leading number is the quantity; comma and dot are both accepted as
///   the decimal separator.
/// - A 1-2 letter token right after the quantity is the unit when it is one
///   of `g`, `kg`, `l`, `ml`, `u`; any other token stays part of the name.
///
/// A quantity that is zero or does not parse becomes `1`.
#[must_use]
pub fn parse_item(raw: &str) -> ParsedItem {
    let trimmed = raw.trim();
    let (body, price) = split_price(trimmed);

    let Some(caps) = QUANTITY_RE.captures(body) else {
        return ParsedItem {
            price,
            ..ParsedItem::plain(body)
        };
    };

    let quantity = parse_decimal(&caps["qty"])
        .filter(|q| *q > Decimal::ZERO)
        .unwrap_or(Decimal::ONE);
    let name = caps["name"].trim();

    let (unit, name) = match caps.name("unit") {
        Some(token) => match Unit::from_token(token.as_str()) {
            Some(unit) => (unit, name.to_string()),
            None => (Unit::Unit, format!("{} {name}", token.as_str())),
        },
        None => (Unit::Unit, name.to_string()),
    };

    ParsedItem {
        quantity,
        unit,
        name,
        price,
    }
}

/// Splits a trailing price token off `input`.
///
/// The price is only taken when something is left in front of it, so a bare
/// `"2.99€"` stays a name.
fn split_price(input: &str) -> (&str, Option<Decimal>) {
    let Some(caps) = PRICE_RE.captures(input) else {
        return (input, None);
    };
    let rest = caps.name("rest").map_or("", |m| m.as_str()).trim();
    if rest.is_empty() {
        return (input, None);
    }
    match parse_decimal(&caps["price"]) {
        Some(price) => (rest, Some(price)),
        None => (input, None),
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(&raw.replace(',', ".")).ok()
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
