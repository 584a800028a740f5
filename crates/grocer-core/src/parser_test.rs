use super::*;

fn dec(num: i64, scale: u32) -> Decimal {
    Decimal::new(num, scale)
}

#[test]
fn parses_quantity_unit_name_and_price() {
    let parsed = parse_item("2kg rice 2.99€");
    assert_eq!(
        parsed,
        ParsedItem {
            quantity: dec(2, 0),
            unit: Unit::Kg,
            name: "rice".to_string(),
            price: Some(dec(299, 2)),
        }
    );
}

#[test]
fn bare_name_uses_defaults() {
    let parsed = parse_item("milk");
    assert_eq!(parsed, ParsedItem::plain("milk"));
    assert_eq!(parsed.quantity, Decimal::ONE);
    assert_eq!(parsed.unit, Unit::Unit);
    assert!(parsed.price.is_none());
}

#[test]
fn unit_may_be_separated_by_a_space() {
    let parsed = parse_item("500 g flour");
    assert_eq!(parsed.quantity, dec(500, 0));
    assert_eq!(parsed.unit, Unit::G);
    assert_eq!(parsed.name, "flour");
}

#[test]
fn comma_decimal_separator_is_normalized() {
    let parsed = parse_item("1,5l whole milk 1,20 eur");
    assert_eq!(parsed.quantity, dec(15, 1));
    assert_eq!(parsed.unit, Unit::L);
    assert_eq!(parsed.name, "whole milk");
    assert_eq!(parsed.price, Some(dec(120, 2)));
}

#[test]
fn u_token_maps_to_unit() {
    let parsed = parse_item("6u eggs");
    assert_eq!(parsed.quantity, dec(6, 0));
    assert_eq!(parsed.unit, Unit::Unit);
    assert_eq!(parsed.name, "eggs");
}

#[test]
fn quantity_without_unit_keeps_whole_name() {
    let parsed = parse_item("3 lemons");
    assert_eq!(parsed.quantity, dec(3, 0));
    assert_eq!(parsed.unit, Unit::Unit);
    assert_eq!(parsed.name, "lemons");
}

#[test]
fn unrecognized_unit_token_folds_back_into_name() {
    let parsed = parse_item("2 pk yogurt");
    assert_eq!(parsed.quantity, dec(2, 0));
    assert_eq!(parsed.unit, Unit::Unit);
    assert_eq!(parsed.name, "pk yogurt");
}

#[test]
fn zero_quantity_defaults_to_one() {
    let parsed = parse_item("0 kg potatoes");
    assert_eq!(parsed.quantity, Decimal::ONE);
    assert_eq!(parsed.unit, Unit::Kg);
    assert_eq!(parsed.name, "potatoes");
}

#[test]
fn price_without_quantity_is_extracted() {
    let parsed = parse_item("coffee beans 7.49 $");
    assert_eq!(parsed.quantity, Decimal::ONE);
    assert_eq!(parsed.name, "coffee beans");
    assert_eq!(parsed.price, Some(dec(749, 2)));
}

#[test]
fn number_without_currency_is_not_a_price() {
    let parsed = parse_item("rice 2.99");
    assert_eq!(parsed.name, "rice 2.99");
    assert!(parsed.price.is_none());
}

#[test]
fn lone_price_token_stays_in_name() {
    let parsed = parse_item("2.99€");
    assert_eq!(parsed.name, "2.99€");
    assert!(parsed.price.is_none());
}

#[test]
fn number_glued_to_name_is_not_a_quantity() {
    let parsed = parse_item("7up");
    assert_eq!(parsed, ParsedItem::plain("7up"));
}

#[test]
fn surrounding_whitespace_is_trimmed() {
    let parsed = parse_item("   2kg   basmati rice   ");
    assert_eq!(parsed.unit, Unit::Kg);
    assert_eq!(parsed.name, "basmati rice");
}

#[test]
fn blank_input_yields_empty_name() {
    for raw in ["", "   ", "\t\n"] {
        let parsed = parse_item(raw);
        assert_eq!(parsed.name, "");
        assert_eq!(parsed.quantity, Decimal::ONE);
        assert!(parsed.price.is_none());
    }
}

#[test]
fn quantity_is_always_positive_and_price_never_negative() {
    let inputs = [
        "",
        "milk",
        "-2 kg rice",
        "0,0 l water 0€",
        "12 x bread -3€",
        "1.2.3 kg beans",
        "99999999999999999999999999999999 kg sand",
        "€€€",
        "2kg",
        "ñandú 3,5 €",
    ];
    for raw in inputs {
        let parsed = parse_item(raw);
        assert!(parsed.quantity > Decimal::ZERO, "{raw:?} -> {parsed:?}");
        if let Some(price) = parsed.price {
            assert!(price >= Decimal::ZERO, "{raw:?} -> {parsed:?}");
        }
    }
}
