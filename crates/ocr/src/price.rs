use rust_decimal::Decimal;
use std::str::FromStr;

re!(re_price, r"-?\d+[.,]\d{2}");
re!(re_whitespace, r"\s+");

/// Finds and parses price tokens: an optional minus, digits, a `.` or `,`
/// separator and exactly two digits.
pub struct PriceMatcher;

impl PriceMatcher {
    /// The last price token on `line`, parsed.
    ///
    /// Receipts print a unit price before the discounted or multiplied total,
    /// so the last token wins. A token that matches the pattern but does not
    /// parse (e.g. non-ASCII digits) counts as no price.
    pub fn last_price(line: &str) -> Option<Decimal> {
        let token = re_price().find_iter(line).last()?;
        let parsed = parse_price(token.as_str());
        if parsed.is_none() {
            tracing::trace!(token = token.as_str(), "price token did not parse");
        }
        parsed
    }

    /// `text` with every price token removed.
    pub fn strip_prices(text: &str) -> String {
        re_price().replace_all(text, "").into_owned()
    }

    /// Turn an accumulated buffer into an item name: drop prices, collapse
    /// whitespace, trim surrounding `.`, `,`, `-` and spaces.
    pub fn clean_name(buffer: &str) -> String {
        let stripped = Self::strip_prices(buffer);
        let collapsed = re_whitespace().replace_all(&stripped, " ");
        collapsed
            .trim_matches(|c| matches!(c, '.' | ',' | '-' | ' '))
            .to_string()
    }
}

fn parse_price(token: &str) -> Option<Decimal> {
    Decimal::from_str(&token.replace(',', ".")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn period_and_comma_separators() {
        assert_eq!(PriceMatcher::last_price("Melk 1.38"), Some(dec("1.38")));
        assert_eq!(PriceMatcher::last_price("Melk 1,38"), Some(dec("1.38")));
    }

    #[test]
    fn value_keeps_two_fractional_digits() {
        let price = PriceMatcher::last_price("Appels 1,00").unwrap();
        assert_eq!(price.scale(), 2);
        assert_eq!(price.to_string(), "1.00");
    }

    #[test]
    fn negative_price() {
        assert_eq!(PriceMatcher::last_price("Statiegeld -0.50"), Some(dec("-0.50")));
    }

    #[test]
    fn last_token_wins() {
        assert_eq!(PriceMatcher::last_price("2 x 1.25 2.50"), Some(dec("2.50")));
        assert_eq!(PriceMatcher::last_price("Kaas 4.99 -1.00"), Some(dec("-1.00")));
    }

    #[test]
    fn requires_two_fractional_digits() {
        assert_eq!(PriceMatcher::last_price("Bananen 1.5 kg"), None);
        assert_eq!(PriceMatcher::last_price("Totaal 12"), None);
        assert_eq!(PriceMatcher::last_price(""), None);
    }

    #[test]
    fn longer_fraction_matches_first_two_digits() {
        // `1.234` contains the token `1.23`; the pattern has no right boundary.
        assert_eq!(PriceMatcher::last_price("Gewicht 1.234"), Some(dec("1.23")));
    }

    #[test]
    fn unparseable_token_is_no_price() {
        // Arabic-Indic digits satisfy `\d` but are not a decimal number.
        assert_eq!(PriceMatcher::last_price("Kaas \u{0661}\u{0662}.\u{0663}\u{0664}"), None);
    }

    #[test]
    fn strip_removes_every_token() {
        assert_eq!(PriceMatcher::strip_prices("A 1.00 B -2,50 C"), "A  B  C");
    }

    #[test]
    fn clean_name_trims_punctuation_and_whitespace() {
        assert_eq!(PriceMatcher::clean_name("Melk 1.38 "), "Melk");
        assert_eq!(PriceMatcher::clean_name("- Volkoren   brood, 2.49 "), "Volkoren brood");
        assert_eq!(PriceMatcher::clean_name("- 1,00 "), "");
        assert_eq!(PriceMatcher::clean_name("...Kaas\t\t-"), "Kaas");
    }
}
