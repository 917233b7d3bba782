//! Price extraction from odds button and fluctuation text.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::Price;

/// Whole part (optionally grouped as `1,001`), a `.` or `,` separator, then
/// one or two digits.
static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,3}(?:,\d{3})+|\d+)[.,](\d{1,2})").unwrap());

/// Parser for printed prices
pub struct OddsParser;

impl OddsParser {
    /// First decimal price in `text`, with a `,` separator normalized to `.`.
    pub fn parse_price(text: &str) -> Option<Price> {
        let caps = DECIMAL_RE.captures(text)?;
        Price::from_parts(&caps[1].replace(',', ""), &caps[2])
    }

    /// Price at `index` of `texts`, if present and parseable.
    pub fn price_at<S: AsRef<str>>(texts: &[S], index: usize) -> Option<Price> {
        texts.get(index).and_then(|t| Self::parse_price(t.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_parse_plain_price() {
        assert_eq!(OddsParser::parse_price("15.00").unwrap().as_str(), "15.00");
        assert_eq!(OddsParser::parse_price(" 3.5 ").unwrap().as_str(), "3.5");
    }

    #[test]
    fn test_comma_separator_normalized() {
        assert_eq!(OddsParser::parse_price("12,50").unwrap().as_str(), "12.50");
    }

    #[test]
    fn test_thousands_separator() {
        assert_eq!(OddsParser::parse_price("1,001.00").unwrap().as_str(), "1001.00");
        assert_eq!(OddsParser::parse_price("$2,500.00").unwrap().as_str(), "2500.00");
        assert_eq!(OddsParser::parse_price("1,250,000.5").unwrap().as_str(), "1250000.5");
        // a comma with fewer than three digits after it is the decimal separator
        assert_eq!(OddsParser::parse_price("1,55").unwrap().as_str(), "1.55");
    }

    #[test]
    fn test_price_inside_label() {
        assert_eq!(OddsParser::parse_price("$4.20 Win").unwrap().as_str(), "4.20");
        assert_eq!(OddsParser::parse_price("Fluc 101.00").unwrap().as_str(), "101.00");
    }

    #[test]
    fn test_third_fraction_digit_ignored() {
        assert_eq!(OddsParser::parse_price("2.125").unwrap().as_str(), "2.12");
    }

    #[test]
    fn test_no_price() {
        assert!(OddsParser::parse_price("SUS").is_none());
        assert!(OddsParser::parse_price("15").is_none());
        assert!(OddsParser::parse_price("").is_none());
    }

    #[test]
    fn test_price_at_index() {
        let texts = ["15.00", "n/a", "13.00"];
        assert_eq!(OddsParser::price_at(&texts, 0).unwrap().as_str(), "15.00");
        assert!(OddsParser::price_at(&texts, 1).is_none());
        assert!(OddsParser::price_at(&texts, 3).is_none());
    }

    #[test]
    fn test_every_price_matches_decimal_shape() {
        let shape = Regex::new(r"^\d+\.\d{1,2}$").unwrap();
        for text in ["1.5", "1,55", "$27.00", "x 9,9 y", "100.001", "0.50"] {
            let price = OddsParser::parse_price(text).unwrap();
            assert!(shape.is_match(price.as_str()), "{} -> {}", text, price);
        }
    }
}
