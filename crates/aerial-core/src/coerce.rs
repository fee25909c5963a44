// Best-effort numeric coercion shared by every loosely typed input field.
//
// Upstream values arrive as numbers, decorated strings ("9.5m", "12.3%",
// "GW7") or not at all. Every field goes through the same scrub-then-parse
// primitive and falls back to the default listed for it here.

use crate::model::{RawGameweek, RawNumber};
use tracing::warn;

/// Numeric player fields that are coerced with a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    /// Market value in millions. Must be strictly positive.
    MarketValue,
    /// Share of managers who selected the player, 0–100.
    SelectedPercentage,
}

impl NumericField {
    /// Value substituted when the raw input is missing, malformed or out of
    /// range.
    pub fn default_value(self) -> f64 {
        match self {
            NumericField::MarketValue => 10.0,
            NumericField::SelectedPercentage => 0.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NumericField::MarketValue => "value",
            NumericField::SelectedPercentage => "selected percentage",
        }
    }

    fn accepts(self, v: f64) -> bool {
        if !v.is_finite() {
            return false;
        }
        match self {
            NumericField::MarketValue => v > 0.0,
            NumericField::SelectedPercentage => v >= 0.0,
        }
    }
}

/// Keep only ASCII digits and dots, then parse what remains.
///
/// Returns `None` when nothing numeric is left (`"n/a"`) or the remainder is
/// not a valid number (`"1.2.3"`).
pub fn scrub_numeric(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce a raw field, substituting the field's default on failure.
///
/// A missing field falls back silently; a present but unusable one is
/// logged.
pub fn coerce_or_default(raw: Option<&RawNumber>, field: NumericField) -> f64 {
    let Some(raw) = raw else {
        return field.default_value();
    };

    let parsed = match raw {
        RawNumber::Number(n) => Some(*n),
        RawNumber::Text(text) => scrub_numeric(text),
    };

    match parsed {
        Some(v) if field.accepts(v) => v,
        _ => {
            warn!(
                "unusable {} {:?}, falling back to {}",
                field.label(),
                raw,
                field.default_value()
            );
            field.default_value()
        }
    }
}

/// Coerce a gameweek identifier to a column number.
///
/// Gameweeks are numbered from 1, so `0`, negatives, fractions and text with
/// no digits all yield `None`.
pub fn coerce_gameweek(raw: &RawGameweek) -> Option<u32> {
    match raw {
        RawGameweek::Number(n) => u32::try_from(*n).ok().filter(|gw| *gw > 0),
        RawGameweek::Text(text) => {
            let cleaned: String = text
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            cleaned.parse::<u32>().ok().filter(|gw| *gw > 0)
        }
    }
}

/// Round to one decimal place for display fields.
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrub_strips_decorations() {
        assert_eq!(scrub_numeric("9.5m"), Some(9.5));
        assert_eq!(scrub_numeric("12.3%"), Some(12.3));
        assert_eq!(scrub_numeric(" £7 "), Some(7.0));
        assert_eq!(scrub_numeric("n/a"), None);
        assert_eq!(scrub_numeric(""), None);
        assert_eq!(scrub_numeric("1.2.3"), None);
    }

    #[test]
    fn market_value_defaults() {
        let field = NumericField::MarketValue;
        assert_eq!(coerce_or_default(None, field), 10.0);
        assert_eq!(coerce_or_default(Some(&RawNumber::from("6.5m")), field), 6.5);
        assert_eq!(coerce_or_default(Some(&RawNumber::from(4.0)), field), 4.0);
        assert_eq!(coerce_or_default(Some(&RawNumber::from(0.0)), field), 10.0);
        assert_eq!(coerce_or_default(Some(&RawNumber::from(-2.0)), field), 10.0);
        assert_eq!(coerce_or_default(Some(&RawNumber::from("0.0m")), field), 10.0);
        assert_eq!(coerce_or_default(Some(&RawNumber::from("unknown")), field), 10.0);
        assert_eq!(coerce_or_default(Some(&RawNumber::from(f64::NAN)), field), 10.0);
    }

    #[test]
    fn selected_percentage_defaults() {
        let field = NumericField::SelectedPercentage;
        assert_eq!(coerce_or_default(None, field), 0.0);
        assert_eq!(coerce_or_default(Some(&RawNumber::from("23.4%")), field), 23.4);
        assert_eq!(coerce_or_default(Some(&RawNumber::from(0.0)), field), 0.0);
        assert_eq!(coerce_or_default(Some(&RawNumber::from("-")), field), 0.0);
    }

    #[test]
    fn gameweek_coercion() {
        assert_eq!(coerce_gameweek(&RawGameweek::Number(3)), Some(3));
        assert_eq!(coerce_gameweek(&RawGameweek::from("12")), Some(12));
        assert_eq!(coerce_gameweek(&RawGameweek::from("GW7")), Some(7));
        assert_eq!(coerce_gameweek(&RawGameweek::from(" 4 ")), Some(4));
        assert_eq!(coerce_gameweek(&RawGameweek::Number(0)), None);
        assert_eq!(coerce_gameweek(&RawGameweek::Number(-1)), None);
        assert_eq!(coerce_gameweek(&RawGameweek::from("N/A")), None);
        assert_eq!(coerce_gameweek(&RawGameweek::from("3.5")), None);
        assert_eq!(coerce_gameweek(&RawGameweek::default()), None);
    }

    #[test]
    fn round_to_one_decimal() {
        assert_eq!(round1(2.25), 2.3);
        assert_eq!(round1(1.0 / 3.0), 0.3);
        assert_eq!(round1(-1.26), -1.3);
        assert_eq!(round1(0.0), 0.0);
    }
}
