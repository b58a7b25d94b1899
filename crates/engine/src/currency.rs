use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Currency used to label amounts across the app.
///
/// `rate` is a static multiplier against the base unit (INR) kept only for
/// display purposes. There is no live conversion: switching currency changes
/// input/output labeling, never stored amounts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub symbol: String,
    pub rate: f64,
}

impl Currency {
    /// Builds a currency, rejecting an empty code or a non-positive rate.
    pub fn new(code: &str, symbol: &str, rate: f64) -> ResultEngine<Self> {
        let code = code.trim().to_ascii_uppercase();
        if code.is_empty() {
            return Err(EngineError::validation("code", "currency code is empty"));
        }
        if !rate.is_finite() || rate <= 0.0 {
            return Err(EngineError::validation("rate", "rate must be > 0"));
        }
        Ok(Self {
            code,
            symbol: symbol.to_string(),
            rate,
        })
    }

    pub fn inr() -> Self {
        Self {
            code: "INR".to_string(),
            symbol: "₹".to_string(),
            rate: 1.0,
        }
    }

    pub fn usd() -> Self {
        Self {
            code: "USD".to_string(),
            symbol: "$".to_string(),
            rate: 0.012,
        }
    }

    pub fn eur() -> Self {
        Self {
            code: "EUR".to_string(),
            symbol: "€".to_string(),
            rate: 0.011,
        }
    }

    /// The currencies the profile screen offers.
    pub fn builtin() -> Vec<Currency> {
        vec![Self::inr(), Self::usd(), Self::eur()]
    }

    /// Looks up a builtin currency by ISO-like code (case-insensitive).
    pub fn by_code(code: &str) -> ResultEngine<Self> {
        let wanted = code.trim().to_ascii_uppercase();
        Self::builtin()
            .into_iter()
            .find(|currency| currency.code == wanted)
            .ok_or_else(|| EngineError::KeyNotFound(wanted))
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::inr()
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_inr() {
        let currency = Currency::default();
        assert_eq!(currency.code, "INR");
        assert_eq!(currency.symbol, "₹");
        assert_eq!(currency.rate, 1.0);
    }

    #[test]
    fn by_code_is_case_insensitive() {
        assert_eq!(Currency::by_code("usd").unwrap().code, "USD");
        assert_eq!(Currency::by_code(" eur ").unwrap().symbol, "€");
    }

    #[test]
    fn fail_unknown_code() {
        assert_eq!(
            Currency::by_code("GBP").unwrap_err(),
            EngineError::KeyNotFound("GBP".to_string())
        );
    }

    #[test]
    fn fail_non_positive_rate() {
        assert!(Currency::new("INR", "₹", 0.0).is_err());
        assert!(Currency::new("INR", "₹", -1.0).is_err());
        assert!(Currency::new("INR", "₹", f64::NAN).is_err());
    }
}
