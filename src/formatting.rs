//! Display formatting for monetary amounts and KPI deltas.
//!
//! Every renderer rejects non-finite input with [`KpiError::FormatError`]
//! instead of substituting a placeholder; choosing a fallback string is up to
//! the caller.

use crate::error::{KpiError, Result};
use crate::utils::group_thousands;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormatter {
    pub decimal_separator: String,
    pub group_separator: String,
    pub suffix: String,
}

impl CurrencyFormatter {
    /// French convention for euros: `2 736,00 €`.
    pub fn euro_fr() -> Self {
        Self {
            decimal_separator: ",".to_string(),
            group_separator: " ".to_string(),
            suffix: " €".to_string(),
        }
    }

    /// Renders `amount` with two decimals, grouped thousands and the suffix.
    ///
    /// Rounding is that of Rust's `{:.2}`: correctly rounded from the binary
    /// value, ties to even. An amount that rounds to zero is never signed.
    pub fn format(&self, amount: f64) -> Result<String> {
        if !amount.is_finite() {
            return Err(KpiError::FormatError(amount));
        }

        let fixed = format!("{:.2}", amount.abs());
        let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
        let is_zero = int_part.bytes().all(|b| b == b'0') && frac_part.bytes().all(|b| b == b'0');
        let sign = if amount < 0.0 && !is_zero { "-" } else { "" };

        Ok(format!(
            "{}{}{}{}{}",
            sign,
            group_thousands(int_part, &self.group_separator),
            self.decimal_separator,
            frac_part,
            self.suffix
        ))
    }
}

impl Default for CurrencyFormatter {
    fn default() -> Self {
        Self::euro_fr()
    }
}

pub fn format_euro(amount: f64) -> Result<String> {
    CurrencyFormatter::euro_fr().format(amount)
}

/// `15.892` with one decimal → `"15.9%"`.
pub fn format_percent(value: f64, decimals: usize) -> Result<String> {
    if !value.is_finite() {
        return Err(KpiError::FormatError(value));
    }
    Ok(format!("{:.*}%", decimals, value))
}

/// Break-even delay, e.g. `"7.54 jours"`.
pub fn format_days(days: f64) -> Result<String> {
    if !days.is_finite() {
        return Err(KpiError::FormatError(days));
    }
    Ok(format!("{:.2} jours", days))
}
