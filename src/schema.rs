use crate::error::{KpiError, Result};
use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MONTHS_PER_YEAR: usize = 12;
pub const DAYS_PER_MONTH: f64 = 30.0;
pub const DEFAULT_PROFIT_TOLERANCE: f64 = 1e-6;

/// Calendar months, labelled with the French abbreviations the dataset uses.
///
/// Ordering is by calendar position, never by label: `Déc` sorts after `Avr`
/// even though it does not lexically.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum CalendarMonth {
    #[serde(rename = "Jan")]
    Jan,
    #[serde(rename = "Fév")]
    Feb,
    #[serde(rename = "Mar")]
    Mar,
    #[serde(rename = "Avr")]
    Apr,
    #[serde(rename = "Mai")]
    May,
    #[serde(rename = "Juin")]
    Jun,
    #[serde(rename = "Juil")]
    Jul,
    #[serde(rename = "Aoû")]
    Aug,
    #[serde(rename = "Sep")]
    Sep,
    #[serde(rename = "Oct")]
    Oct,
    #[serde(rename = "Nov")]
    Nov,
    #[serde(rename = "Déc")]
    Dec,
}

impl CalendarMonth {
    pub const ALL: [CalendarMonth; MONTHS_PER_YEAR] = [
        CalendarMonth::Jan,
        CalendarMonth::Feb,
        CalendarMonth::Mar,
        CalendarMonth::Apr,
        CalendarMonth::May,
        CalendarMonth::Jun,
        CalendarMonth::Jul,
        CalendarMonth::Aug,
        CalendarMonth::Sep,
        CalendarMonth::Oct,
        CalendarMonth::Nov,
        CalendarMonth::Dec,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CalendarMonth::Jan => "Jan",
            CalendarMonth::Feb => "Fév",
            CalendarMonth::Mar => "Mar",
            CalendarMonth::Apr => "Avr",
            CalendarMonth::May => "Mai",
            CalendarMonth::Jun => "Juin",
            CalendarMonth::Jul => "Juil",
            CalendarMonth::Aug => "Aoû",
            CalendarMonth::Sep => "Sep",
            CalendarMonth::Oct => "Oct",
            CalendarMonth::Nov => "Nov",
            CalendarMonth::Dec => "Déc",
        }
    }

    /// 1-based calendar position (Jan = 1, Déc = 12).
    pub fn ordinal(self) -> u32 {
        chrono::Month::from(self).number_from_month()
    }

    pub fn from_ordinal(ordinal: u32) -> Option<Self> {
        let idx = ordinal.checked_sub(1)? as usize;
        Self::ALL.get(idx).copied()
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.label() == label)
    }

    pub fn of_date(date: NaiveDate) -> Self {
        // month() is always within 1..=12
        Self::ALL[date.month0() as usize]
    }
}

impl From<CalendarMonth> for chrono::Month {
    fn from(month: CalendarMonth) -> Self {
        match month {
            CalendarMonth::Jan => chrono::Month::January,
            CalendarMonth::Feb => chrono::Month::February,
            CalendarMonth::Mar => chrono::Month::March,
            CalendarMonth::Apr => chrono::Month::April,
            CalendarMonth::May => chrono::Month::May,
            CalendarMonth::Jun => chrono::Month::June,
            CalendarMonth::Jul => chrono::Month::July,
            CalendarMonth::Aug => chrono::Month::August,
            CalendarMonth::Sep => chrono::Month::September,
            CalendarMonth::Oct => chrono::Month::October,
            CalendarMonth::Nov => chrono::Month::November,
            CalendarMonth::Dec => chrono::Month::December,
        }
    }
}

impl From<chrono::Month> for CalendarMonth {
    fn from(month: chrono::Month) -> Self {
        Self::ALL[month.number_from_month() as usize - 1]
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CalendarMonth {
    type Err = KpiError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s.trim()).ok_or_else(|| {
            KpiError::EmptySelectionError(format!("no month is labelled '{}'", s.trim()))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MonthlyRecord {
    #[schemars(description = "Calendar month this record covers")]
    pub month: CalendarMonth,

    #[schemars(description = "Revenue (chiffre d'affaires) for the month, non-negative")]
    pub revenue: f64,

    #[schemars(description = "Total costs for the month, non-negative")]
    pub cost: f64,

    #[schemars(description = "Profit for the month; must equal revenue - cost")]
    pub profit: f64,
}

impl MonthlyRecord {
    /// Builds a record whose profit is derived from revenue and cost.
    pub fn new(month: CalendarMonth, revenue: f64, cost: f64) -> Self {
        Self {
            month,
            revenue,
            cost,
            profit: revenue - cost,
        }
    }

    pub fn validate(&self, tolerance: f64) -> Result<()> {
        if !(self.revenue.is_finite() && self.cost.is_finite() && self.profit.is_finite()) {
            return Err(KpiError::DataIntegrityError(format!(
                "{} has a non-finite amount",
                self.month
            )));
        }

        if self.revenue < 0.0 || self.cost < 0.0 {
            return Err(KpiError::DataIntegrityError(format!(
                "{} has negative revenue ({}) or cost ({})",
                self.month, self.revenue, self.cost
            )));
        }

        let difference = (self.revenue - self.cost - self.profit).abs();
        if difference > tolerance {
            return Err(KpiError::ProfitMismatch {
                month: self.month,
                revenue: self.revenue,
                cost: self.cost,
                profit: self.profit,
                difference,
            });
        }

        Ok(())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "PascalCase")]
pub enum BreakevenCategory {
    #[schemars(description = "Costs that do not vary with activity (rent, salaries), annual basis")]
    FixedCosts,

    #[schemars(description = "Costs proportional to activity, annual basis")]
    VariableCosts,

    #[schemars(description = "Contribution margin, annual basis")]
    Margin,
}

impl BreakevenCategory {
    pub const ALL: [BreakevenCategory; 3] = [
        BreakevenCategory::FixedCosts,
        BreakevenCategory::VariableCosts,
        BreakevenCategory::Margin,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BreakevenCategory::FixedCosts => "Coûts fixes",
            BreakevenCategory::VariableCosts => "Coûts variables",
            BreakevenCategory::Margin => "Marge",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BreakevenComponent {
    pub category: BreakevenCategory,

    #[schemars(description = "Amount for the category, annual basis")]
    pub amount: f64,
}

/// Break-even line items, exactly one per category.
///
/// Only constructible through [`BreakevenTable::try_from_components`], so a
/// lookup by category can never miss.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakevenTable {
    components: Vec<BreakevenComponent>,
}

impl BreakevenTable {
    pub fn try_from_components(mut components: Vec<BreakevenComponent>) -> Result<Self> {
        components.sort_by_key(|c| c.category);

        for pair in components.windows(2) {
            if pair[0].category == pair[1].category {
                return Err(KpiError::DataIntegrityError(format!(
                    "duplicate break-even category {:?}",
                    pair[0].category
                )));
            }
        }

        for category in BreakevenCategory::ALL {
            if !components.iter().any(|c| c.category == category) {
                return Err(KpiError::DataIntegrityError(format!(
                    "missing break-even category {:?}",
                    category
                )));
            }
        }

        if let Some(bad) = components.iter().find(|c| !c.amount.is_finite()) {
            return Err(KpiError::DataIntegrityError(format!(
                "break-even category {:?} has a non-finite amount",
                bad.category
            )));
        }

        Ok(Self { components })
    }

    pub fn amount(&self, category: BreakevenCategory) -> f64 {
        self.components
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.amount)
            .unwrap_or_default()
    }

    /// Components in category order (fixed, variable, margin).
    pub fn components(&self) -> &[BreakevenComponent] {
        &self.components
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoreConfig {
    #[schemars(
        description = "Maximum absolute difference allowed between profit and revenue - cost when validating a record"
    )]
    #[serde(default = "default_profit_tolerance")]
    pub profit_tolerance: f64,
}

fn default_profit_tolerance() -> f64 {
    DEFAULT_PROFIT_TOLERANCE
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            profit_tolerance: DEFAULT_PROFIT_TOLERANCE,
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.profit_tolerance.is_finite() || self.profit_tolerance < 0.0 {
            return Err(KpiError::InvalidConfig(format!(
                "profit_tolerance must be a finite, non-negative number (got {})",
                self.profit_tolerance
            )));
        }
        Ok(())
    }
}

/// Serializable view of both canonical tables.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DatasetSnapshot {
    #[schemars(description = "Twelve monthly records in calendar order")]
    pub monthly: Vec<MonthlyRecord>,

    #[schemars(description = "Break-even components, one per category")]
    pub breakeven: Vec<BreakevenComponent>,
}

impl DatasetSnapshot {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DatasetSnapshot)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_ordinals_follow_calendar() {
        for (idx, month) in CalendarMonth::ALL.iter().enumerate() {
            assert_eq!(month.ordinal(), idx as u32 + 1);
            assert_eq!(CalendarMonth::from_ordinal(idx as u32 + 1), Some(*month));
        }
        assert_eq!(CalendarMonth::from_ordinal(0), None);
        assert_eq!(CalendarMonth::from_ordinal(13), None);
    }

    #[test]
    fn test_month_ordering_is_not_lexical() {
        // "Déc" < "Fév" lexically, but December follows February.
        assert!("Déc" < "Fév");
        assert!(CalendarMonth::Dec > CalendarMonth::Feb);
        assert!(CalendarMonth::Apr < CalendarMonth::Aug);
    }

    #[test]
    fn test_month_labels_parse() {
        assert_eq!("Fév".parse::<CalendarMonth>().unwrap(), CalendarMonth::Feb);
        assert_eq!(" Juil ".parse::<CalendarMonth>().unwrap(), CalendarMonth::Jul);
        assert!(matches!(
            "Feb".parse::<CalendarMonth>(),
            Err(KpiError::EmptySelectionError(_))
        ));
    }

    #[test]
    fn test_month_chrono_interop() {
        let date = NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();
        assert_eq!(CalendarMonth::of_date(date), CalendarMonth::Aug);
        assert_eq!(
            CalendarMonth::from(chrono::Month::December),
            CalendarMonth::Dec
        );
        assert_eq!(chrono::Month::from(CalendarMonth::Jun), chrono::Month::June);
    }

    #[test]
    fn test_month_serializes_as_label() {
        let json = serde_json::to_string(&CalendarMonth::Aug).unwrap();
        assert_eq!(json, "\"Aoû\"");
        let back: CalendarMonth = serde_json::from_str("\"Déc\"").unwrap();
        assert_eq!(back, CalendarMonth::Dec);
    }

    #[test]
    fn test_record_validation() {
        let ok = MonthlyRecord {
            month: CalendarMonth::Jan,
            revenue: 1600.0,
            cost: 1345.65,
            profit: 254.35,
        };
        assert!(ok.validate(DEFAULT_PROFIT_TOLERANCE).is_ok());

        let drifted = MonthlyRecord {
            profit: 254.0,
            ..ok.clone()
        };
        match drifted.validate(DEFAULT_PROFIT_TOLERANCE) {
            Err(KpiError::ProfitMismatch { month, difference, .. }) => {
                assert_eq!(month, CalendarMonth::Jan);
                assert!((difference - 0.35).abs() < 1e-9);
            }
            other => panic!("expected ProfitMismatch, got {:?}", other),
        }

        let negative = MonthlyRecord::new(CalendarMonth::Feb, -1.0, 0.0);
        assert!(matches!(
            negative.validate(DEFAULT_PROFIT_TOLERANCE),
            Err(KpiError::DataIntegrityError(_))
        ));

        let nan = MonthlyRecord::new(CalendarMonth::Mar, f64::NAN, 0.0);
        assert!(nan.validate(DEFAULT_PROFIT_TOLERANCE).is_err());
    }

    #[test]
    fn test_breakeven_table_requires_each_category_once() {
        let full = vec![
            BreakevenComponent {
                category: BreakevenCategory::Margin,
                amount: 3052.0,
            },
            BreakevenComponent {
                category: BreakevenCategory::FixedCosts,
                amount: 6399.0,
            },
            BreakevenComponent {
                category: BreakevenCategory::VariableCosts,
                amount: 9749.0,
            },
        ];
        let table = BreakevenTable::try_from_components(full.clone()).unwrap();
        assert_eq!(table.amount(BreakevenCategory::FixedCosts), 6399.0);
        assert_eq!(
            table.components()[0].category,
            BreakevenCategory::FixedCosts
        );

        let mut duplicated = full.clone();
        duplicated.push(BreakevenComponent {
            category: BreakevenCategory::Margin,
            amount: 1.0,
        });
        assert!(matches!(
            BreakevenTable::try_from_components(duplicated),
            Err(KpiError::DataIntegrityError(_))
        ));

        let missing = full[..2].to_vec();
        assert!(BreakevenTable::try_from_components(missing).is_err());
    }

    #[test]
    fn test_store_config_validation() {
        assert!(StoreConfig::default().validate().is_ok());
        let bad = StoreConfig {
            profit_tolerance: -1.0,
        };
        assert!(matches!(bad.validate(), Err(KpiError::InvalidConfig(_))));

        let parsed: StoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.profit_tolerance, DEFAULT_PROFIT_TOLERANCE);
    }

    #[test]
    fn test_schema_generation() {
        let schema_json = DatasetSnapshot::schema_as_json().unwrap();
        assert!(schema_json.contains("monthly"));
        assert!(schema_json.contains("breakeven"));
        assert!(schema_json.contains("FixedCosts"));
    }
}
