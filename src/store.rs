use crate::dataset::{sample_breakeven_components, sample_monthly_records};
use crate::error::{KpiError, Result};
use crate::formatting::format_euro;
use crate::schema::{
    BreakevenComponent, BreakevenTable, DatasetSnapshot, MonthlyRecord, StoreConfig,
    MONTHS_PER_YEAR,
};
use crate::utils::is_calendar_ordered;
use log::{debug, trace};
use once_cell::sync::OnceCell;
use serde::Serialize;

static GLOBAL_STORE: OnceCell<DataStore> = OnceCell::new();

/// The two canonical tables, validated once and immutable afterwards.
#[derive(Debug)]
pub struct DataStore {
    monthly: Vec<MonthlyRecord>,
    breakeven: BreakevenTable,
}

/// A monthly row formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRow {
    pub month: String,
    pub revenue: String,
    pub cost: String,
    pub profit: String,
}

impl DataStore {
    /// Validates both tables and builds a store from them.
    pub fn from_tables(
        monthly: Vec<MonthlyRecord>,
        breakeven: Vec<BreakevenComponent>,
        config: &StoreConfig,
    ) -> Result<Self> {
        config.validate()?;

        if monthly.len() != MONTHS_PER_YEAR {
            return Err(KpiError::DataIntegrityError(format!(
                "expected {} monthly records, got {}",
                MONTHS_PER_YEAR,
                monthly.len()
            )));
        }

        if !is_calendar_ordered(&monthly) {
            return Err(KpiError::DataIntegrityError(
                "monthly records are not in strictly increasing calendar order".to_string(),
            ));
        }

        for record in &monthly {
            record.validate(config.profit_tolerance)?;
        }

        let breakeven = BreakevenTable::try_from_components(breakeven)?;

        debug!(
            "Validated {} monthly records and {} break-even components",
            monthly.len(),
            breakeven.components().len()
        );

        Ok(Self { monthly, breakeven })
    }

    /// Builds the store from the built-in dataset.
    pub fn load_sample(config: &StoreConfig) -> Result<Self> {
        Self::from_tables(
            sample_monthly_records()?,
            sample_breakeven_components(),
            config,
        )
    }

    /// Process-wide store, built from the built-in dataset on first access.
    ///
    /// Concurrent first callers block until the single initialization
    /// finishes; every caller then sees the same instance. A failed
    /// initialization is not published.
    pub fn global() -> Result<&'static DataStore> {
        GLOBAL_STORE.get_or_try_init(|| {
            debug!("Loading canonical financial tables");
            Self::load_sample(&StoreConfig::default())
        })
    }

    pub fn monthly_records(&self) -> &[MonthlyRecord] {
        trace!("Serving {} monthly records", self.monthly.len());
        &self.monthly
    }

    pub fn breakeven_components(&self) -> &BreakevenTable {
        &self.breakeven
    }

    pub fn snapshot(&self) -> DatasetSnapshot {
        DatasetSnapshot {
            monthly: self.monthly.clone(),
            breakeven: self.breakeven.components().to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    /// The monthly table with every amount rendered as euros.
    pub fn detail_rows(&self) -> Result<Vec<DetailRow>> {
        self.monthly
            .iter()
            .map(|r| {
                Ok(DetailRow {
                    month: r.month.label().to_string(),
                    revenue: format_euro(r.revenue)?,
                    cost: format_euro(r.cost)?,
                    profit: format_euro(r.profit)?,
                })
            })
            .collect()
    }
}

pub fn monthly_records() -> Result<&'static [MonthlyRecord]> {
    Ok(DataStore::global()?.monthly_records())
}

pub fn breakeven_components() -> Result<&'static BreakevenTable> {
    Ok(DataStore::global()?.breakeven_components())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BreakevenCategory, CalendarMonth};

    fn sample_records() -> Vec<MonthlyRecord> {
        sample_monthly_records().unwrap()
    }

    #[test]
    fn test_global_store_is_built_once() {
        let first = DataStore::global().unwrap();
        let second = DataStore::global().unwrap();
        assert!(std::ptr::eq(first, second));
        assert!(std::ptr::eq(
            monthly_records().unwrap().as_ptr(),
            first.monthly_records().as_ptr()
        ));
    }

    #[test]
    fn test_global_store_under_concurrent_first_access() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| DataStore::global().unwrap() as *const DataStore as usize)
            })
            .collect();
        let addresses: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_sample_profits_hold() {
        for record in monthly_records().unwrap() {
            assert!((record.profit - (record.revenue - record.cost)).abs() < 1e-6);
        }
        assert_eq!(
            breakeven_components()
                .unwrap()
                .amount(BreakevenCategory::FixedCosts),
            6399.0
        );
    }

    #[test]
    fn test_profit_mismatch_is_fatal() {
        let mut records = sample_records();
        records[4].profit += 1.0;
        let err = DataStore::from_tables(
            records,
            sample_breakeven_components(),
            &StoreConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            KpiError::ProfitMismatch {
                month: CalendarMonth::May,
                ..
            }
        ));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_tolerance_is_configurable() {
        let mut records = sample_records();
        records[0].profit += 0.004;

        assert!(DataStore::from_tables(
            records.clone(),
            sample_breakeven_components(),
            &StoreConfig::default()
        )
        .is_err());

        let lenient = StoreConfig {
            profit_tolerance: 0.01,
        };
        assert!(DataStore::from_tables(records, sample_breakeven_components(), &lenient).is_ok());
    }

    #[test]
    fn test_rejects_reordered_or_short_tables() {
        let mut records = sample_records();
        records.swap(0, 1);
        assert!(matches!(
            DataStore::from_tables(records, sample_breakeven_components(), &StoreConfig::default()),
            Err(KpiError::DataIntegrityError(_))
        ));

        let mut short = sample_records();
        short.pop();
        assert!(matches!(
            DataStore::from_tables(short, sample_breakeven_components(), &StoreConfig::default()),
            Err(KpiError::DataIntegrityError(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_breakeven_category() {
        let mut components = sample_breakeven_components();
        components[1].category = BreakevenCategory::FixedCosts;
        let err =
            DataStore::from_tables(sample_records(), components, &StoreConfig::default())
                .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_detail_rows_are_formatted() {
        let store = DataStore::load_sample(&StoreConfig::default()).unwrap();
        let rows = store.detail_rows().unwrap();
        assert_eq!(rows.len(), 12);
        assert_eq!(
            rows[11],
            DetailRow {
                month: "Déc".to_string(),
                revenue: "2 736,00 €".to_string(),
                cost: "2 301,52 €".to_string(),
                profit: "434,48 €".to_string(),
            }
        );
    }

    #[test]
    fn test_snapshot_json() {
        let store = DataStore::load_sample(&StoreConfig::default()).unwrap();
        let json = store.to_json().unwrap();
        assert!(json.contains("\"Fév\""));
        assert!(json.contains("\"FixedCosts\""));

        let back: DatasetSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.monthly.len(), 12);
        assert_eq!(back.breakeven.len(), 3);
    }
}
