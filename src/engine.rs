use crate::error::Result;
use crate::metrics;
use crate::schema::{BreakevenTable, MonthlyRecord};
use log::{debug, trace};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

static GLOBAL_ENGINE: Lazy<MetricsEngine> = Lazy::new(MetricsEngine::new);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Metric {
    AnnualRevenue,
    NetResult,
    MarginRatio,
    MonthlyBreakeven,
    BreakevenInDays,
    AverageProfit,
    AverageRevenue,
    GrowthRate,
}

/// Month ordinal plus the bit patterns of revenue, cost and profit.
type RecordKey = (u32, u64, u64, u64);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    metric: Metric,
    scalars: Vec<u64>,
    records: Vec<RecordKey>,
}

impl CacheKey {
    fn new(metric: Metric, scalars: &[f64], records: &[MonthlyRecord]) -> Self {
        Self {
            metric,
            scalars: scalars.iter().map(|v| v.to_bits()).collect(),
            records: records
                .iter()
                .map(|r| {
                    (
                        r.month.ordinal(),
                        r.revenue.to_bits(),
                        r.cost.to_bits(),
                        r.profit.to_bits(),
                    )
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Memoizing front for the functions in [`crate::metrics`].
///
/// Results are keyed on the metric and the exact content of its inputs, so two
/// equal sequences share an entry regardless of where they live. Errors are
/// returned to the caller and never stored.
///
/// Entries are never evicted: every distinct input adds one. Hosts feeding
/// arbitrary record slices to a long-lived engine should call
/// [`MetricsEngine::clear`] periodically.
#[derive(Debug, Default)]
pub struct MetricsEngine {
    cache: RwLock<HashMap<CacheKey, f64>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MetricsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide engine shared by the report builders.
    pub fn global() -> &'static MetricsEngine {
        &GLOBAL_ENGINE
    }

    fn memoize<F>(&self, key: CacheKey, compute: F) -> Result<f64>
    where
        F: FnOnce() -> Result<f64>,
    {
        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(&value) = cache.get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!("Cache hit for {:?}", key.metric);
                return Ok(value);
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = compute()?;
        trace!("Computed {:?} = {}", key.metric, value);

        self.cache
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, value);
        Ok(value)
    }

    pub fn annual_revenue(&self, records: &[MonthlyRecord]) -> Result<f64> {
        let key = CacheKey::new(Metric::AnnualRevenue, &[], records);
        self.memoize(key, || metrics::annual_revenue(records))
    }

    pub fn net_result(&self, records: &[MonthlyRecord]) -> Result<f64> {
        let key = CacheKey::new(Metric::NetResult, &[], records);
        self.memoize(key, || metrics::net_result(records))
    }

    pub fn margin_ratio(&self, records: &[MonthlyRecord]) -> Result<f64> {
        let key = CacheKey::new(Metric::MarginRatio, &[], records);
        self.memoize(key, || metrics::margin_ratio(records))
    }

    pub fn monthly_breakeven(&self, components: &BreakevenTable) -> Result<f64> {
        let amounts: Vec<f64> = components.components().iter().map(|c| c.amount).collect();
        let key = CacheKey::new(Metric::MonthlyBreakeven, &amounts, &[]);
        self.memoize(key, || metrics::monthly_breakeven(components))
    }

    pub fn breakeven_in_days(
        &self,
        monthly_breakeven: f64,
        records: &[MonthlyRecord],
    ) -> Result<f64> {
        let key = CacheKey::new(Metric::BreakevenInDays, &[monthly_breakeven], records);
        self.memoize(key, || metrics::breakeven_in_days(monthly_breakeven, records))
    }

    pub fn average_profit(&self, records: &[MonthlyRecord]) -> Result<f64> {
        let key = CacheKey::new(Metric::AverageProfit, &[], records);
        self.memoize(key, || metrics::average_profit(records))
    }

    pub fn average_revenue(&self, records: &[MonthlyRecord]) -> Result<f64> {
        let key = CacheKey::new(Metric::AverageRevenue, &[], records);
        self.memoize(key, || metrics::average_revenue(records))
    }

    pub fn growth_rate(&self, records: &[MonthlyRecord]) -> Result<f64> {
        let key = CacheKey::new(Metric::GrowthRate, &[], records);
        self.memoize(key, || metrics::growth_rate(records))
    }

    /// Drops every memoized entry. Hit and miss counters are kept.
    pub fn clear(&self) {
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        debug!("Clearing {} memoized metrics", cache.len());
        cache.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache.read().unwrap_or_else(|e| e.into_inner()).len(),
        }
    }
}
