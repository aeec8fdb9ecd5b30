//! Per-month aggregates, built lazily and memoized.
//!
//! Each [`MonthlyAggregate`] is computed from exactly the source records of
//! its calendar month the first time it is requested, then shared as an
//! `Arc` for the rest of the run.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::debug;

use super::RecordStore;
use crate::models::MonthKey;

/// Aggregate view of one calendar month of source records.
///
/// Per-field arrays hold one entry per record of the month in date order: a
/// record that lacks a field contributes zero at its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyAggregate {
    month: MonthKey,
    day_count: u32,
    record_count: usize,
    values: BTreeMap<String, Vec<Decimal>>,
    sums: BTreeMap<String, Decimal>,
}

impl MonthlyAggregate {
    /// Builds the aggregate for `month` by scanning the store.
    pub fn build(store: &RecordStore, month: MonthKey) -> Self {
        let records = store.records_in_month(month);

        let mut values: BTreeMap<String, Vec<Decimal>> = BTreeMap::new();
        for (position, record) in records.iter().enumerate() {
            for (name, value) in &record.fields {
                let column = values
                    .entry(name.clone())
                    .or_insert_with(|| vec![Decimal::ZERO; records.len()]);
                column[position] = *value;
            }
        }

        let sums = values
            .iter()
            .map(|(name, column)| (name.clone(), column.iter().copied().sum()))
            .collect();

        Self {
            month,
            day_count: month.day_count(),
            record_count: records.len(),
            values,
            sums,
        }
    }

    /// The month this aggregate covers.
    pub fn month(&self) -> MonthKey {
        self.month
    }

    /// Calendar length of the month (`N`), independent of how many records exist.
    pub fn day_count(&self) -> u32 {
        self.day_count
    }

    /// Number of source records found for the month.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Values of `field` in date order; empty when no record carries it.
    pub fn values(&self, field: &str) -> &[Decimal] {
        self.values.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sum of `field` over the month.
    pub fn sum(&self, field: &str) -> Decimal {
        self.sums.get(field).copied().unwrap_or(Decimal::ZERO)
    }

    /// Value of `field` on the month's first record.
    ///
    /// Monthly plan figures are entered once, on the first record of the month.
    pub fn first(&self, field: &str) -> Decimal {
        self.values(field).first().copied().unwrap_or(Decimal::ZERO)
    }
}

/// Build-once cache of [`MonthlyAggregate`]s.
///
/// Concurrent first requests for the same month are serialised by a
/// double-checked write lock, so each month is built exactly once.
///
/// # Example
///
/// ```
/// use balance_engine::models::{DayRecord, MonthKey};
/// use balance_engine::store::{MonthlyContextCache, RecordStore};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let store = RecordStore::from_records(vec![
///     DayRecord::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
///         .with_field("kchng", Decimal::from(400)),
///     DayRecord::new(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap())
///         .with_field("kchng", Decimal::from(410)),
/// ])
/// .unwrap();
/// let cache = MonthlyContextCache::new(&store);
///
/// let january = cache.get(MonthKey::new(2025, 1).unwrap());
/// assert_eq!(january.day_count(), 31);
/// assert_eq!(january.sum("kchng"), Decimal::from(810));
/// ```
#[derive(Debug)]
pub struct MonthlyContextCache<'a> {
    store: &'a RecordStore,
    entries: RwLock<HashMap<MonthKey, Arc<MonthlyAggregate>>>,
    builds: AtomicUsize,
}

impl<'a> MonthlyContextCache<'a> {
    /// Creates an empty cache over `store`.
    pub fn new(store: &'a RecordStore) -> Self {
        Self {
            store,
            entries: RwLock::new(HashMap::new()),
            builds: AtomicUsize::new(0),
        }
    }

    /// Returns the aggregate for `month`, building it on first access.
    pub fn get(&self, month: MonthKey) -> Arc<MonthlyAggregate> {
        if let Some(aggregate) = self.entries.read().get(&month) {
            return Arc::clone(aggregate);
        }

        let mut entries = self.entries.write();
        if let Some(aggregate) = entries.get(&month) {
            return Arc::clone(aggregate);
        }

        let aggregate = Arc::new(MonthlyAggregate::build(self.store, month));
        self.builds.fetch_add(1, Ordering::Relaxed);
        debug!(
            month = %month,
            records = aggregate.record_count(),
            day_count = aggregate.day_count(),
            "built monthly aggregate"
        );
        entries.insert(month, Arc::clone(&aggregate));
        aggregate
    }

    /// Number of cached months.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// How many aggregates have been built since creation.
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }
}
