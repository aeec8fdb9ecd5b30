//! Request types for the balance engine API.
//!
//! This module defines the JSON request structures for the `/run` and
//! `/report` endpoints.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::DayRecord;
use crate::store::Override;

/// Request body for the `/run` and `/report` endpoints.
///
/// Contains the source records, any manual values, and the inclusive date
/// range to process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    /// Daily source records.
    pub records: Vec<RecordRequest>,
    /// Manual values per (parameter, date).
    #[serde(default)]
    pub overrides: Vec<OverrideRequest>,
    /// First date to process.
    pub start_date: NaiveDate,
    /// Last date to process (inclusive).
    pub end_date: NaiveDate,
}

/// One day of source data: a date plus named numeric fields.
///
/// ```json
/// {"date": "2025-01-01", "gtm_vn": "10000", "kchng": "400"}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordRequest {
    /// The record date.
    pub date: NaiveDate,
    /// Field values keyed by field name.
    #[serde(flatten)]
    pub fields: BTreeMap<String, Decimal>,
}

/// A manual value in a run request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideRequest {
    /// Parameter or raw field name.
    pub parameter: String,
    /// The date the value applies to.
    pub date: NaiveDate,
    /// The value.
    pub value: Decimal,
}

impl From<RecordRequest> for DayRecord {
    fn from(req: RecordRequest) -> Self {
        DayRecord {
            date: req.date,
            fields: req.fields,
        }
    }
}

impl From<OverrideRequest> for Override {
    fn from(req: OverrideRequest) -> Self {
        Override {
            parameter: req.parameter,
            date: req.date,
            value: req.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_record_fields_are_flattened() {
        let json = r#"{"date": "2025-01-02", "kchng": "410", "gtm_vn": "10000.5"}"#;
        let record: DayRecord = serde_json::from_str::<RecordRequest>(json).unwrap().into();

        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert_eq!(record.value("kchng"), Decimal::from(410));
        assert_eq!(record.value("gtm_vn"), Decimal::from_str("10000.5").unwrap());
    }

    #[test]
    fn test_overrides_default_to_empty() {
        let json = r#"{
            "records": [],
            "start_date": "2025-01-01",
            "end_date": "2025-01-03"
        }"#;
        let request: RunRequest = serde_json::from_str(json).unwrap();
        assert!(request.overrides.is_empty());
    }

    #[test]
    fn test_missing_dates_are_rejected() {
        let json = r#"{"records": []}"#;
        let result: Result<RunRequest, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
