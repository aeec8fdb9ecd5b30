//! Facility identifiers.
//!
//! This module defines the [`Facility`] enum naming the eight production and
//! processing sites whose daily balances the engine computes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// One of the facilities modelled by the engine.
///
/// The declaration order is the order in which results are listed in a
/// [`DayRow`](super::DayRow) and in exported reports.
///
/// # Example
///
/// ```
/// use balance_engine::models::Facility;
///
/// assert_eq!(Facility::Cppn1.as_str(), "cppn_1");
/// assert_eq!("sikn_1208".parse::<Facility>().unwrap(), Facility::Sikn1208);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Facility {
    /// Suzun oil treatment unit (UPN Suzun).
    #[serde(rename = "suzun")]
    Suzun,
    /// Vostok Oil (Ichem license area) deliveries via UPN Lodochny.
    #[serde(rename = "vostok_oil")]
    VostokOil,
    /// KCHNG (Russko-Rechenskoye field).
    #[serde(rename = "kchng")]
    Kchng,
    /// Lodochny field and Tagul license area.
    #[serde(rename = "lodochny")]
    Lodochny,
    /// Central oil treatment point No. 1 (UPSV-Yu, UPSV-North, CPS tanks).
    #[serde(rename = "cppn_1")]
    Cppn1,
    /// Deliveries to RN-Vankor through SIKN No. 1209.
    #[serde(rename = "rn_vankor")]
    RnVankor,
    /// Metering station SIKN No. 1208.
    #[serde(rename = "sikn_1208")]
    Sikn1208,
    /// Trunk pipeline tank farm (GNPS, NPS-1, NPS-2, KNPS).
    #[serde(rename = "tstn")]
    Tstn,
}

impl Facility {
    /// Every facility, in declaration order.
    pub const ALL: [Facility; 8] = [
        Facility::Suzun,
        Facility::VostokOil,
        Facility::Kchng,
        Facility::Lodochny,
        Facility::Cppn1,
        Facility::RnVankor,
        Facility::Sikn1208,
        Facility::Tstn,
    ];

    /// Returns the namespace used for this facility's fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Facility::Suzun => "suzun",
            Facility::VostokOil => "vostok_oil",
            Facility::Kchng => "kchng",
            Facility::Lodochny => "lodochny",
            Facility::Cppn1 => "cppn_1",
            Facility::RnVankor => "rn_vankor",
            Facility::Sikn1208 => "sikn_1208",
            Facility::Tstn => "tstn",
        }
    }

    /// Returns the qualified `facility.field` name used by validation tables.
    pub fn qualify(&self, field: &str) -> String {
        format!("{}.{}", self.as_str(), field)
    }
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Facility {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Facility::ALL
            .iter()
            .copied()
            .find(|facility| facility.as_str() == s)
            .ok_or_else(|| EngineError::InvalidConfig {
                key: s.to_string(),
                message: "unknown facility".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_facilities_round_trip_through_names() {
        for facility in Facility::ALL {
            assert_eq!(facility.as_str().parse::<Facility>().unwrap(), facility);
        }
    }

    #[test]
    fn test_serde_uses_namespace_names() {
        let json = serde_json::to_string(&Facility::Sikn1208).unwrap();
        assert_eq!(json, "\"sikn_1208\"");
        let facility: Facility = serde_json::from_str("\"cppn_1\"").unwrap();
        assert_eq!(facility, Facility::Cppn1);
    }

    #[test]
    fn test_qualify_joins_with_dot() {
        assert_eq!(Facility::Tstn.qualify("v_gnps"), "tstn.v_gnps");
    }

    #[test]
    fn test_unknown_facility_is_rejected() {
        let result = "vankor".parse::<Facility>();
        assert!(matches!(result, Err(EngineError::InvalidConfig { .. })));
    }

    #[test]
    fn test_ordering_follows_declaration() {
        let mut shuffled = vec![Facility::Tstn, Facility::Suzun, Facility::Cppn1];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![Facility::Suzun, Facility::Cppn1, Facility::Tstn]
        );
    }
}
