//! Facility balance calculations for the Vankor cluster.
//!
//! Each facility has one calculator implementing [`FacilityCalculator`]. A
//! calculator reads everything through a [`FacilityContext`] and returns the
//! facility's named outputs for one date. Calculators that consume same-date
//! outputs of other facilities declare them, and [`CalculationPlan`] orders
//! the calculators into dependency waves.

mod context;
mod cppn1;
pub mod delivery;
mod kchng;
mod lodochny;
mod rn_vankor;
mod sikn_1208;
mod suzun;
mod tstn;
mod validator;
mod vostok_oil;

use std::collections::BTreeSet;

use crate::error::{EngineError, EngineResult};
use crate::models::{CalculationResult, Facility};

pub use context::{Carry, FacilityContext};
pub use cppn1::Cppn1Calculator;
pub use kchng::KchngCalculator;
pub use lodochny::{LodochnyCalculator, PUMPING_COEFFICIENT_MISMATCH};
pub use rn_vankor::{FIRST_TEN_DAYS, RnVankorCalculator};
pub use sikn_1208::Sikn1208Calculator;
pub use suzun::SuzunCalculator;
pub use tstn::TstnCalculator;
pub use validator::{Validator, check};
pub use vostok_oil::VostokOilCalculator;

/// Computes one facility's outputs for one date.
pub trait FacilityCalculator: Send + Sync {
    /// The facility this calculator produces.
    fn facility(&self) -> Facility;

    /// Facilities whose same-date results this calculator reads.
    fn depends_on(&self) -> &'static [Facility] {
        &[]
    }

    /// Computes the facility's outputs. Must be deterministic.
    fn compute(&self, ctx: &FacilityContext<'_>) -> EngineResult<CalculationResult>;
}

/// One calculator per facility.
pub fn all_calculators() -> Vec<Box<dyn FacilityCalculator>> {
    vec![
        Box::new(SuzunCalculator),
        Box::new(VostokOilCalculator),
        Box::new(KchngCalculator),
        Box::new(LodochnyCalculator),
        Box::new(Cppn1Calculator),
        Box::new(RnVankorCalculator),
        Box::new(Sikn1208Calculator),
        Box::new(TstnCalculator),
    ]
}

/// Calculators grouped into dependency waves.
///
/// Every calculator in a wave depends only on facilities from earlier waves,
/// so calculators within one wave can run in any order or concurrently.
/// Within a wave calculators are ordered by facility.
pub struct CalculationPlan {
    waves: Vec<Vec<Box<dyn FacilityCalculator>>>,
}

impl CalculationPlan {
    /// Orders `calculators` into waves.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidConfig`] when two calculators produce the same
    ///   facility
    /// - [`EngineError::MissingUpstream`] when a declared upstream has no
    ///   calculator
    /// - [`EngineError::CalculationError`] when the dependencies form a cycle
    pub fn new(calculators: Vec<Box<dyn FacilityCalculator>>) -> EngineResult<Self> {
        let mut produced = BTreeSet::new();
        for calculator in &calculators {
            if !produced.insert(calculator.facility()) {
                return Err(EngineError::InvalidConfig {
                    key: calculator.facility().to_string(),
                    message: "facility has more than one calculator".to_string(),
                });
            }
        }
        for calculator in &calculators {
            if let Some(upstream) = calculator
                .depends_on()
                .iter()
                .find(|upstream| !produced.contains(*upstream))
            {
                return Err(EngineError::MissingUpstream {
                    facility: calculator.facility().to_string(),
                    upstream: upstream.to_string(),
                });
            }
        }

        let mut placed = BTreeSet::new();
        let mut remaining = calculators;
        let mut waves = Vec::new();
        while !remaining.is_empty() {
            let (mut ready, blocked): (Vec<_>, Vec<_>) =
                remaining.into_iter().partition(|calculator| {
                    calculator
                        .depends_on()
                        .iter()
                        .all(|upstream| placed.contains(upstream))
                });
            if ready.is_empty() {
                let stuck: Vec<String> =
                    blocked.iter().map(|c| c.facility().to_string()).collect();
                return Err(EngineError::CalculationError {
                    message: format!("dependency cycle between {}", stuck.join(", ")),
                });
            }
            ready.sort_by_key(|calculator| calculator.facility());
            placed.extend(ready.iter().map(|calculator| calculator.facility()));
            waves.push(ready);
            remaining = blocked;
        }

        Ok(Self { waves })
    }

    /// The plan for every facility of the cluster.
    pub fn standard() -> EngineResult<Self> {
        Self::new(all_calculators())
    }

    /// The waves, in execution order.
    pub fn waves(&self) -> &[Vec<Box<dyn FacilityCalculator>>] {
        &self.waves
    }

    /// Facilities in execution order.
    pub fn facilities(&self) -> Vec<Facility> {
        self.waves
            .iter()
            .flatten()
            .map(|calculator| calculator.facility())
            .collect()
    }
}

impl std::fmt::Debug for CalculationPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let waves: Vec<Vec<Facility>> = self
            .waves
            .iter()
            .map(|wave| wave.iter().map(|calculator| calculator.facility()).collect())
            .collect();
        f.debug_struct("CalculationPlan").field("waves", &waves).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub {
        facility: Facility,
        depends_on: &'static [Facility],
    }

    impl FacilityCalculator for Stub {
        fn facility(&self) -> Facility {
            self.facility
        }

        fn depends_on(&self) -> &'static [Facility] {
            self.depends_on
        }

        fn compute(&self, ctx: &FacilityContext<'_>) -> EngineResult<CalculationResult> {
            Ok(ctx.new_result())
        }
    }

    fn stub(facility: Facility, depends_on: &'static [Facility]) -> Box<dyn FacilityCalculator> {
        Box::new(Stub {
            facility,
            depends_on,
        })
    }

    #[test]
    fn test_standard_plan_waves() {
        let plan = CalculationPlan::standard().unwrap();
        let waves: Vec<Vec<Facility>> = plan
            .waves()
            .iter()
            .map(|wave| wave.iter().map(|c| c.facility()).collect())
            .collect();

        assert_eq!(
            waves,
            vec![
                vec![
                    Facility::Suzun,
                    Facility::VostokOil,
                    Facility::Kchng,
                    Facility::RnVankor
                ],
                vec![Facility::Lodochny],
                vec![Facility::Cppn1],
                vec![Facility::Sikn1208],
                vec![Facility::Tstn],
            ]
        );
    }

    #[test]
    fn test_standard_plan_covers_every_facility() {
        let plan = CalculationPlan::standard().unwrap();
        let mut facilities = plan.facilities();
        facilities.sort();
        assert_eq!(facilities, Facility::ALL.to_vec());
    }

    #[test]
    fn test_cycle_is_rejected() {
        let result = CalculationPlan::new(vec![
            stub(Facility::Suzun, &[Facility::Kchng]),
            stub(Facility::Kchng, &[Facility::Suzun]),
        ]);
        assert!(matches!(
            result,
            Err(EngineError::CalculationError { .. })
        ));
    }

    #[test]
    fn test_unknown_upstream_is_rejected() {
        let result = CalculationPlan::new(vec![stub(Facility::Lodochny, &[Facility::Kchng])]);
        assert!(matches!(result, Err(EngineError::MissingUpstream { .. })));
    }

    #[test]
    fn test_duplicate_calculator_is_rejected() {
        let result = CalculationPlan::new(vec![
            stub(Facility::Kchng, &[]),
            stub(Facility::Kchng, &[]),
        ]);
        assert!(matches!(result, Err(EngineError::InvalidConfig { .. })));
    }
}
