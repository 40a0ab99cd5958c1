pub(crate) mod assembler;
pub(crate) mod clauses;
pub(crate) mod format;
pub(crate) mod rules;
pub mod tiers;

pub use assembler::{AssemblyInvariantViolation, AssemblyMode};

use super::domain::{Recommendation, RiskProfile};
use assembler::Assembler;
use rules::{LIABILITY_RULES, PROPERTY_RULES};

/// Stateless engine turning a normalized profile into its recommendation.
///
/// Every renderer goes through this type; nothing else computes limits or decides which
/// coverage applies.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationEngine {
    assembler: Assembler,
}

impl RecommendationEngine {
    pub fn new(mode: AssemblyMode) -> Self {
        Self {
            assembler: Assembler::new(mode),
        }
    }

    pub fn mode(&self) -> AssemblyMode {
        self.assembler.mode()
    }

    pub fn recommend(
        &self,
        profile: &RiskProfile,
    ) -> Result<Recommendation, AssemblyInvariantViolation> {
        match profile {
            RiskProfile::PropertyDamage(property) => self.assembler.assemble(
                profile,
                PROPERTY_RULES.evaluate(property),
                clauses::property_clauses(property),
                &PROPERTY_RULES.mandatory(),
            ),
            RiskProfile::GeneralLiability(liability) => self.assembler.assemble(
                profile,
                LIABILITY_RULES.evaluate(liability),
                clauses::liability_clauses(liability),
                &LIABILITY_RULES.mandatory(),
            ),
        }
    }
}
