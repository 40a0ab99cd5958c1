use std::collections::BTreeSet;

use tracing::error;

use super::clauses::territorial_scope;
use super::format::{euros_or_na, months, square_meters_or_na, NOT_AVAILABLE};
use super::rules::{indemnity_months, CoverageTerms, MandatoryCoverage};
use crate::recommendations::domain::{
    CapitalesSummary, CompanyInfo, CompanySummary, CoverageItem, ProductLine, PropertyProfile,
    Recommendation, RiskProfile, SpecialClause,
};

/// Reaction to an internal invariant breach while assembling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssemblyMode {
    /// Return the violation to the caller.
    #[default]
    Strict,
    /// Log the violation and repair the recommendation.
    FailSafe,
}

/// Internal defect: the rule set produced an inconsistent recommendation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyInvariantViolation {
    #[error("mandatory coverage '{name}' missing from {line} recommendation")]
    MissingMandatoryCoverage { line: ProductLine, name: String },
    #[error("duplicate {list} entry '{name}' in {line} recommendation")]
    DuplicateName {
        line: ProductLine,
        list: &'static str,
        name: String,
    },
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Assembler {
    mode: AssemblyMode,
}

impl Assembler {
    pub(crate) fn new(mode: AssemblyMode) -> Self {
        Self { mode }
    }

    pub(crate) fn mode(&self) -> AssemblyMode {
        self.mode
    }

    pub(crate) fn assemble(
        &self,
        profile: &RiskProfile,
        coverages: Vec<CoverageItem>,
        special_clauses: Vec<SpecialClause>,
        mandatory: &[MandatoryCoverage],
    ) -> Result<Recommendation, AssemblyInvariantViolation> {
        let line = profile.product_line();
        let coverages = self.ensure_unique(line, "coverage", coverages)?;
        let coverages = self.ensure_mandatory(line, coverages, mandatory)?;
        let special_clauses = self.ensure_unique(line, "special clause", special_clauses)?;

        let company_info = company_summary(profile.company());

        let recommendation = match profile {
            RiskProfile::PropertyDamage(property) => Recommendation {
                kind: line,
                company_info,
                construction_info: Some(property.construction),
                protection_info: Some(property.protections.clone()),
                capitales_info: Some(capitales_summary(property)),
                coverages,
                special_clauses,
                territorial_scope: None,
                claims_history: property.claims_history.clone(),
            },
            RiskProfile::GeneralLiability(liability) => Recommendation {
                kind: line,
                company_info,
                construction_info: None,
                protection_info: None,
                capitales_info: None,
                coverages,
                special_clauses,
                territorial_scope: Some(territorial_scope(&liability.activity)),
                claims_history: liability.claims_history.clone(),
            },
        };

        Ok(recommendation)
    }

    fn ensure_unique(
        &self,
        line: ProductLine,
        list: &'static str,
        items: Vec<CoverageItem>,
    ) -> Result<Vec<CoverageItem>, AssemblyInvariantViolation> {
        let mut seen = BTreeSet::new();
        let mut unique = Vec::with_capacity(items.len());

        for item in items {
            if seen.contains(&item.name) {
                let violation = AssemblyInvariantViolation::DuplicateName {
                    line,
                    list,
                    name: item.name.clone(),
                };
                match self.mode {
                    AssemblyMode::Strict => return Err(violation),
                    AssemblyMode::FailSafe => {
                        error!(%violation, "dropping duplicate entry from recommendation");
                        continue;
                    }
                }
            }
            seen.insert(item.name.clone());
            unique.push(item);
        }

        Ok(unique)
    }

    fn ensure_mandatory(
        &self,
        line: ProductLine,
        mut coverages: Vec<CoverageItem>,
        mandatory: &[MandatoryCoverage],
    ) -> Result<Vec<CoverageItem>, AssemblyInvariantViolation> {
        for (index, required) in mandatory.iter().enumerate() {
            if coverages.iter().any(|item| item.name == required.name) {
                continue;
            }

            let violation = AssemblyInvariantViolation::MissingMandatoryCoverage {
                line,
                name: required.name.to_string(),
            };
            match self.mode {
                AssemblyMode::Strict => return Err(violation),
                AssemblyMode::FailSafe => {
                    error!(%violation, default_limit = required.default_limit, "restoring mandatory coverage");
                    // mandatory rules are declared first, so their index is their slot
                    let position = index.min(coverages.len());
                    coverages.insert(
                        position,
                        CoverageTerms::limit(required.default_limit).into_item(required.name),
                    );
                }
            }
        }

        Ok(coverages)
    }
}

fn text_or_na(value: &Option<String>) -> String {
    value
        .clone()
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn company_summary(company: &CompanyInfo) -> CompanySummary {
    CompanySummary {
        name: company.name.clone(),
        cif: company.cif.clone(),
        address: text_or_na(&company.address),
        cnae: text_or_na(&company.cnae),
        activity: text_or_na(&company.activity),
        billing: euros_or_na(company.billing),
        employees: company
            .employees
            .map(|count| count.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        floor_area: square_meters_or_na(company.floor_area),
        installations: company.installations,
        installations_label: company.installations.label(),
        owner_name: company.owner.as_ref().map(|owner| owner.name.clone()),
        owner_cif: company.owner.as_ref().map(|owner| owner.cif.clone()),
    }
}

fn capitales_summary(profile: &PropertyProfile) -> CapitalesSummary {
    let capitales = &profile.capitales;
    let indemnity_period = if capitales.has_business_interruption() {
        Some(months(indemnity_months(profile)))
    } else {
        None
    };

    CapitalesSummary {
        building: euros_or_na(capitales.building),
        contents: euros_or_na(capitales.contents),
        stock: euros_or_na(capitales.stock),
        electronic_equipment: euros_or_na(capitales.electronic_equipment),
        gross_margin: euros_or_na(capitales.gross_margin),
        indemnity_period,
    }
}
