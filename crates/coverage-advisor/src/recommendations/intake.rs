use std::collections::BTreeSet;

use tracing::{debug, warn};

use super::domain::{
    ActivityFlags, CapitalesInfo, CompanyInfo, CompanyType, ConstructionInfo, DeclaredValue,
    LeasedAsset, LiabilityProfile, Material, Ownership, PremisesOwner, ProductLine, ProductType,
    PropertyExposures, PropertyProfile, ProtectionInfo, RefrigeratedGoods, Region, RiskProfile,
};
use super::form::{
    ActivityStep, CapitalesStep, CompanyStep, ExposureStep, FormSubmission, LooseFlag,
    LooseNumber, ProtectionStep,
};

/// Submission rejected before any rule runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidProfileError {
    #[error("company name is required")]
    MissingCompanyName,
    #[error("company CIF is required")]
    MissingCompanyCif,
}

/// Turns a loosely typed form into the canonical per-line `RiskProfile`.
///
/// Negative and non-finite numbers become `0`. Owner data only survives for tenants, and
/// a tenant's building capital is always `0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileNormalizer;

impl ProfileNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(
        &self,
        submission: &FormSubmission,
        line: ProductLine,
    ) -> Result<RiskProfile, InvalidProfileError> {
        let company = company_info(&submission.company)?;
        let claims_history = trimmed(&submission.claims_history);

        let profile = match line {
            ProductLine::PropertyDamage => RiskProfile::PropertyDamage(PropertyProfile {
                construction: ConstructionInfo {
                    structure: material(&submission.construction.structure),
                    roof: material(&submission.construction.roof),
                    enclosure: material(&submission.construction.enclosure),
                },
                protections: protections(&submission.protections),
                capitales: capitales(&submission.capitales, company.installations),
                exposures: exposures(&submission.exposures),
                all_risk: submission.all_risk.is_set(),
                leased_assets: leased_assets(submission),
                claims_history,
                company,
            }),
            ProductLine::GeneralLiability => {
                let activity = activity(&submission.activity);
                let company_type = CompanyType::classify(&activity, company.cnae_division());
                RiskProfile::GeneralLiability(LiabilityProfile {
                    company,
                    activity,
                    company_type,
                    claims_history,
                })
            }
        };

        debug!(product = %line, "normalized form submission");
        Ok(profile)
    }

    /// Normalizes once per requested line, stopping at the first rejection.
    pub fn normalize_lines(
        &self,
        submission: &FormSubmission,
        lines: &[ProductLine],
    ) -> Result<Vec<RiskProfile>, InvalidProfileError> {
        lines
            .iter()
            .map(|line| self.normalize(submission, *line))
            .collect()
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn amount(value: &Option<LooseNumber>) -> Option<f64> {
    let value = value.as_ref()?;
    let parsed = value.value();
    if let (None, LooseNumber::Text(raw)) = (parsed, value) {
        if !raw.trim().is_empty() {
            warn!(amount = %raw, "ignoring unparseable amount");
        }
    }
    parsed.map(sanitize)
}

fn count(value: &Option<LooseNumber>) -> Option<u32> {
    amount(value).map(|value| value.round().min(u32::MAX as f64) as u32)
}

fn ownership(raw: &Option<String>) -> Ownership {
    let Some(raw) = raw.as_deref() else {
        return Ownership::Other;
    };
    match raw.trim().to_lowercase().as_str() {
        "owner" | "propietario" | "propiedad" | "propia" => Ownership::Owner,
        "tenant" | "inquilino" | "arrendatario" | "alquiler" | "alquilada" => Ownership::Tenant,
        _ => Ownership::Other,
    }
}

fn company_info(step: &CompanyStep) -> Result<CompanyInfo, InvalidProfileError> {
    let name = trimmed(&step.name).ok_or(InvalidProfileError::MissingCompanyName)?;
    let cif = trimmed(&step.cif).ok_or(InvalidProfileError::MissingCompanyCif)?;
    let installations = ownership(&step.installations);

    let owner = match (installations, trimmed(&step.owner_name)) {
        (Ownership::Tenant, Some(owner_name)) => Some(PremisesOwner {
            name: owner_name,
            cif: trimmed(&step.owner_cif).unwrap_or_default(),
        }),
        (Ownership::Tenant, None) => None,
        (_, Some(_)) => {
            debug!(installations = ?installations, "discarding premises owner for non-tenant");
            None
        }
        (_, None) => None,
    };

    Ok(CompanyInfo {
        name,
        cif,
        address: trimmed(&step.address),
        cnae: trimmed(&step.cnae),
        activity: trimmed(&step.activity),
        billing: amount(&step.billing),
        employees: count(&step.employees),
        floor_area: amount(&step.floor_area),
        installations,
        owner,
    })
}

fn material(raw: &Option<String>) -> Material {
    raw.as_deref()
        .map(Material::from_form)
        .unwrap_or_default()
}

fn protections(step: &ProtectionStep) -> ProtectionInfo {
    let automatic_detection = step.automatic_detection.is_set();
    let sprinklers = step.sprinklers.is_set();

    ProtectionInfo {
        extinguishers: step.extinguishers.is_set(),
        hydrants: step.hydrants.is_set(),
        automatic_detection,
        detection_zone: trimmed(&step.detection_zone).filter(|_| automatic_detection),
        sprinklers,
        sprinkler_zone: trimmed(&step.sprinkler_zone).filter(|_| sprinklers),
        water_supply: step.water_supply.is_set(),
        physical_barriers: step.physical_barriers.is_set(),
        private_surveillance: step.private_surveillance.is_set(),
        connected_alarm: step.connected_alarm.is_set(),
        cctv: step.cctv.is_set(),
    }
}

fn capitales(step: &CapitalesStep, installations: Ownership) -> CapitalesInfo {
    let building = match installations {
        Ownership::Tenant => {
            if amount(&step.building).is_some_and(|value| value > 0.0) {
                debug!("tenant declared building capital; forcing it to zero");
            }
            Some(0.0)
        }
        _ => amount(&step.building),
    };

    CapitalesInfo {
        building,
        contents: amount(&step.contents),
        stock: amount(&step.stock),
        electronic_equipment: amount(&step.electronic_equipment),
        gross_margin: amount(&step.gross_margin),
        indemnity_period_months: count(&step.indemnity_period_months).filter(|months| *months > 0),
    }
}

fn declared(flag: &LooseFlag, value: &Option<LooseNumber>) -> Option<DeclaredValue> {
    flag.is_set().then(|| DeclaredValue {
        amount: amount(value),
    })
}

fn exposures(step: &ExposureStep) -> PropertyExposures {
    PropertyExposures {
        third_party_goods: declared(&step.third_party_goods, &step.third_party_goods_value),
        parked_vehicles: declared(&step.parked_vehicles, &step.parked_vehicles_value),
        employee_goods: declared(&step.employee_goods, &step.employee_goods_value),
        refrigerated_goods: step.refrigerated_goods.is_set().then(|| RefrigeratedGoods {
            amount: amount(&step.refrigerated_goods_value),
            temperature_control: step.refrigerated_temperature_control.is_set(),
            automatic_detection: step.refrigerated_automatic_detection.is_set(),
        }),
        outdoor_goods: declared(&step.outdoor_goods, &step.outdoor_goods_value),
        leased_machinery: declared(&step.leased_machinery, &step.leased_machinery_value),
    }
}

fn leased_assets(submission: &FormSubmission) -> Vec<LeasedAsset> {
    submission
        .leasing
        .iter()
        .filter(|entry| !entry.is_blank())
        .map(|entry| LeasedAsset {
            lessor: entry.lessor.clone(),
            cif: entry.cif.clone(),
            contract: entry.contract.clone(),
            asset: entry.asset.clone(),
        })
        .collect()
}

fn activity(step: &ActivityStep) -> ActivityFlags {
    let mut distribution = BTreeSet::new();
    for raw in &step.distribution {
        match Region::from_form(raw) {
            Some(region) => {
                distribution.insert(region);
            }
            None => warn!(region = %raw, "ignoring unknown distribution region"),
        }
    }

    let product_type = step.product_type.as_deref().and_then(|raw| {
        let parsed = ProductType::from_form(raw);
        if parsed.is_none() && !raw.trim().is_empty() {
            warn!(product_type = %raw, "ignoring unknown product type");
        }
        parsed
    });

    ActivityFlags {
        manufactures: step.manufactures.is_set(),
        markets: step.markets.is_set(),
        designs: step.designs.is_set(),
        stores: step.stores.is_set(),
        provides_services: step.provides_services.is_set(),
        product_type,
        human_consumption: step.human_consumption.is_set(),
        distribution,
        subsidiary_locations: step
            .subsidiary_locations
            .iter()
            .map(|location| location.trim())
            .filter(|location| !location.is_empty())
            .map(str::to_string)
            .collect(),
        subcontracts: step.subcontracts.is_set(),
        technical_staff: step.technical_staff.is_set(),
        works_on_adjacent_properties: step.works_on_adjacent_properties.is_set(),
        works_near_conduits: step.works_near_conduits.is_set(),
        works_on_existing_property: step.works_on_existing_property.is_set(),
    }
}
