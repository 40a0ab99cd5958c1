use std::collections::BTreeSet;

use super::format::percent;
use super::rules::CoverageTerms;
use crate::recommendations::domain::{
    ActivityFlags, LeasedAsset, LiabilityProfile, Ownership, PropertyProfile, Region,
    SpecialClause, TerritorialScope,
};

pub(crate) const AUTOMATIC_PROPERTY_COVER: &str = "Cobertura automática para Daños materiales";
pub(crate) const AUTOMATIC_INTERRUPTION_COVER: &str =
    "Cobertura automática para Pérdida de beneficios";
pub(crate) const REPLACEMENT_VALUE: &str = "Cláusula de Valor de reposición a nuevo";
pub(crate) const ALL_RISK: &str = "Cláusula todo riesgo accidental";
pub(crate) const LEASING_PREFIX: &str = "Cláusula de Leasing para";
pub(crate) const ADDITIONAL_INSURED: &str = "Asegurado adicional";
pub(crate) const SECONDARY_SITES: &str = "Ampliación a centros secundarios";

const AUTOMATIC_PROPERTY_PERCENT: u8 = 20;
const AUTOMATIC_INTERRUPTION_PERCENT: u8 = 30;

/// Special clauses for the property line, in fixed order.
pub(crate) fn property_clauses(profile: &PropertyProfile) -> Vec<SpecialClause> {
    let mut clauses = vec![CoverageTerms::limit(percent(AUTOMATIC_PROPERTY_PERCENT))
        .with_condition("Incremento automático de capitales por revalorización o nuevas adquisiciones")
        .into_item(AUTOMATIC_PROPERTY_COVER)];

    if profile.capitales.has_business_interruption() {
        clauses.push(
            CoverageTerms::limit(percent(AUTOMATIC_INTERRUPTION_PERCENT))
                .with_condition("Incremento automático del margen bruto declarado")
                .into_item(AUTOMATIC_INTERRUPTION_COVER),
        );
    }

    clauses.push(
        CoverageTerms::unlimited()
            .with_condition("Indemnización a valor de reposición a nuevo, sin deducción por uso o antigüedad")
            .into_item(REPLACEMENT_VALUE),
    );

    if profile.all_risk {
        clauses.push(
            CoverageTerms::unlimited()
                .with_condition("Cubre cualquier daño material accidental no excluido expresamente")
                .into_item(ALL_RISK),
        );
    }

    clauses.extend(leasing_clauses(&profile.leased_assets));
    clauses
}

/// One clause per leased asset. A lessor seen twice gets its contract number appended so
/// names stay unique. Rows without a lessor are named after their contract, then their asset.
pub(crate) fn leasing_clauses(assets: &[LeasedAsset]) -> Vec<SpecialClause> {
    let mut taken = BTreeSet::new();
    let mut clauses = Vec::with_capacity(assets.len());

    for asset in assets {
        let base = format!("{LEASING_PREFIX} {}", leasing_label(asset));
        let mut name = base.clone();
        if taken.contains(&name) {
            name = format!("{base} (contrato {})", asset.contract);
        }
        let mut ordinal = 2;
        while taken.contains(&name) {
            name = format!("{base} (contrato {}) #{ordinal}", asset.contract);
            ordinal += 1;
        }
        taken.insert(name.clone());

        let condition = format!(
            "Se designa beneficiario a {} (CIF: {}) respecto del bien \"{}\", objeto del contrato de leasing nº {}",
            asset.lessor, asset.cif, asset.asset, asset.contract
        );
        clauses.push(CoverageTerms::unlimited().with_condition(condition).into_item(name));
    }

    clauses
}

fn leasing_label(asset: &LeasedAsset) -> String {
    let lessor = asset.lessor.trim();
    let contract = asset.contract.trim();
    if !lessor.is_empty() {
        lessor.to_string()
    } else if !contract.is_empty() {
        format!("contrato {contract}")
    } else {
        asset.asset.trim().to_string()
    }
}

/// Special clauses for the liability line.
pub(crate) fn liability_clauses(profile: &LiabilityProfile) -> Vec<SpecialClause> {
    let mut clauses = Vec::new();

    if profile.company.installations == Ownership::Tenant {
        if let Some(owner) = &profile.company.owner {
            clauses.push(
                CoverageTerms::unlimited()
                    .with_condition(format!(
                        "Se incluye como asegurado adicional a {} (CIF: {}) en su condición de propietario de las instalaciones arrendadas",
                        owner.name, owner.cif
                    ))
                    .into_item(ADDITIONAL_INSURED),
            );
        }
    }

    let locations = &profile.activity.subsidiary_locations;
    if !locations.is_empty() {
        clauses.push(
            CoverageTerms::unlimited()
                .with_condition(format!(
                    "Se extienden las coberturas a los centros de: {}",
                    locations.join(", ")
                ))
                .into_item(SECONDARY_SITES),
        );
    }

    clauses
}

/// Widest declared market decides both scope and jurisdiction.
pub(crate) fn territorial_scope(activity: &ActivityFlags) -> TerritorialScope {
    let (scope, jurisdiction) = match activity.distribution.iter().max() {
        Some(Region::UsaCanada) => ("Todo el mundo incluidos USA y Canadá", "Todo el mundo"),
        Some(Region::Worldwide) => ("Todo el mundo excepto USA y Canadá", "Unión Europea"),
        Some(Region::EuropeanUnion) => ("Unión Europea", "Unión Europea"),
        Some(Region::Spain) | None => ("España", "España"),
    };

    TerritorialScope {
        scope: scope.to_string(),
        jurisdiction: jurisdiction.to_string(),
    }
}
