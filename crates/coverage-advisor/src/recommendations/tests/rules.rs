use super::common::*;
use crate::recommendations::domain::ProductLine;
use crate::recommendations::engine::rules::{
    ADJACENT_DAMAGE, BUSINESS_INTERRUPTION, CONDUIT_DAMAGE, ELECTRICAL_DAMAGE,
    ELECTRONIC_EQUIPMENT, EMPLOYER_LIABILITY, FIRE, GENERAL_LIABILITY, GLASS_BREAKAGE,
    LIABILITY_RULES, PARKED_VEHICLES, PREEXISTING_PROPERTY, PRODUCT_LIABILITY, PRODUCT_RECALL,
    PROPERTY_OWNER_LIABILITY, PROPERTY_RULES, REFRIGERATED_GOODS, SUBCONTRACTOR_LIABILITY,
    TECHNICAL_STAFF_LIABILITY, TENANT_LIABILITY, THEFT, UNION_AND_MIXTURE, WATER_DAMAGE,
    WEATHER,
};

fn property_limit(building: f64, contents: f64, stock: f64, name: &str) -> String {
    let mut submission = workshop_submission();
    submission.capitales.building = num(building);
    submission.capitales.contents = num(contents);
    submission.capitales.stock = num(stock);

    PROPERTY_RULES
        .evaluate(&property_profile(&submission))
        .into_iter()
        .find(|item| item.name == name)
        .and_then(|item| item.limit)
        .unwrap_or_else(|| panic!("{name} fires"))
}

#[test]
fn mandatory_property_coverages_lead_in_declared_order() {
    let names: Vec<_> = PROPERTY_RULES
        .mandatory()
        .into_iter()
        .map(|coverage| coverage.name)
        .collect();
    assert_eq!(
        names,
        vec![FIRE, WEATHER, WATER_DAMAGE, ELECTRICAL_DAMAGE, THEFT, GLASS_BREAKAGE]
    );
    assert_eq!(&PROPERTY_RULES.names()[..6], names.as_slice());

    let liability: Vec<_> = LIABILITY_RULES
        .mandatory()
        .into_iter()
        .map(|coverage| coverage.name)
        .collect();
    assert_eq!(liability, vec![GENERAL_LIABILITY]);
}

#[test]
fn electrical_limit_uses_inclusive_building_thresholds() {
    assert_eq!(
        property_limit(499_999.99, 0.0, 0.0, ELECTRICAL_DAMAGE),
        "30.000€"
    );
    assert_eq!(property_limit(500_000.0, 0.0, 0.0, ELECTRICAL_DAMAGE), "60.000€");
    assert_eq!(property_limit(999_999.0, 0.0, 0.0, ELECTRICAL_DAMAGE), "60.000€");
    assert_eq!(
        property_limit(1_000_000.0, 0.0, 0.0, ELECTRICAL_DAMAGE),
        "100.000€"
    );
}

#[test]
fn theft_percentage_switches_at_one_million_total_capital() {
    assert_eq!(
        property_limit(400_000.0, 400_000.0, 199_999.0, THEFT),
        "25% de los capitales asegurados"
    );
    assert_eq!(
        property_limit(400_000.0, 400_000.0, 200_000.0, THEFT),
        "50% de los capitales asegurados"
    );
}

#[test]
fn theft_requires_verification_without_barriers_or_alarm() {
    let mut submission = workshop_submission();
    submission.protections.connected_alarm = Default::default();

    let items = PROPERTY_RULES.evaluate(&property_profile(&submission));
    let theft = items
        .iter()
        .find(|item| item.name == THEFT)
        .expect("theft fires");
    assert!(theft
        .condition
        .as_deref()
        .is_some_and(|condition| condition.contains("Sujeto a verificación")));
}

#[test]
fn optional_property_coverages_fire_only_when_declared() {
    let workshop = PROPERTY_RULES.evaluate(&property_profile(&workshop_submission()));
    let names: Vec<_> = workshop.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(
        names,
        vec![FIRE, WEATHER, WATER_DAMAGE, ELECTRICAL_DAMAGE, THEFT, GLASS_BREAKAGE]
    );

    let manufacturer = PROPERTY_RULES.evaluate(&property_profile(&manufacturer_submission()));
    let names: Vec<_> = manufacturer.iter().map(|item| item.name.as_str()).collect();
    assert!(names.contains(&ELECTRONIC_EQUIPMENT));
    assert!(names.contains(&BUSINESS_INTERRUPTION));
    assert!(names.contains(&REFRIGERATED_GOODS));
}

#[test]
fn business_interruption_carries_margin_and_indemnity_period() {
    let items = PROPERTY_RULES.evaluate(&property_profile(&manufacturer_submission()));
    let interruption = items
        .iter()
        .find(|item| item.name == BUSINESS_INTERRUPTION)
        .expect("margin declared");
    assert_eq!(interruption.limit.as_deref(), Some("4.000.000€"));
    assert_eq!(
        interruption.condition.as_deref(),
        Some("Periodo de indemnización: 18 meses")
    );
}

#[test]
fn declared_exposure_without_amount_shows_not_available() {
    let mut submission = workshop_submission();
    submission.exposures.parked_vehicles = yes();

    let items = PROPERTY_RULES.evaluate(&property_profile(&submission));
    let vehicles = items
        .iter()
        .find(|item| item.name == PARKED_VEHICLES)
        .expect("flag ticked");
    assert_eq!(vehicles.limit.as_deref(), Some("N/A"));
}

#[test]
fn refrigerated_goods_list_declared_measures() {
    let items = PROPERTY_RULES.evaluate(&property_profile(&manufacturer_submission()));
    let refrigerated = items
        .iter()
        .find(|item| item.name == REFRIGERATED_GOODS)
        .expect("refrigerated goods declared");
    assert_eq!(refrigerated.limit.as_deref(), Some("250.000€"));
    assert!(refrigerated
        .condition
        .as_deref()
        .is_some_and(|condition| condition.ends_with("Medidas declaradas: control de temperatura")));
}

#[test]
fn general_liability_limits_switch_at_one_million_billing() {
    let mut submission = workshop_submission();

    submission.company.billing = num(999_999.0);
    let recommendation = recommend(&submission, ProductLine::GeneralLiability);
    assert_eq!(limit_of(&recommendation, GENERAL_LIABILITY), "600.000€");

    submission.company.billing = num(1_000_000.0);
    let recommendation = recommend(&submission, ProductLine::GeneralLiability);
    let general = recommendation
        .coverage(GENERAL_LIABILITY)
        .expect("general liability is mandatory");
    assert_eq!(general.limit.as_deref(), Some("1.000.000€"));
    assert_eq!(general.sublimit.as_deref(), Some("600.000€ por víctima"));
}

#[test]
fn missing_billing_computes_as_zero() {
    let mut submission = workshop_submission();
    submission.company.billing = None;

    let recommendation = recommend(&submission, ProductLine::GeneralLiability);
    assert_eq!(limit_of(&recommendation, GENERAL_LIABILITY), "600.000€");
    assert_eq!(recommendation.company_info().billing, "N/A");
}

#[test]
fn premises_liability_follows_ownership() {
    let owner = LIABILITY_RULES.evaluate(&liability_profile(&workshop_submission()));
    assert!(owner.iter().any(|item| item.name == PROPERTY_OWNER_LIABILITY));
    assert!(owner.iter().all(|item| item.name != TENANT_LIABILITY));

    let tenant = LIABILITY_RULES.evaluate(&liability_profile(&distributor_submission()));
    assert!(tenant.iter().all(|item| item.name != PROPERTY_OWNER_LIABILITY));
    let locativa = tenant
        .iter()
        .find(|item| item.name == TENANT_LIABILITY)
        .expect("tenant gets locativa");
    assert!(locativa
        .condition
        .as_deref()
        .is_some_and(|condition| condition.contains("Inmuebles Turia S.A.")));

    let mut other = workshop_submission();
    other.company.installations = text("cedida");
    let other = LIABILITY_RULES.evaluate(&liability_profile(&other));
    assert!(other
        .iter()
        .all(|item| item.name != PROPERTY_OWNER_LIABILITY && item.name != TENANT_LIABILITY));
}

#[test]
fn product_rules_follow_activity() {
    let workshop = LIABILITY_RULES.evaluate(&liability_profile(&workshop_submission()));
    let names: Vec<_> = workshop.iter().map(|item| item.name.as_str()).collect();
    assert!(names.contains(&PRODUCT_LIABILITY));
    assert!(names.contains(&UNION_AND_MIXTURE));
    assert!(!names.contains(&PRODUCT_RECALL));
    assert!(names.contains(&EMPLOYER_LIABILITY));

    let manufacturer = LIABILITY_RULES.evaluate(&liability_profile(&manufacturer_submission()));
    let names: Vec<_> = manufacturer.iter().map(|item| item.name.as_str()).collect();
    assert!(names.contains(&PRODUCT_RECALL));
    assert!(!names.contains(&UNION_AND_MIXTURE));
    let recall = manufacturer
        .iter()
        .find(|item| item.name == PRODUCT_RECALL)
        .expect("human consumption declared");
    assert_eq!(recall.limit.as_deref(), Some("900.000€"));
}

#[test]
fn service_work_rules_need_a_service_company() {
    let mut submission = workshop_submission();
    submission.activity.works_on_adjacent_properties = yes();
    submission.activity.works_near_conduits = yes();
    submission.activity.works_on_existing_property = yes();

    let manufacturing = LIABILITY_RULES.evaluate(&liability_profile(&submission));
    assert!(manufacturing.iter().all(|item| {
        item.name != ADJACENT_DAMAGE
            && item.name != CONDUIT_DAMAGE
            && item.name != PREEXISTING_PROPERTY
    }));

    submission.activity.provides_services = yes();
    let mixed = LIABILITY_RULES.evaluate(&liability_profile(&submission));
    let limits: Vec<_> = mixed
        .iter()
        .filter(|item| {
            [ADJACENT_DAMAGE, CONDUIT_DAMAGE, PREEXISTING_PROPERTY].contains(&item.name.as_str())
        })
        .map(|item| item.limit.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(limits, vec!["300.000€", "150.000€", "150.000€"]);
}

#[test]
fn subcontracting_and_technical_staff_add_their_coverages() {
    let mut submission = distributor_submission();
    submission.activity.subcontracts = yes();
    submission.activity.technical_staff = yes();

    let items = LIABILITY_RULES.evaluate(&liability_profile(&submission));
    let subcontractors = items
        .iter()
        .find(|item| item.name == SUBCONTRACTOR_LIABILITY)
        .expect("subcontracting declared");
    assert_eq!(subcontractors.limit.as_deref(), Some("1.000.000€"));
    assert!(items.iter().any(|item| item.name == TECHNICAL_STAFF_LIABILITY));
}

#[test]
fn every_fired_item_is_required_and_unique() {
    for submission in [
        workshop_submission(),
        manufacturer_submission(),
        distributor_submission(),
    ] {
        for items in [
            PROPERTY_RULES.evaluate(&property_profile(&submission)),
            LIABILITY_RULES.evaluate(&liability_profile(&submission)),
        ] {
            let mut names: Vec<_> = items.iter().map(|item| item.name.clone()).collect();
            assert!(items.iter().all(|item| item.required));
            let total = names.len();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), total);
        }
    }
}
