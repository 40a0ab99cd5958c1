use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::response::Response;
use serde_json::Value;

use crate::recommendations::domain::{
    LiabilityProfile, ProductLine, PropertyProfile, Recommendation, RiskProfile, SessionId,
};
use crate::recommendations::engine::{AssemblyMode, RecommendationEngine};
use crate::recommendations::form::{
    ActivityStep, CapitalesStep, CompanyStep, ConstructionStep, ExposureStep, FormSubmission,
    LeasingEntry, LooseFlag, LooseNumber, ProtectionStep,
};
use crate::recommendations::intake::ProfileNormalizer;
use crate::recommendations::repository::{ProfileRepository, RepositoryError, SessionRecord};
use crate::recommendations::service::RecommendationService;

pub(super) fn num(value: f64) -> Option<LooseNumber> {
    Some(LooseNumber::Number(value))
}

pub(super) fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

pub(super) fn yes() -> LooseFlag {
    LooseFlag::Bool(true)
}

/// Small owner-occupied metal workshop.
pub(super) fn workshop_submission() -> FormSubmission {
    FormSubmission {
        company: CompanyStep {
            name: text("Talleres Hermanos Ruiz S.L."),
            cif: text("B30123456"),
            address: text("Polígono Oeste, parcela 14, Murcia"),
            cnae: text("2562"),
            activity: text("Ingeniería mecánica por cuenta de terceros"),
            billing: num(450_000.0),
            employees: num(6.0),
            floor_area: num(600.0),
            installations: text("propietario"),
            ..CompanyStep::default()
        },
        construction: ConstructionStep {
            structure: text("metalica"),
            roof: text("panel_sandwich"),
            enclosure: text("ladrillo"),
        },
        protections: ProtectionStep {
            extinguishers: yes(),
            connected_alarm: yes(),
            ..ProtectionStep::default()
        },
        capitales: CapitalesStep {
            building: num(300_000.0),
            contents: num(150_000.0),
            stock: num(50_000.0),
            ..CapitalesStep::default()
        },
        activity: ActivityStep {
            manufactures: yes(),
            product_type: text("intermedio"),
            distribution: vec!["espana".to_string()],
            ..ActivityStep::default()
        },
        ..FormSubmission::default()
    }
}

/// Large owner-occupied manufacturer with leasing and business interruption.
pub(super) fn manufacturer_submission() -> FormSubmission {
    FormSubmission {
        company: CompanyStep {
            name: text("Conservas del Segura S.A."),
            cif: text("A30987654"),
            address: text("Carretera de Alicante km 7, Molina de Segura"),
            cnae: text("1039"),
            activity: text("Fabricación de conservas vegetales"),
            billing: Some(LooseNumber::Text("12.500.000".to_string())),
            employees: num(85.0),
            floor_area: num(12_000.0),
            installations: text("propietario"),
            ..CompanyStep::default()
        },
        construction: ConstructionStep {
            structure: text("hormigon"),
            roof: text("metalica"),
            enclosure: text("hormigon"),
        },
        protections: ProtectionStep {
            extinguishers: yes(),
            hydrants: yes(),
            automatic_detection: yes(),
            detection_zone: text("Almacén de producto terminado"),
            sprinklers: yes(),
            physical_barriers: yes(),
            cctv: yes(),
            ..ProtectionStep::default()
        },
        capitales: CapitalesStep {
            building: num(2_500_000.0),
            contents: num(3_800_000.0),
            stock: num(1_200_000.0),
            electronic_equipment: num(180_000.0),
            gross_margin: num(4_000_000.0),
            indemnity_period_months: num(18.0),
        },
        exposures: ExposureStep {
            refrigerated_goods: yes(),
            refrigerated_goods_value: num(250_000.0),
            refrigerated_temperature_control: yes(),
            ..ExposureStep::default()
        },
        activity: ActivityStep {
            manufactures: yes(),
            markets: yes(),
            product_type: text("final"),
            human_consumption: yes(),
            distribution: vec![
                "espana".to_string(),
                "ue".to_string(),
                "usa".to_string(),
            ],
            ..ActivityStep::default()
        },
        leasing: vec![LeasingEntry {
            lessor: "Banco Financiero S.A.".to_string(),
            cif: String::new(),
            contract: "L-456789".to_string(),
            asset: "Carretilla elevadora eléctrica".to_string(),
        }],
        all_risk: yes(),
        claims_history: text("Un siniestro de agua en 2023 (4.200€)"),
        ..FormSubmission::default()
    }
}

/// Tenant distributor whose landlord is declared.
pub(super) fn distributor_submission() -> FormSubmission {
    FormSubmission {
        company: CompanyStep {
            name: text("Distribuciones Levante S.L."),
            cif: text("B46555123"),
            address: text("Calle Mercaderes 3, Valencia"),
            cnae: text("4639"),
            activity: text("Comercio al por mayor de alimentación"),
            billing: num(2_400_000.0),
            employees: num(14.0),
            installations: text("inquilino"),
            owner_name: text("Inmuebles Turia S.A."),
            owner_cif: text("A46000001"),
            ..CompanyStep::default()
        },
        capitales: CapitalesStep {
            building: num(0.0),
            contents: num(400_000.0),
            stock: num(900_000.0),
            ..CapitalesStep::default()
        },
        activity: ActivityStep {
            markets: yes(),
            stores: yes(),
            distribution: vec!["espana".to_string(), "ue".to_string()],
            subsidiary_locations: vec!["Alicante".to_string(), "Castellón".to_string()],
            ..ActivityStep::default()
        },
        ..FormSubmission::default()
    }
}

pub(super) fn property_profile(submission: &FormSubmission) -> PropertyProfile {
    match ProfileNormalizer::new()
        .normalize(submission, ProductLine::PropertyDamage)
        .expect("property profile normalizes")
    {
        RiskProfile::PropertyDamage(profile) => profile,
        other => panic!("expected property profile, got {other:?}"),
    }
}

pub(super) fn liability_profile(submission: &FormSubmission) -> LiabilityProfile {
    match ProfileNormalizer::new()
        .normalize(submission, ProductLine::GeneralLiability)
        .expect("liability profile normalizes")
    {
        RiskProfile::GeneralLiability(profile) => profile,
        other => panic!("expected liability profile, got {other:?}"),
    }
}

pub(super) fn recommend(submission: &FormSubmission, line: ProductLine) -> Recommendation {
    let profile = ProfileNormalizer::new()
        .normalize(submission, line)
        .expect("profile normalizes");
    RecommendationEngine::new(AssemblyMode::Strict)
        .recommend(&profile)
        .expect("recommendation assembles")
}

pub(super) fn limit_of<'a>(recommendation: &'a Recommendation, name: &str) -> &'a str {
    recommendation
        .coverage(name)
        .and_then(|item| item.limit.as_deref())
        .unwrap_or_else(|| panic!("coverage '{name}' with a limit"))
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    records: Arc<Mutex<HashMap<String, SessionRecord>>>,
}

impl ProfileRepository for MemoryRepository {
    fn store(&self, record: SessionRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(record.session_id.0.clone(), record);
        Ok(())
    }

    fn fetch(&self, session_id: &SessionId) -> Result<Option<SessionRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(&session_id.0).cloned())
    }
}

pub(super) struct UnavailableRepository;

impl ProfileRepository for UnavailableRepository {
    fn store(&self, _record: SessionRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("datastore offline".to_string()))
    }

    fn fetch(&self, _session_id: &SessionId) -> Result<Option<SessionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("datastore offline".to_string()))
    }
}

pub(super) fn build_service() -> (Arc<RecommendationService<MemoryRepository>>, Arc<MemoryRepository>)
{
    let repository = Arc::new(MemoryRepository::default());
    let service = Arc::new(RecommendationService::new(
        repository.clone(),
        AssemblyMode::Strict,
    ));
    (service, repository)
}

pub(super) async fn read_json(response: Response) -> Value {
    let body: Body = response.into_body();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json body")
}
