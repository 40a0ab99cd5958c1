use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for a form session held by the external session layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// Insurance product line a recommendation is derived for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProductLine {
    #[serde(rename = "danos_materiales")]
    PropertyDamage,
    #[serde(rename = "responsabilidad_civil")]
    GeneralLiability,
}

impl ProductLine {
    pub const ALL: [ProductLine; 2] = [ProductLine::PropertyDamage, ProductLine::GeneralLiability];

    pub const fn code(self) -> &'static str {
        match self {
            ProductLine::PropertyDamage => "danos_materiales",
            ProductLine::GeneralLiability => "responsabilidad_civil",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ProductLine::PropertyDamage => "Daños materiales",
            ProductLine::GeneralLiability => "Responsabilidad civil",
        }
    }
}

impl fmt::Display for ProductLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Raised when a product path segment names no known line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown product '{0}' (expected danos_materiales, responsabilidad_civil or todos)")]
pub struct UnknownProduct(pub String);

impl FromStr for ProductLine {
    type Err = UnknownProduct;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "danos_materiales" | "danos" | "property" => Ok(ProductLine::PropertyDamage),
            "responsabilidad_civil" | "rc" | "liability" => Ok(ProductLine::GeneralLiability),
            _ => Err(UnknownProduct(raw.to_string())),
        }
    }
}

/// Product selection accepted by the recommendation endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSelection {
    Single(ProductLine),
    All,
}

impl ProductSelection {
    pub fn lines(self) -> Vec<ProductLine> {
        match self {
            ProductSelection::Single(line) => vec![line],
            ProductSelection::All => ProductLine::ALL.to_vec(),
        }
    }
}

impl FromStr for ProductSelection {
    type Err = UnknownProduct;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "todos" | "all" => Ok(ProductSelection::All),
            _ => raw.parse().map(ProductSelection::Single),
        }
    }
}

/// Relationship between the insured company and the premises it operates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
    Owner,
    Tenant,
    #[default]
    Other,
}

impl Ownership {
    pub const fn label(self) -> &'static str {
        match self {
            Ownership::Owner => "Propietario",
            Ownership::Tenant => "Inquilino",
            Ownership::Other => "Otro",
        }
    }
}

/// Landlord of the premises, only kept for tenant profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremisesOwner {
    pub name: String,
    pub cif: String,
}

/// Identification and size of the company requesting the recommendation (the tomador).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    pub cif: String,
    pub address: Option<String>,
    pub cnae: Option<String>,
    pub activity: Option<String>,
    pub billing: Option<f64>,
    pub employees: Option<u32>,
    pub floor_area: Option<f64>,
    pub installations: Ownership,
    pub owner: Option<PremisesOwner>,
}

impl CompanyInfo {
    /// Annual billing used by the liability tiers; missing billing computes as zero.
    pub fn billing_amount(&self) -> f64 {
        self.billing.unwrap_or(0.0)
    }

    /// Two-digit CNAE division, when the code starts with two digits.
    pub fn cnae_division(&self) -> Option<u8> {
        let code = self.cnae.as_deref()?.trim();
        let digits: String = code.chars().take(2).collect();
        if digits.len() == 2 && digits.chars().all(|c| c.is_ascii_digit()) {
            digits.parse().ok()
        } else {
            None
        }
    }
}

/// Fixed enumeration of construction materials collected by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    Hormigon,
    Metalica,
    Madera,
    Mixta,
    PanelSandwich,
    Ladrillo,
    #[default]
    NoInformado,
}

impl Material {
    pub const fn label(self) -> &'static str {
        match self {
            Material::Hormigon => "Hormigón",
            Material::Metalica => "Metálica",
            Material::Madera => "Madera",
            Material::Mixta => "Mixta",
            Material::PanelSandwich => "Panel sándwich",
            Material::Ladrillo => "Ladrillo",
            Material::NoInformado => "No informado",
        }
    }

    /// Lenient parse used by the form normalizer; unknown values are `NoInformado`.
    pub fn from_form(raw: &str) -> Self {
        match fold(raw).as_str() {
            "hormigon" | "hormigon_armado" => Material::Hormigon,
            "metalica" | "metal" | "acero" => Material::Metalica,
            "madera" => Material::Madera,
            "mixta" => Material::Mixta,
            "panel_sandwich" | "sandwich" => Material::PanelSandwich,
            "ladrillo" | "obra" => Material::Ladrillo,
            _ => Material::NoInformado,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructionInfo {
    pub structure: Material,
    pub roof: Material,
    pub enclosure: Material,
}

/// Fire and theft protections declared for the premises.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionInfo {
    pub extinguishers: bool,
    pub hydrants: bool,
    pub automatic_detection: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_zone: Option<String>,
    pub sprinklers: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprinkler_zone: Option<String>,
    pub water_supply: bool,
    pub physical_barriers: bool,
    pub private_surveillance: bool,
    pub connected_alarm: bool,
    pub cctv: bool,
}

impl ProtectionInfo {
    /// Human readable list of the declared measures, in form order.
    pub fn measures(&self) -> Vec<String> {
        let mut measures = Vec::new();
        if self.extinguishers {
            measures.push("Extintores".to_string());
        }
        if self.hydrants {
            measures.push("Bocas de incendio equipadas".to_string());
        }
        if self.automatic_detection {
            measures.push(with_zone("Detección automática", &self.detection_zone));
        }
        if self.sprinklers {
            measures.push(with_zone("Rociadores automáticos", &self.sprinkler_zone));
        }
        if self.water_supply {
            measures.push("Abastecimiento de agua propio".to_string());
        }
        if self.physical_barriers {
            measures.push("Protecciones físicas".to_string());
        }
        if self.private_surveillance {
            measures.push("Vigilancia privada".to_string());
        }
        if self.connected_alarm {
            measures.push("Alarma conectada a central".to_string());
        }
        if self.cctv {
            measures.push("CCTV".to_string());
        }
        measures
    }
}

fn with_zone(label: &str, zone: &Option<String>) -> String {
    match zone {
        Some(zone) => format!("{label} (zona: {zone})"),
        None => label.to_string(),
    }
}

/// Insured values; `None` means the user never filled the field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CapitalesInfo {
    pub building: Option<f64>,
    pub contents: Option<f64>,
    pub stock: Option<f64>,
    pub electronic_equipment: Option<f64>,
    pub gross_margin: Option<f64>,
    pub indemnity_period_months: Option<u32>,
}

impl CapitalesInfo {
    pub fn building_value(&self) -> f64 {
        self.building.unwrap_or(0.0)
    }

    pub fn electronic_equipment_value(&self) -> f64 {
        self.electronic_equipment.unwrap_or(0.0)
    }

    pub fn gross_margin_value(&self) -> f64 {
        self.gross_margin.unwrap_or(0.0)
    }

    /// Building + contents + stock, the base for the theft tier.
    pub fn material_capital(&self) -> f64 {
        self.building_value() + self.contents.unwrap_or(0.0) + self.stock.unwrap_or(0.0)
    }

    pub fn has_business_interruption(&self) -> bool {
        self.gross_margin_value() > 0.0
    }
}

/// A flag-gated exposure with the amount the user typed next to it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DeclaredValue {
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RefrigeratedGoods {
    pub amount: Option<f64>,
    pub temperature_control: bool,
    pub automatic_detection: bool,
}

/// Optional property exposures; `Some` means the matching form flag was ticked.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PropertyExposures {
    pub third_party_goods: Option<DeclaredValue>,
    pub parked_vehicles: Option<DeclaredValue>,
    pub employee_goods: Option<DeclaredValue>,
    pub refrigerated_goods: Option<RefrigeratedGoods>,
    pub outdoor_goods: Option<DeclaredValue>,
    pub leased_machinery: Option<DeclaredValue>,
}

/// Asset financed through leasing; fields are echoed verbatim into clauses.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeasedAsset {
    pub lessor: String,
    pub cif: String,
    pub contract: String,
    pub asset: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    Intermediate,
    Final,
}

/// Markets a liability insured distributes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    #[serde(alias = "espana")]
    Spain,
    #[serde(alias = "ue", alias = "union_europea")]
    EuropeanUnion,
    #[serde(alias = "mundial", alias = "resto_mundo")]
    Worldwide,
    #[serde(alias = "usa_canada", alias = "usa")]
    UsaCanada,
}

impl Region {
    pub fn from_form(raw: &str) -> Option<Self> {
        match fold(raw).as_str() {
            "spain" | "espana" | "nacional" => Some(Region::Spain),
            "european_union" | "ue" | "union_europea" | "europa" => Some(Region::EuropeanUnion),
            "worldwide" | "mundial" | "resto_mundo" | "todo_el_mundo" => Some(Region::Worldwide),
            "usa_canada" | "usa" | "canada" | "eeuu" => Some(Region::UsaCanada),
            _ => None,
        }
    }
}

impl ProductType {
    pub fn from_form(raw: &str) -> Option<Self> {
        match fold(raw).as_str() {
            "intermediate" | "intermedio" | "componente" => Some(ProductType::Intermediate),
            "final" | "producto_final" => Some(ProductType::Final),
            _ => None,
        }
    }
}

/// Lowercases, strips accents and turns separators into `_`.
fn fold(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            'ñ' => 'n',
            ' ' | '-' | '/' => '_',
            other => other,
        })
        .collect()
}

/// Activity questionnaire for the general-liability line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActivityFlags {
    pub manufactures: bool,
    pub markets: bool,
    pub designs: bool,
    pub stores: bool,
    pub provides_services: bool,
    pub product_type: Option<ProductType>,
    pub human_consumption: bool,
    pub distribution: BTreeSet<Region>,
    pub subsidiary_locations: Vec<String>,
    pub subcontracts: bool,
    pub technical_staff: bool,
    pub works_on_adjacent_properties: bool,
    pub works_near_conduits: bool,
    pub works_on_existing_property: bool,
}

impl ActivityFlags {
    fn any_product_flag(&self) -> bool {
        self.manufactures || self.markets || self.designs || self.stores
    }
}

/// Company classification driving the product/service liability rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyType {
    Manufacturing,
    Services,
    Mixed,
    Unclassified,
}

impl CompanyType {
    /// Activity flags decide; the CNAE division only breaks ties when no flag is set.
    pub fn classify(activity: &ActivityFlags, cnae_division: Option<u8>) -> Self {
        match (activity.any_product_flag(), activity.provides_services) {
            (true, true) => CompanyType::Mixed,
            (true, false) => CompanyType::Manufacturing,
            (false, true) => CompanyType::Services,
            (false, false) => match cnae_division {
                Some(10..=33) => CompanyType::Manufacturing,
                Some(_) => CompanyType::Services,
                None => CompanyType::Unclassified,
            },
        }
    }

    pub fn handles_products(self) -> bool {
        matches!(self, CompanyType::Manufacturing | CompanyType::Mixed)
    }

    pub fn provides_services(self) -> bool {
        matches!(self, CompanyType::Services | CompanyType::Mixed)
    }
}

/// Canonical profile for the property-damage line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyProfile {
    pub company: CompanyInfo,
    pub construction: ConstructionInfo,
    pub protections: ProtectionInfo,
    pub capitales: CapitalesInfo,
    pub exposures: PropertyExposures,
    pub all_risk: bool,
    pub leased_assets: Vec<LeasedAsset>,
    pub claims_history: Option<String>,
}

/// Canonical profile for the general-liability line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiabilityProfile {
    pub company: CompanyInfo,
    pub activity: ActivityFlags,
    pub company_type: CompanyType,
    pub claims_history: Option<String>,
}

/// Fully-typed input to the engine, one variant per product line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "profile")]
pub enum RiskProfile {
    #[serde(rename = "danos_materiales")]
    PropertyDamage(PropertyProfile),
    #[serde(rename = "responsabilidad_civil")]
    GeneralLiability(LiabilityProfile),
}

impl RiskProfile {
    pub fn product_line(&self) -> ProductLine {
        match self {
            RiskProfile::PropertyDamage(_) => ProductLine::PropertyDamage,
            RiskProfile::GeneralLiability(_) => ProductLine::GeneralLiability,
        }
    }

    pub fn company(&self) -> &CompanyInfo {
        match self {
            RiskProfile::PropertyDamage(profile) => &profile.company,
            RiskProfile::GeneralLiability(profile) => &profile.company,
        }
    }
}

/// One derived coverage or special clause. Presence means it applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageItem {
    pub name: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sublimit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

pub type SpecialClause = CoverageItem;

/// Company echo-back with every figure already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySummary {
    pub name: String,
    pub cif: String,
    pub address: String,
    pub cnae: String,
    pub activity: String,
    pub billing: String,
    pub employees: String,
    pub floor_area: String,
    pub installations: Ownership,
    pub installations_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_cif: Option<String>,
}

/// Capital echo-back; the indemnity period only surfaces with a gross margin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalesSummary {
    pub building: String,
    pub contents: String,
    pub stock: String,
    pub electronic_equipment: String,
    pub gross_margin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indemnity_period: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerritorialScope {
    pub scope: String,
    pub jurisdiction: String,
}

/// Normalized recommendation for one (profile, product line) pair.
///
/// Built only by the assembler; renderers get read access and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub(crate) kind: ProductLine,
    pub(crate) company_info: CompanySummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) construction_info: Option<ConstructionInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) protection_info: Option<ProtectionInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) capitales_info: Option<CapitalesSummary>,
    pub(crate) coverages: Vec<CoverageItem>,
    pub(crate) special_clauses: Vec<SpecialClause>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) territorial_scope: Option<TerritorialScope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) claims_history: Option<String>,
}

impl Recommendation {
    pub fn kind(&self) -> ProductLine {
        self.kind
    }

    pub fn company_info(&self) -> &CompanySummary {
        &self.company_info
    }

    pub fn construction_info(&self) -> Option<&ConstructionInfo> {
        self.construction_info.as_ref()
    }

    pub fn protection_info(&self) -> Option<&ProtectionInfo> {
        self.protection_info.as_ref()
    }

    pub fn capitales_info(&self) -> Option<&CapitalesSummary> {
        self.capitales_info.as_ref()
    }

    pub fn coverages(&self) -> &[CoverageItem] {
        &self.coverages
    }

    pub fn special_clauses(&self) -> &[SpecialClause] {
        &self.special_clauses
    }

    pub fn territorial_scope(&self) -> Option<&TerritorialScope> {
        self.territorial_scope.as_ref()
    }

    pub fn claims_history(&self) -> Option<&str> {
        self.claims_history.as_deref()
    }

    pub fn coverage(&self, name: &str) -> Option<&CoverageItem> {
        self.coverages.iter().find(|item| item.name == name)
    }

    pub fn special_clause(&self, name: &str) -> Option<&SpecialClause> {
        self.special_clauses.iter().find(|item| item.name == name)
    }
}
