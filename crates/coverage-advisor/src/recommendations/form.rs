//! Wire shape of the multi-step form as the session layer stores it.
//!
//! Every step is optional and every value is loosely typed: amounts arrive as JSON numbers
//! or as Spanish-formatted strings (`"1.250.000"`, `"1.250.000,50 €"`), flags as booleans or
//! `"si"`/`"no"`. Nothing here is trusted by the engine; `intake` converts it into a
//! `RiskProfile` first.

use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{ProductLine, ProductSelection};

/// Number typed into a form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    /// `None` for blank or unparseable text.
    pub fn value(&self) -> Option<f64> {
        match self {
            LooseNumber::Number(value) => Some(*value),
            LooseNumber::Text(raw) => parse_spanish_number(raw),
        }
    }
}

impl From<f64> for LooseNumber {
    fn from(value: f64) -> Self {
        LooseNumber::Number(value)
    }
}

fn parse_spanish_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.rfind('.'), cleaned.rfind(',')) {
        // both present: the last one is the decimal separator
        (Some(dot), Some(comma)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (None, Some(_)) if is_thousands_grouped(&cleaned, ',') => cleaned.replace(',', ""),
        (None, Some(_)) => cleaned.replace(',', "."),
        (Some(_), None) if is_thousands_grouped(&cleaned, '.') => cleaned.replace('.', ""),
        _ => cleaned,
    };

    normalized.parse().ok()
}

/// `1.250.000` and `1,250,000` group thousands; `1.5`, `12,5` and `0.500` are decimals.
fn is_thousands_grouped(value: &str, separator: char) -> bool {
    let mut groups = value.trim_start_matches('-').split(separator);
    let head_ok = groups
        .next()
        .map(|head| (1..=3).contains(&head.len()) && !head.starts_with('0'))
        .unwrap_or(false);
    let mut tail = groups.peekable();
    head_ok && tail.peek().is_some() && tail.all(|group| group.len() == 3)
}

/// Checkbox or yes/no answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseFlag {
    Bool(bool),
    Number(i64),
    Decimal(f64),
    Text(String),
}

impl Default for LooseFlag {
    fn default() -> Self {
        LooseFlag::Bool(false)
    }
}

impl From<bool> for LooseFlag {
    fn from(value: bool) -> Self {
        LooseFlag::Bool(value)
    }
}

impl LooseFlag {
    pub fn is_set(&self) -> bool {
        match self {
            LooseFlag::Bool(value) => *value,
            LooseFlag::Number(value) => *value != 0,
            LooseFlag::Decimal(value) => *value != 0.0 && !value.is_nan(),
            LooseFlag::Text(raw) => matches!(
                raw.trim().to_lowercase().as_str(),
                "si" | "sí" | "s" | "true" | "1" | "yes" | "on" | "x"
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyStep {
    #[serde(alias = "nombre", alias = "razon_social")]
    pub name: Option<String>,
    pub cif: Option<String>,
    #[serde(alias = "direccion")]
    pub address: Option<String>,
    pub cnae: Option<String>,
    #[serde(alias = "actividad")]
    pub activity: Option<String>,
    #[serde(alias = "facturacion")]
    pub billing: Option<LooseNumber>,
    #[serde(alias = "empleados")]
    pub employees: Option<LooseNumber>,
    #[serde(alias = "superficie")]
    pub floor_area: Option<LooseNumber>,
    #[serde(alias = "instalaciones")]
    pub installations: Option<String>,
    #[serde(alias = "propietario_nombre")]
    pub owner_name: Option<String>,
    #[serde(alias = "propietario_cif")]
    pub owner_cif: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstructionStep {
    #[serde(alias = "estructura")]
    pub structure: Option<String>,
    #[serde(alias = "cubierta")]
    pub roof: Option<String>,
    #[serde(alias = "cerramientos")]
    pub enclosure: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtectionStep {
    #[serde(alias = "extintores")]
    pub extinguishers: LooseFlag,
    #[serde(alias = "bies")]
    pub hydrants: LooseFlag,
    #[serde(alias = "deteccion_automatica")]
    pub automatic_detection: LooseFlag,
    #[serde(alias = "zona_deteccion")]
    pub detection_zone: Option<String>,
    #[serde(alias = "rociadores")]
    pub sprinklers: LooseFlag,
    #[serde(alias = "zona_rociadores")]
    pub sprinkler_zone: Option<String>,
    #[serde(alias = "abastecimiento_agua")]
    pub water_supply: LooseFlag,
    #[serde(alias = "protecciones_fisicas")]
    pub physical_barriers: LooseFlag,
    #[serde(alias = "vigilancia_privada")]
    pub private_surveillance: LooseFlag,
    #[serde(alias = "alarma_conectada")]
    pub connected_alarm: LooseFlag,
    pub cctv: LooseFlag,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapitalesStep {
    #[serde(alias = "continente")]
    pub building: Option<LooseNumber>,
    #[serde(alias = "contenido")]
    pub contents: Option<LooseNumber>,
    #[serde(alias = "existencias")]
    pub stock: Option<LooseNumber>,
    #[serde(alias = "equipos_electronicos")]
    pub electronic_equipment: Option<LooseNumber>,
    #[serde(alias = "margen_bruto_anual")]
    pub gross_margin: Option<LooseNumber>,
    #[serde(alias = "periodo_indemnizacion")]
    pub indemnity_period_months: Option<LooseNumber>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExposureStep {
    #[serde(alias = "bienes_terceros")]
    pub third_party_goods: LooseFlag,
    #[serde(alias = "bienes_terceros_valor")]
    pub third_party_goods_value: Option<LooseNumber>,
    #[serde(alias = "vehiculos_terceros")]
    pub parked_vehicles: LooseFlag,
    #[serde(alias = "vehiculos_terceros_valor")]
    pub parked_vehicles_value: Option<LooseNumber>,
    #[serde(alias = "bienes_empleados")]
    pub employee_goods: LooseFlag,
    #[serde(alias = "bienes_empleados_valor")]
    pub employee_goods_value: Option<LooseNumber>,
    #[serde(alias = "mercancias_refrigeradas")]
    pub refrigerated_goods: LooseFlag,
    #[serde(alias = "mercancias_refrigeradas_valor")]
    pub refrigerated_goods_value: Option<LooseNumber>,
    #[serde(alias = "control_temperatura")]
    pub refrigerated_temperature_control: LooseFlag,
    #[serde(alias = "deteccion_camaras")]
    pub refrigerated_automatic_detection: LooseFlag,
    #[serde(alias = "bienes_intemperie")]
    pub outdoor_goods: LooseFlag,
    #[serde(alias = "bienes_intemperie_valor")]
    pub outdoor_goods_value: Option<LooseNumber>,
    #[serde(alias = "maquinaria_arrendada")]
    pub leased_machinery: LooseFlag,
    #[serde(alias = "maquinaria_arrendada_valor")]
    pub leased_machinery_value: Option<LooseNumber>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityStep {
    #[serde(alias = "fabrica")]
    pub manufactures: LooseFlag,
    #[serde(alias = "comercializa")]
    pub markets: LooseFlag,
    #[serde(alias = "disena")]
    pub designs: LooseFlag,
    #[serde(alias = "almacena")]
    pub stores: LooseFlag,
    #[serde(alias = "presta_servicios")]
    pub provides_services: LooseFlag,
    #[serde(alias = "tipo_producto")]
    pub product_type: Option<String>,
    #[serde(alias = "consumo_humano")]
    pub human_consumption: LooseFlag,
    #[serde(alias = "distribucion")]
    pub distribution: Vec<String>,
    #[serde(alias = "filiales")]
    pub subsidiary_locations: Vec<String>,
    #[serde(alias = "subcontrata")]
    pub subcontracts: LooseFlag,
    #[serde(alias = "personal_tecnico")]
    pub technical_staff: LooseFlag,
    #[serde(alias = "trabajos_colindantes")]
    pub works_on_adjacent_properties: LooseFlag,
    #[serde(alias = "trabajos_conducciones")]
    pub works_near_conduits: LooseFlag,
    #[serde(alias = "trabajos_bienes_preexistentes")]
    pub works_on_existing_property: LooseFlag,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeasingEntry {
    #[serde(alias = "arrendador")]
    pub lessor: String,
    pub cif: String,
    #[serde(alias = "contrato")]
    pub contract: String,
    #[serde(alias = "bien")]
    pub asset: String,
}

impl LeasingEntry {
    pub fn is_blank(&self) -> bool {
        [&self.lessor, &self.cif, &self.contract, &self.asset]
            .iter()
            .all(|field| field.trim().is_empty())
    }
}

/// Whole form as persisted for a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSubmission {
    #[serde(alias = "productos", deserialize_with = "product_codes")]
    pub products: Vec<ProductLine>,
    #[serde(alias = "empresa")]
    pub company: CompanyStep,
    #[serde(alias = "construccion")]
    pub construction: ConstructionStep,
    #[serde(alias = "protecciones")]
    pub protections: ProtectionStep,
    pub capitales: CapitalesStep,
    #[serde(alias = "exposiciones")]
    pub exposures: ExposureStep,
    #[serde(alias = "actividad")]
    pub activity: ActivityStep,
    pub leasing: Vec<LeasingEntry>,
    #[serde(alias = "todo_riesgo")]
    pub all_risk: LooseFlag,
    #[serde(alias = "siniestralidad")]
    pub claims_history: Option<String>,
}

/// Accepts every product spelling the path segment accepts (`rc`, `danos`, ...).
fn product_codes<'de, D>(deserializer: D) -> Result<Vec<ProductLine>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<String>::deserialize(deserializer)?
        .iter()
        .map(|code| code.parse().map_err(serde::de::Error::custom))
        .collect()
}

impl FormSubmission {
    /// Lines to evaluate: an explicit line always wins; `todos` means the lines ticked in
    /// the form, or every line when none was ticked.
    pub fn requested_lines(&self, selection: ProductSelection) -> Vec<ProductLine> {
        match selection {
            ProductSelection::Single(line) => vec![line],
            ProductSelection::All if self.products.is_empty() => ProductLine::ALL.to_vec(),
            ProductSelection::All => ProductLine::ALL
                .into_iter()
                .filter(|line| self.products.contains(line))
                .collect(),
        }
    }
}
