use super::format::{euros, euros_or_na, months, percent_of_capital};
use super::tiers::{LiabilityLimits, ELECTRICAL_DAMAGE_LIMIT, LIABILITY_LIMITS, THEFT_PERCENTAGE};
use crate::recommendations::domain::{
    CoverageItem, DeclaredValue, LiabilityProfile, Ownership, ProductType, PropertyProfile,
};

pub(crate) const FIRE: &str = "Incendio, rayo y explosión";
pub(crate) const WEATHER: &str = "Fenómenos atmosféricos e inundación";
pub(crate) const WATER_DAMAGE: &str = "Daños por agua";
pub(crate) const ELECTRICAL_DAMAGE: &str = "Daños eléctricos";
pub(crate) const THEFT: &str = "Robo y expoliación";
pub(crate) const GLASS_BREAKAGE: &str = "Rotura de cristales";
pub(crate) const ELECTRONIC_EQUIPMENT: &str = "Equipos electrónicos";
pub(crate) const BUSINESS_INTERRUPTION: &str = "Pérdida de beneficios";
pub(crate) const THIRD_PARTY_GOODS: &str = "Bienes de terceros en poder del asegurado";
pub(crate) const PARKED_VEHICLES: &str = "Vehículos de terceros en aparcamiento";
pub(crate) const EMPLOYEE_GOODS: &str = "Bienes de empleados";
pub(crate) const REFRIGERATED_GOODS: &str = "Mercancías refrigeradas";
pub(crate) const OUTDOOR_GOODS: &str = "Bienes a la intemperie";
pub(crate) const LEASED_MACHINERY: &str = "Avería de maquinaria arrendada";

pub(crate) const GENERAL_LIABILITY: &str = "Responsabilidad civil general";
pub(crate) const EMPLOYER_LIABILITY: &str = "Responsabilidad civil patronal";
pub(crate) const PROPERTY_OWNER_LIABILITY: &str = "Responsabilidad civil inmobiliaria";
pub(crate) const TENANT_LIABILITY: &str = "Responsabilidad civil locativa";
pub(crate) const PRODUCT_LIABILITY: &str = "Responsabilidad civil por productos";
pub(crate) const UNION_AND_MIXTURE: &str = "Responsabilidad civil por unión y mezcla";
pub(crate) const PRODUCT_RECALL: &str = "Gastos de retirada de productos";
pub(crate) const ADJACENT_DAMAGE: &str = "Daños a colindantes";
pub(crate) const CONDUIT_DAMAGE: &str = "Daños a conducciones";
pub(crate) const PREEXISTING_PROPERTY: &str = "Daños a bienes preexistentes";
pub(crate) const SUBCONTRACTOR_LIABILITY: &str =
    "Responsabilidad civil subsidiaria de subcontratistas";
pub(crate) const TECHNICAL_STAFF_LIABILITY: &str = "Responsabilidad civil profesional de técnicos";

const GLASS_BREAKAGE_LIMIT: f64 = 6_000.0;
const ADJACENT_DAMAGE_LIMIT: f64 = 300_000.0;
const CONDUIT_DAMAGE_LIMIT: f64 = 150_000.0;
const PREEXISTING_PROPERTY_LIMIT: f64 = 150_000.0;
const TECHNICAL_STAFF_LIMIT: f64 = 300_000.0;
const DEFAULT_INDEMNITY_MONTHS: u32 = 12;

/// Limit, sublimit and condition of a fired rule. The rule itself supplies the name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CoverageTerms {
    limit: Option<String>,
    sublimit: Option<String>,
    condition: Option<String>,
}

impl CoverageTerms {
    pub(crate) fn limit(limit: impl Into<String>) -> Self {
        Self {
            limit: Some(limit.into()),
            ..Self::default()
        }
    }

    pub(crate) fn unlimited() -> Self {
        Self::default()
    }

    pub(crate) fn with_sublimit(mut self, sublimit: impl Into<String>) -> Self {
        self.sublimit = Some(sublimit.into());
        self
    }

    pub(crate) fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub(crate) fn into_item(self, name: impl Into<String>) -> CoverageItem {
        CoverageItem {
            name: name.into(),
            required: true,
            limit: self.limit,
            sublimit: self.sublimit,
            condition: self.condition,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Requirement {
    /// Must fire for every profile of the line; `default_limit` backs fail-safe repair.
    Mandatory { default_limit: &'static str },
    Conditional,
}

pub(crate) struct CoverageRule<P> {
    pub(crate) name: &'static str,
    pub(crate) requirement: Requirement,
    pub(crate) applies: fn(&P) -> bool,
    pub(crate) build: fn(&P) -> CoverageTerms,
}

impl<P> CoverageRule<P> {
    fn evaluate(&self, profile: &P) -> Option<CoverageItem> {
        if (self.applies)(profile) {
            Some((self.build)(profile).into_item(self.name))
        } else {
            None
        }
    }
}

/// Mandatory coverage the assembler checks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MandatoryCoverage {
    pub(crate) name: &'static str,
    pub(crate) default_limit: &'static str,
}

/// Ordered rules; declaration order is output order.
pub(crate) struct RuleSet<P: 'static> {
    rules: &'static [CoverageRule<P>],
}

impl<P: 'static> RuleSet<P> {
    pub(crate) fn evaluate(&self, profile: &P) -> Vec<CoverageItem> {
        self.rules
            .iter()
            .filter_map(|rule| rule.evaluate(profile))
            .collect()
    }

    pub(crate) fn mandatory(&self) -> Vec<MandatoryCoverage> {
        self.rules
            .iter()
            .filter_map(|rule| match rule.requirement {
                Requirement::Mandatory { default_limit } => Some(MandatoryCoverage {
                    name: rule.name,
                    default_limit,
                }),
                Requirement::Conditional => None,
            })
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name).collect()
    }
}

fn always<P>(_: &P) -> bool {
    true
}

pub(crate) static PROPERTY_RULES: RuleSet<PropertyProfile> = RuleSet {
    rules: &[
        CoverageRule {
            name: FIRE,
            requirement: Requirement::Mandatory {
                default_limit: "100% de los capitales asegurados",
            },
            applies: always::<PropertyProfile>,
            build: fire,
        },
        CoverageRule {
            name: WEATHER,
            requirement: Requirement::Mandatory {
                default_limit: "100% de los capitales asegurados",
            },
            applies: always::<PropertyProfile>,
            build: weather,
        },
        CoverageRule {
            name: WATER_DAMAGE,
            requirement: Requirement::Mandatory {
                default_limit: "100% de los capitales asegurados",
            },
            applies: always::<PropertyProfile>,
            build: water_damage,
        },
        CoverageRule {
            name: ELECTRICAL_DAMAGE,
            requirement: Requirement::Mandatory {
                default_limit: "30.000€",
            },
            applies: always::<PropertyProfile>,
            build: electrical_damage,
        },
        CoverageRule {
            name: THEFT,
            requirement: Requirement::Mandatory {
                default_limit: "25% de los capitales asegurados",
            },
            applies: always::<PropertyProfile>,
            build: theft,
        },
        CoverageRule {
            name: GLASS_BREAKAGE,
            requirement: Requirement::Mandatory {
                default_limit: "6.000€",
            },
            applies: always::<PropertyProfile>,
            build: glass_breakage,
        },
        CoverageRule {
            name: ELECTRONIC_EQUIPMENT,
            requirement: Requirement::Conditional,
            applies: |profile| profile.capitales.electronic_equipment_value() > 0.0,
            build: electronic_equipment,
        },
        CoverageRule {
            name: BUSINESS_INTERRUPTION,
            requirement: Requirement::Conditional,
            applies: |profile| profile.capitales.has_business_interruption(),
            build: business_interruption,
        },
        CoverageRule {
            name: THIRD_PARTY_GOODS,
            requirement: Requirement::Conditional,
            applies: |profile| profile.exposures.third_party_goods.is_some(),
            build: |profile| {
                declared(
                    profile.exposures.third_party_goods,
                    "Bienes propiedad de terceros depositados en las instalaciones del asegurado",
                )
            },
        },
        CoverageRule {
            name: PARKED_VEHICLES,
            requirement: Requirement::Conditional,
            applies: |profile| profile.exposures.parked_vehicles.is_some(),
            build: |profile| {
                declared(
                    profile.exposures.parked_vehicles,
                    "Vehículos de clientes y visitantes estacionados en el recinto asegurado",
                )
            },
        },
        CoverageRule {
            name: EMPLOYEE_GOODS,
            requirement: Requirement::Conditional,
            applies: |profile| profile.exposures.employee_goods.is_some(),
            build: |profile| {
                declared(
                    profile.exposures.employee_goods,
                    "Efectos personales de los empleados dentro de las instalaciones",
                )
            },
        },
        CoverageRule {
            name: REFRIGERATED_GOODS,
            requirement: Requirement::Conditional,
            applies: |profile| profile.exposures.refrigerated_goods.is_some(),
            build: refrigerated_goods,
        },
        CoverageRule {
            name: OUTDOOR_GOODS,
            requirement: Requirement::Conditional,
            applies: |profile| profile.exposures.outdoor_goods.is_some(),
            build: |profile| {
                declared(
                    profile.exposures.outdoor_goods,
                    "Bienes almacenados al aire libre dentro del recinto asegurado",
                )
            },
        },
        CoverageRule {
            name: LEASED_MACHINERY,
            requirement: Requirement::Conditional,
            applies: |profile| profile.exposures.leased_machinery.is_some(),
            build: |profile| {
                declared(
                    profile.exposures.leased_machinery,
                    "Avería de maquinaria en régimen de arrendamiento",
                )
            },
        },
    ],
};

pub(crate) static LIABILITY_RULES: RuleSet<LiabilityProfile> = RuleSet {
    rules: &[
        CoverageRule {
            name: GENERAL_LIABILITY,
            requirement: Requirement::Mandatory {
                default_limit: "600.000€",
            },
            applies: always::<LiabilityProfile>,
            build: general_liability,
        },
        CoverageRule {
            name: EMPLOYER_LIABILITY,
            requirement: Requirement::Conditional,
            applies: |profile| profile.company.employees.unwrap_or(0) > 0,
            build: employer_liability,
        },
        CoverageRule {
            name: PROPERTY_OWNER_LIABILITY,
            requirement: Requirement::Conditional,
            applies: |profile| profile.company.installations == Ownership::Owner,
            build: |profile| {
                CoverageTerms::limit(euros(limits(profile).general as f64)).with_condition(
                    "Responsabilidad derivada de la propiedad de los inmuebles e instalaciones",
                )
            },
        },
        CoverageRule {
            name: TENANT_LIABILITY,
            requirement: Requirement::Conditional,
            applies: |profile| profile.company.installations == Ownership::Tenant,
            build: tenant_liability,
        },
        CoverageRule {
            name: PRODUCT_LIABILITY,
            requirement: Requirement::Conditional,
            applies: |profile| profile.company_type.handles_products(),
            build: product_liability,
        },
        CoverageRule {
            name: UNION_AND_MIXTURE,
            requirement: Requirement::Conditional,
            applies: |profile| {
                profile.company_type.handles_products()
                    && profile.activity.product_type == Some(ProductType::Intermediate)
            },
            build: |profile| {
                CoverageTerms::limit(euros(limits(profile).per_victim as f64)).with_condition(
                    "Productos intermedios unidos o mezclados con productos de terceros",
                )
            },
        },
        CoverageRule {
            name: PRODUCT_RECALL,
            requirement: Requirement::Conditional,
            applies: |profile| {
                profile.company_type.handles_products() && profile.activity.human_consumption
            },
            build: |profile| {
                CoverageTerms::limit(euros(limits(profile).per_victim as f64))
                    .with_condition("Retirada de productos destinados al consumo humano")
            },
        },
        CoverageRule {
            name: ADJACENT_DAMAGE,
            requirement: Requirement::Conditional,
            applies: |profile| {
                profile.company_type.provides_services()
                    && profile.activity.works_on_adjacent_properties
            },
            build: |_| {
                CoverageTerms::limit(euros(ADJACENT_DAMAGE_LIMIT))
                    .with_condition("Daños a inmuebles colindantes al lugar de los trabajos")
            },
        },
        CoverageRule {
            name: CONDUIT_DAMAGE,
            requirement: Requirement::Conditional,
            applies: |profile| {
                profile.company_type.provides_services() && profile.activity.works_near_conduits
            },
            build: |_| {
                CoverageTerms::limit(euros(CONDUIT_DAMAGE_LIMIT))
                    .with_condition("Daños a conducciones aéreas o subterráneas, franquicia 600€")
            },
        },
        CoverageRule {
            name: PREEXISTING_PROPERTY,
            requirement: Requirement::Conditional,
            applies: |profile| {
                profile.company_type.provides_services()
                    && profile.activity.works_on_existing_property
            },
            build: |_| {
                CoverageTerms::limit(euros(PREEXISTING_PROPERTY_LIMIT))
                    .with_condition("Daños a bienes preexistentes sobre los que se trabaja")
            },
        },
        CoverageRule {
            name: SUBCONTRACTOR_LIABILITY,
            requirement: Requirement::Conditional,
            applies: |profile| profile.activity.subcontracts,
            build: |profile| {
                CoverageTerms::limit(euros(limits(profile).general as f64))
                    .with_condition("Responsabilidad subsidiaria por los trabajos subcontratados")
            },
        },
        CoverageRule {
            name: TECHNICAL_STAFF_LIABILITY,
            requirement: Requirement::Conditional,
            applies: |profile| profile.activity.technical_staff,
            build: |_| {
                CoverageTerms::limit(euros(TECHNICAL_STAFF_LIMIT))
                    .with_condition("Responsabilidad profesional del personal técnico en plantilla")
            },
        },
    ],
};

fn fire(_: &PropertyProfile) -> CoverageTerms {
    CoverageTerms::limit(percent_of_capital(100))
        .with_condition("Incluye daños por humo y gastos de extinción")
}

fn weather(_: &PropertyProfile) -> CoverageTerms {
    CoverageTerms::limit(percent_of_capital(100))
        .with_condition("Lluvia, viento, pedrisco, nieve e inundación")
}

fn water_damage(_: &PropertyProfile) -> CoverageTerms {
    CoverageTerms::limit(percent_of_capital(100))
        .with_condition("Incluye gastos de localización y reparación de averías")
}

fn electrical_damage(profile: &PropertyProfile) -> CoverageTerms {
    let limit = ELECTRICAL_DAMAGE_LIMIT.resolve(profile.capitales.building_value());
    CoverageTerms::limit(euros(*limit as f64)).with_condition("A primer riesgo")
}

fn theft(profile: &PropertyProfile) -> CoverageTerms {
    let percentage = THEFT_PERCENTAGE.resolve(profile.capitales.material_capital());
    let protections = &profile.protections;
    let condition = if protections.physical_barriers || protections.connected_alarm {
        "A primer riesgo. Incluye desperfectos por robo"
    } else {
        "A primer riesgo. Incluye desperfectos por robo. Sujeto a verificación de medidas de seguridad"
    };
    CoverageTerms::limit(percent_of_capital(*percentage)).with_condition(condition)
}

fn glass_breakage(_: &PropertyProfile) -> CoverageTerms {
    CoverageTerms::limit(euros(GLASS_BREAKAGE_LIMIT))
}

fn electronic_equipment(profile: &PropertyProfile) -> CoverageTerms {
    CoverageTerms::limit(euros(profile.capitales.electronic_equipment_value()))
        .with_condition("Daños materiales a equipos electrónicos y de proceso de datos")
}

fn business_interruption(profile: &PropertyProfile) -> CoverageTerms {
    CoverageTerms::limit(euros(profile.capitales.gross_margin_value())).with_condition(format!(
        "Periodo de indemnización: {}",
        months(indemnity_months(profile))
    ))
}

pub(crate) fn indemnity_months(profile: &PropertyProfile) -> u32 {
    match profile.capitales.indemnity_period_months {
        Some(months) if months > 0 => months,
        _ => DEFAULT_INDEMNITY_MONTHS,
    }
}

fn refrigerated_goods(profile: &PropertyProfile) -> CoverageTerms {
    let goods = profile.exposures.refrigerated_goods.unwrap_or_default();
    let mut measures = Vec::new();
    if goods.temperature_control {
        measures.push("control de temperatura");
    }
    if goods.automatic_detection {
        measures.push("detección automática");
    }

    let mut condition =
        "Deterioro de mercancías por avería o falta de suministro en cámaras frigoríficas"
            .to_string();
    if !measures.is_empty() {
        condition.push_str(". Medidas declaradas: ");
        condition.push_str(&measures.join(", "));
    }

    CoverageTerms::limit(euros_or_na(goods.amount)).with_condition(condition)
}

fn declared(value: Option<DeclaredValue>, condition: &str) -> CoverageTerms {
    let amount = value.and_then(|value| value.amount);
    CoverageTerms::limit(euros_or_na(amount)).with_condition(condition)
}

fn limits(profile: &LiabilityProfile) -> &'static LiabilityLimits {
    LIABILITY_LIMITS.resolve(profile.company.billing_amount())
}

fn per_victim(limits: &LiabilityLimits) -> String {
    format!("{} por víctima", euros(limits.per_victim as f64))
}

fn general_liability(profile: &LiabilityProfile) -> CoverageTerms {
    let limits = limits(profile);
    CoverageTerms::limit(euros(limits.general as f64))
        .with_sublimit(per_victim(limits))
        .with_condition("Franquicia general: 300€ por siniestro en daños materiales")
}

fn employer_liability(profile: &LiabilityProfile) -> CoverageTerms {
    let limits = limits(profile);
    let employees = profile.company.employees.unwrap_or(0);
    CoverageTerms::limit(euros(limits.general as f64))
        .with_sublimit(per_victim(limits))
        .with_condition(format!(
            "Accidentes de trabajo de la plantilla declarada ({employees} empleados)"
        ))
}

fn tenant_liability(profile: &LiabilityProfile) -> CoverageTerms {
    let condition = match &profile.company.owner {
        Some(owner) => format!(
            "Daños materiales al inmueble arrendado, propiedad de {} (CIF: {})",
            owner.name, owner.cif
        ),
        None => "Daños materiales al inmueble arrendado".to_string(),
    };
    CoverageTerms::limit(euros(limits(profile).general as f64)).with_condition(condition)
}

fn product_liability(profile: &LiabilityProfile) -> CoverageTerms {
    let activity = &profile.activity;
    let mut roles = Vec::new();
    if activity.manufactures {
        roles.push("fabricación");
    }
    if activity.markets {
        roles.push("comercialización");
    }
    if activity.designs {
        roles.push("diseño");
    }
    if activity.stores {
        roles.push("almacenamiento");
    }

    let condition = if roles.is_empty() {
        "Productos fabricados o suministrados por el asegurado".to_string()
    } else {
        format!("Actividad declarada: {}", roles.join(", "))
    };

    let limits = limits(profile);
    CoverageTerms::limit(euros(limits.general as f64))
        .with_sublimit(per_victim(limits))
        .with_condition(condition)
}
