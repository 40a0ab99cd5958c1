use crate::infra::{read_submission, InMemoryProfileRepository};
use clap::{Args, ValueEnum};
use coverage_advisor::error::AppError;
use coverage_advisor::recommendations::{
    text_report, write_csv, AssemblyMode, FormSubmission, ProductSelection, Recommendation,
    RecommendationService,
};
use serde_json::json;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Scenario {
    /// Small owner-occupied metal workshop
    Workshop,
    /// Large food manufacturer with leasing and business interruption
    Manufacturer,
    /// Wholesale distributor renting its warehouse
    Distributor,
}

impl Scenario {
    const ALL: [Scenario; 3] = [
        Scenario::Workshop,
        Scenario::Manufacturer,
        Scenario::Distributor,
    ];

    fn title(self) -> &'static str {
        match self {
            Scenario::Workshop => "Taller mecánico (propietario)",
            Scenario::Manufacturer => "Gran fabricante (propietario)",
            Scenario::Distributor => "Distribuidor mayorista (inquilino)",
        }
    }

    pub(crate) fn submission(self) -> Result<FormSubmission, AppError> {
        let form = match self {
            Scenario::Workshop => json!({
                "empresa": {
                    "nombre": "Talleres Hermanos Ruiz S.L.",
                    "cif": "B30123456",
                    "direccion": "Polígono Oeste, parcela 14, Murcia",
                    "cnae": "2562",
                    "actividad": "Ingeniería mecánica por cuenta de terceros",
                    "facturacion": "450.000",
                    "empleados": 6,
                    "superficie": 600,
                    "instalaciones": "propietario"
                },
                "construccion": {
                    "estructura": "metalica",
                    "cubierta": "panel_sandwich",
                    "cerramientos": "ladrillo"
                },
                "protecciones": { "extintores": "si", "alarma_conectada": "si" },
                "capitales": {
                    "continente": 300000,
                    "contenido": 150000,
                    "existencias": 50000,
                    "margen_bruto_anual": 0
                },
                "actividad": {
                    "fabrica": "si",
                    "presta_servicios": "si",
                    "trabajos_conducciones": "si",
                    "distribucion": ["espana"]
                }
            }),
            Scenario::Manufacturer => json!({
                "empresa": {
                    "nombre": "Conservas del Segura S.A.",
                    "cif": "A30987654",
                    "direccion": "Carretera de Alicante km 7, Molina de Segura",
                    "cnae": "1039",
                    "actividad": "Fabricación de conservas vegetales",
                    "facturacion": "12.500.000",
                    "empleados": 85,
                    "superficie": 12000,
                    "instalaciones": "propietario"
                },
                "construccion": {
                    "estructura": "hormigon",
                    "cubierta": "metalica",
                    "cerramientos": "hormigon"
                },
                "protecciones": {
                    "extintores": true,
                    "bies": true,
                    "deteccion_automatica": true,
                    "zona_deteccion": "Almacén de producto terminado",
                    "rociadores": true,
                    "protecciones_fisicas": true,
                    "cctv": true
                },
                "capitales": {
                    "continente": 2500000,
                    "contenido": 3800000,
                    "existencias": 1200000,
                    "equipos_electronicos": 180000,
                    "margen_bruto_anual": 4000000,
                    "periodo_indemnizacion": 18
                },
                "exposiciones": {
                    "mercancias_refrigeradas": "si",
                    "mercancias_refrigeradas_valor": "250.000",
                    "control_temperatura": "si"
                },
                "leasing": [{
                    "arrendador": "Banco Financiero S.A.",
                    "cif": "",
                    "contrato": "L-456789",
                    "bien": "Carretilla elevadora eléctrica"
                }],
                "todo_riesgo": "si",
                "actividad": {
                    "fabrica": "si",
                    "comercializa": "si",
                    "tipo_producto": "final",
                    "consumo_humano": "si",
                    "distribucion": ["espana", "ue", "usa"]
                },
                "siniestralidad": "Un siniestro de agua en 2023 (4.200€)"
            }),
            Scenario::Distributor => json!({
                "empresa": {
                    "nombre": "Distribuciones Levante S.L.",
                    "cif": "B46555123",
                    "direccion": "Calle Mercaderes 3, Valencia",
                    "cnae": "4639",
                    "actividad": "Comercio al por mayor de alimentación",
                    "facturacion": 2400000,
                    "empleados": 14,
                    "instalaciones": "inquilino",
                    "propietario_nombre": "Inmuebles Turia S.A.",
                    "propietario_cif": "A46000001"
                },
                "capitales": { "continente": 0, "contenido": 400000, "existencias": 900000 },
                "exposiciones": { "vehiculos_terceros": "si" },
                "actividad": {
                    "comercializa": "si",
                    "almacena": "si",
                    "distribucion": ["espana", "ue"],
                    "filiales": ["Alicante", "Castellón"]
                }
            }),
        };

        Ok(serde_json::from_value(form)?)
    }
}

#[derive(Args, Debug)]
pub(crate) struct RecommendArgs {
    /// JSON file holding the form submission
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Product line: danos_materiales, responsabilidad_civil or todos
    #[arg(long, default_value = "todos")]
    pub(crate) product: ProductSelection,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
    /// Repair internal inconsistencies instead of failing
    #[arg(long)]
    pub(crate) fail_safe: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Only run one sample company (defaults to all of them)
    #[arg(long, value_enum)]
    pub(crate) scenario: Option<Scenario>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

fn local_service(mode: AssemblyMode) -> RecommendationService<InMemoryProfileRepository> {
    RecommendationService::new(Arc::new(InMemoryProfileRepository::default()), mode)
}

pub(crate) fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    let RecommendArgs {
        input,
        product,
        format,
        fail_safe,
    } = args;

    let mode = if fail_safe {
        AssemblyMode::FailSafe
    } else {
        AssemblyMode::Strict
    };

    let submission = read_submission(&input)?;
    let recommendations = local_service(mode).evaluate(&submission, product)?;
    render(&recommendations, format, io::stdout().lock())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let scenarios = match args.scenario {
        Some(scenario) => vec![scenario],
        None => Scenario::ALL.to_vec(),
    };

    let service = local_service(AssemblyMode::Strict);
    for scenario in scenarios {
        let recommendations =
            service.evaluate(&scenario.submission()?, ProductSelection::All)?;
        if args.format == OutputFormat::Text {
            println!("== {} ==", scenario.title());
        }
        render(&recommendations, args.format, io::stdout().lock())?;
        if args.format == OutputFormat::Text {
            println!();
        }
    }

    Ok(())
}

pub(crate) fn render<W: Write>(
    recommendations: &[Recommendation],
    format: OutputFormat,
    mut out: W,
) -> Result<(), AppError> {
    match format {
        OutputFormat::Text => out.write_all(text_report(recommendations).as_bytes())?,
        OutputFormat::Json => {
            let payload = json!({
                "success": true,
                "recommendations": recommendations,
            });
            serde_json::to_writer_pretty(&mut out, &payload)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => write_csv(recommendations, out)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverage_advisor::recommendations::ProductLine;

    fn evaluate(scenario: Scenario) -> Vec<Recommendation> {
        local_service(AssemblyMode::Strict)
            .evaluate(
                &scenario.submission().expect("scenario form"),
                ProductSelection::All,
            )
            .expect("scenario evaluates")
    }

    #[test]
    fn every_scenario_evaluates_both_lines() {
        for scenario in Scenario::ALL {
            let recommendations = evaluate(scenario);
            let kinds: Vec<_> = recommendations.iter().map(Recommendation::kind).collect();
            assert_eq!(
                kinds,
                vec![ProductLine::PropertyDamage, ProductLine::GeneralLiability]
            );
        }
    }

    #[test]
    fn json_output_uses_the_success_envelope() {
        let recommendations = evaluate(Scenario::Workshop);
        let mut buffer = Vec::new();
        render(&recommendations, OutputFormat::Json, &mut buffer).expect("renders");

        let value: serde_json::Value = serde_json::from_slice(&buffer).expect("valid json");
        assert_eq!(value["success"], true);
        assert_eq!(value["recommendations"][0]["type"], "danos_materiales");
        assert_eq!(value["recommendations"][1]["type"], "responsabilidad_civil");
    }

    #[test]
    fn text_output_names_the_company_and_limits() {
        let recommendations = evaluate(Scenario::Distributor);
        let mut buffer = Vec::new();
        render(&recommendations, OutputFormat::Text, &mut buffer).expect("renders");

        let text = String::from_utf8(buffer).expect("utf8");
        assert!(text.contains("Distribuciones Levante S.L."));
        assert!(text.contains("Responsabilidad civil locativa"));
        assert!(text.contains("Asegurado adicional"));
    }

    #[test]
    fn csv_output_has_one_row_per_item() {
        let recommendations = evaluate(Scenario::Manufacturer);
        let mut buffer = Vec::new();
        render(&recommendations, OutputFormat::Csv, &mut buffer).expect("renders");

        let text = String::from_utf8(buffer).expect("utf8");
        let expected: usize = recommendations
            .iter()
            .map(|item| item.coverages().len() + item.special_clauses().len())
            .sum();
        assert_eq!(text.lines().count(), expected + 1);
        assert!(text.starts_with("product,section,name,required,limit,sublimit,condition"));
    }
}
