//! Renderers over an assembled `Recommendation`. They only read what the engine produced.

use std::fmt::Write as _;
use std::io;

use serde::Serialize;

use super::domain::{CoverageItem, Recommendation};

/// One CSV line of the coverage table.
#[derive(Debug, Clone, Serialize)]
pub struct CoverageRow<'a> {
    pub product: &'static str,
    pub section: &'static str,
    pub name: &'a str,
    pub required: bool,
    pub limit: &'a str,
    pub sublimit: &'a str,
    pub condition: &'a str,
}

impl<'a> CoverageRow<'a> {
    fn new(recommendation: &Recommendation, section: &'static str, item: &'a CoverageItem) -> Self {
        Self {
            product: recommendation.kind().code(),
            section,
            name: &item.name,
            required: item.required,
            limit: item.limit.as_deref().unwrap_or(""),
            sublimit: item.sublimit.as_deref().unwrap_or(""),
            condition: item.condition.as_deref().unwrap_or(""),
        }
    }
}

pub fn coverage_rows(recommendation: &Recommendation) -> Vec<CoverageRow<'_>> {
    let coverages = recommendation
        .coverages()
        .iter()
        .map(|item| CoverageRow::new(recommendation, "cobertura", item));
    let clauses = recommendation
        .special_clauses()
        .iter()
        .map(|item| CoverageRow::new(recommendation, "clausula", item));
    coverages.chain(clauses).collect()
}

/// Writes every coverage and clause as a CSV row, headers first.
pub fn write_csv<W: io::Write>(
    recommendations: &[Recommendation],
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    for recommendation in recommendations {
        for row in coverage_rows(recommendation) {
            csv_writer.serialize(row)?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}

fn item_line(out: &mut String, item: &CoverageItem) {
    let _ = write!(out, "  - {}", item.name);
    if let Some(limit) = &item.limit {
        let _ = write!(out, ": {limit}");
    }
    if let Some(sublimit) = &item.sublimit {
        let _ = write!(out, " (sublímite {sublimit})");
    }
    out.push('\n');
    if let Some(condition) = &item.condition {
        let _ = writeln!(out, "    {condition}");
    }
}

/// Plain-text report, one block per product line.
pub fn text_report(recommendations: &[Recommendation]) -> String {
    let mut out = String::new();

    for (index, recommendation) in recommendations.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let company = recommendation.company_info();
        let _ = writeln!(out, "Recomendación de {}", recommendation.kind().label());
        let _ = writeln!(out, "Tomador: {} (CIF {})", company.name, company.cif);
        let _ = writeln!(
            out,
            "Actividad: {} | CNAE {} | Facturación {} | Empleados {}",
            company.activity, company.cnae, company.billing, company.employees
        );
        let _ = writeln!(out, "Instalaciones: {}", company.installations_label);

        if let Some(capitales) = recommendation.capitales_info() {
            let _ = writeln!(
                out,
                "Capitales: continente {} | contenido {} | existencias {} | margen bruto {}",
                capitales.building, capitales.contents, capitales.stock, capitales.gross_margin
            );
            if let Some(period) = &capitales.indemnity_period {
                let _ = writeln!(out, "Periodo de indemnización: {period}");
            }
        }

        if let Some(scope) = recommendation.territorial_scope() {
            let _ = writeln!(
                out,
                "Ámbito territorial: {} | Jurisdicción: {}",
                scope.scope, scope.jurisdiction
            );
        }

        out.push_str("Coberturas:\n");
        for item in recommendation.coverages() {
            item_line(&mut out, item);
        }

        if !recommendation.special_clauses().is_empty() {
            out.push_str("Cláusulas especiales:\n");
            for item in recommendation.special_clauses() {
                item_line(&mut out, item);
            }
        }

        if let Some(history) = recommendation.claims_history() {
            let _ = writeln!(out, "Siniestralidad: {history}");
        }
    }

    out
}
