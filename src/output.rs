//! CLI output formatting for format and parameter listings.
//!
//! Each listing has a `format_*` function returning lines (pure, no I/O,
//! unit-testable) and a `print_*` wrapper that writes to stdout, plus a
//! serde-backed `*_report` structure for `--json` output.

use crate::concept::Kind;
use crate::engine::Engine;
use crate::params::{ParamSpec, Validator};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ConceptReport {
    pub name: String,
    pub aliases: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ConversionReport {
    pub from: String,
    pub to: String,
}

/// Everything the `formats` subcommand knows about one category.
#[derive(Debug, Serialize)]
pub struct FormatReport {
    pub kind: String,
    pub concepts: Vec<ConceptReport>,
    pub conversions: Vec<ConversionReport>,
}

pub fn format_report(engine: &Engine, kind: &Kind) -> FormatReport {
    let registry = engine.registry();
    FormatReport {
        kind: kind.to_string(),
        concepts: registry
            .catalog()
            .list_by_kind(kind)
            .iter()
            .map(|c| ConceptReport {
                name: c.name().to_string(),
                aliases: c.aliases().to_vec(),
            })
            .collect(),
        conversions: registry
            .conversions(kind)
            .into_iter()
            .map(|(from, to)| ConversionReport { from, to })
            .collect(),
    }
}

pub fn format_formats(report: &FormatReport) -> Vec<String> {
    let mut lines = vec![format!("Concepts ({})", report.kind)];
    for concept in &report.concepts {
        if concept.aliases.is_empty() {
            lines.push(format!("    {}", concept.name));
        } else {
            lines.push(format!(
                "    {} ({})",
                concept.name,
                concept.aliases.join(", ")
            ));
        }
    }
    lines.push(String::new());
    lines.push(format!("Conversions ({})", report.conversions.len()));
    for conversion in &report.conversions {
        lines.push(format!("    {} -> {}", conversion.from, conversion.to));
    }
    lines
}

pub fn print_formats(engine: &Engine, kind: &Kind, json: bool) -> serde_json::Result<()> {
    let report = format_report(engine, kind);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in format_formats(&report) {
            println!("{line}");
        }
    }
    Ok(())
}

/// One advertised parameter, as shown by the `params` subcommand.
#[derive(Debug, Serialize)]
pub struct ParamReport {
    pub name: String,
    pub description: String,
    pub default: String,
    pub required: bool,
    /// Whether a validator runs on supplied values.
    pub validated: bool,
}

pub fn param_reports(specs: &[ParamSpec]) -> Vec<ParamReport> {
    specs
        .iter()
        .map(|spec| ParamReport {
            name: spec.name.clone(),
            description: spec.description.clone(),
            default: spec.default.clone(),
            required: spec.required,
            validated: !matches!(spec.validator, Validator::None),
        })
        .collect()
}

pub fn format_params(from: &str, to: &str, reports: &[ParamReport]) -> Vec<String> {
    let mut lines = vec![format!("Parameters for {from} -> {to} ({})", reports.len())];
    if reports.is_empty() {
        lines.push("    (none)".to_string());
    }
    for report in reports {
        let mut flags = Vec::new();
        if report.required {
            flags.push("required");
        }
        if report.validated {
            flags.push("validated");
        }
        let suffix = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        lines.push(format!("    {}{}", report.name, suffix));
        lines.push(format!("        {}", report.description));
        lines.push(format!("        default: {:?}", report.default));
    }
    lines
}

pub fn print_params(
    from: &str,
    to: &str,
    specs: &[ParamSpec],
    json: bool,
) -> serde_json::Result<()> {
    let reports = param_reports(specs);
    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for line in format_params(from, to, &reports) {
            println!("{line}");
        }
    }
    Ok(())
}
