use log::{debug, info, warn};

use recap_engine::builder::Builder;
use recap_engine::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::recap::config_reader::*;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_export;
pub mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum RecapError {
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Worksheet {worksheet} not found"))]
    MissingWorksheet { worksheet: String },
    #[snafu(display("The input file is empty"))]
    EmptyFile {},
    #[snafu(display("Required column {column} not found in the header"))]
    MissingColumn { column: String },
    #[snafu(display("Line {lineno}: unexpected cell content {content}"))]
    WrongCellType { lineno: usize, content: String },
    #[snafu(display("Line {lineno}: the student count must be a whole non-negative number, found {content}"))]
    InvalidCount { lineno: usize, content: String },
    #[snafu(display("Line {lineno}: invalid record"))]
    InvalidRecord { source: RecapErrors, lineno: usize },

    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Line {lineno}: could not parse CSV line"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Line {lineno}: the CSV line is too short"))]
    CsvLineTooShort { lineno: usize },
    #[snafu(display("Error writing CSV data"))]
    CsvWrite { source: csv::Error },

    #[snafu(display("Error opening JSON file {path}"))]
    OpeningJson { source: std::io::Error, path: String },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },

    #[snafu(display("Error writing Excel file {path}"))]
    WritingExcel {
        source: rust_xlsxwriter::XlsxError,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile { source: std::io::Error, path: String },

    #[snafu(display("Invalid selection: {reason}"))]
    InvalidSelection { reason: String },
    #[snafu(display("The recap could not be computed"))]
    Engine { source: RecapErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type RecapResult<T> = Result<T, RecapError>;

const DEFAULT_RECAP_NAME: &str = "Rekapitulasi";

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub recap: String,
    pub sources: Vec<String>,
    pub terms: Vec<String>,
    pub programs: Vec<String>,
    pub institutions: Vec<String>,
}

fn recap_rows_to_json(table: &RecapTable) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for row in table.rows.iter() {
        let cells: Vec<JSValue> = row
            .cells
            .iter()
            .map(|c| json!({"institution": c.institution, "count": c.count, "percent": c.percent}))
            .collect();
        l.push(json!({
            "code": row.code,
            "programName": row.program_name,
            "degreeLevel": row.degree_level,
            "cells": cells
        }));
    }
    l
}

fn build_summary_js(c: &OutputConfig, table: &RecapTable) -> JSValue {
    let totals: Vec<JSValue> = table
        .totals
        .iter()
        .map(|(name, total)| json!({"institution": name, "total": total}))
        .collect();
    let ambiguities: Vec<JSValue> = table
        .ambiguities
        .iter()
        .map(|amb| {
            let variants: Vec<JSValue> = amb
                .variants
                .iter()
                .map(|(name, level)| json!({"programName": name, "degreeLevel": level}))
                .collect();
            json!({"code": amb.code, "variants": variants})
        })
        .collect();
    json!({
        "config": c,
        "totals": totals,
        "rows": recap_rows_to_json(table),
        "ambiguities": ambiguities
    })
}

/// Lays out the recap as a text grid with a two-level header: the institution names
/// on top, over the identity labels and the count and percentage labels.
pub fn render_table(table: &RecapTable) -> Vec<String> {
    let identity = io_export::IDENTITY_LABELS.len();
    let mut labels: Vec<String> = io_export::IDENTITY_LABELS
        .iter()
        .map(|s| s.to_string())
        .collect();
    for _ in table.institutions.iter() {
        labels.push(io_export::COUNT_LABEL.to_string());
        labels.push(io_export::PERCENT_LABEL.to_string());
    }
    let mut body: Vec<Vec<String>> = vec![labels];
    for row in table.rows.iter() {
        let mut line = vec![
            row.code.clone(),
            row.program_name.clone(),
            row.degree_level.clone(),
        ];
        for cell in row.cells.iter() {
            line.push(cell.count.to_string());
            line.push(format!("{:.2}", cell.percent));
        }
        body.push(line);
    }

    let mut widths: Vec<usize> = vec![0; identity + 2 * table.institutions.len()];
    for line in body.iter() {
        for (idx, s) in line.iter().enumerate() {
            widths[idx] = widths[idx].max(s.chars().count());
        }
    }
    // An institution name spans its two columns.
    for (i, name) in table.institutions.iter().enumerate() {
        let idx = identity + 2 * i;
        let span = widths[idx] + widths[idx + 1] + 2;
        let len = name.chars().count();
        if len > span {
            widths[idx + 1] += len - span;
        }
    }

    let mut top = String::new();
    for width in widths.iter().take(identity) {
        top.push_str(&format!("{:<width$}  ", "", width = width));
    }
    for (i, name) in table.institutions.iter().enumerate() {
        let idx = identity + 2 * i;
        let span = widths[idx] + widths[idx + 1] + 2;
        top.push_str(&format!("{:<width$}  ", name, width = span));
    }

    let mut res: Vec<String> = vec![top.trim_end().to_string()];
    for line in body.iter() {
        let mut out = String::new();
        for (idx, s) in line.iter().enumerate() {
            out.push_str(&format!("{:<width$}  ", s, width = widths[idx]));
        }
        res.push(out.trim_end().to_string());
    }
    res
}

fn resolve_path(root: Option<&Path>, file_path: &str) -> String {
    match root {
        Some(r) if Path::new(file_path).is_relative() => {
            let p: PathBuf = [r, Path::new(file_path)].iter().collect();
            p.as_path().display().to_string()
        }
        _ => file_path.to_string(),
    }
}

fn infer_provider(path: &str) -> String {
    let is_csv = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if is_csv {
        "csv".to_string()
    } else {
        "xlsx".to_string()
    }
}

fn read_records(root: Option<&Path>, cfs: &FileSource) -> RecapResult<Vec<Record>> {
    let p = resolve_path(root, &cfs.file_path);
    info!("Attempting to read data file {:?}", p);
    let records = match cfs.provider.as_str() {
        "xlsx" | "excel" => io_xlsx::read_xlsx_records(&p, cfs),
        "csv" => io_csv::read_csv_records(&p, cfs),
        x => whatever!("Provider not implemented {:?}", x),
    }?;
    info!("Read {} records from {:?}", records.len(), p);
    Ok(records)
}

// The flags take precedence over the configuration file.
fn merge_selection(args: &Args, config: &RecapConfig) -> RecapResult<Selection> {
    let terms = if args.term.is_empty() {
        config.selection.terms.clone()
    } else {
        args.term.clone()
    };
    let programs = if args.program.is_empty() {
        config.selection.programs.clone()
    } else {
        args.program.clone()
    };
    let selection = Selection::new(&terms, &programs);
    ensure!(
        !selection.is_empty(),
        InvalidSelectionSnafu {
            reason: "select at least one term (--term) and one program (--program)"
        }
    );
    Ok(selection)
}

fn target_institutions(args: &Args, config: &RecapConfig) -> Vec<String> {
    if !args.institution.is_empty() {
        args.institution.clone()
    } else if let Some(l) = &config.target_institutions {
        l.clone()
    } else {
        default_target_institutions()
    }
}

// The output directory of the configuration is created when missing.
fn output_directory(root: Option<&Path>, dir: &str) -> RecapResult<PathBuf> {
    let p = PathBuf::from(resolve_path(root, dir));
    fs::create_dir_all(&p).context(WritingFileSnafu {
        path: p.display().to_string(),
    })?;
    Ok(p)
}

// An --export target may be a file or an existing directory.
fn export_path(target: &str, terms: &[String]) -> String {
    if Path::new(target).is_dir() {
        let p: PathBuf = [target, io_export::export_file_name(terms).as_str()]
            .iter()
            .collect();
        p.as_path().display().to_string()
    } else {
        target.to_string()
    }
}

pub fn run_recap(args: &Args) -> RecapResult<()> {
    let (config, root) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path.as_str())
                .parent()
                .map(|p| p.to_path_buf());
            (config, root)
        }
        None => (RecapConfig::default(), None),
    };
    info!("config: {:?}", config);

    let (sources, root): (Vec<FileSource>, Option<PathBuf>) = match &args.input {
        Some(input) => {
            let provider = args
                .input_type
                .clone()
                .unwrap_or_else(|| infer_provider(input));
            let cfs = FileSource {
                provider,
                file_path: input.clone(),
                excel_worksheet_name: args.excel_worksheet_name.clone(),
                columns: None,
            };
            (vec![cfs], None)
        }
        None => (config.data_sources.clone(), root),
    };
    if sources.is_empty() {
        whatever!("No data source: use --input or a configuration file with dataSources");
    }

    let mut records: Vec<Record> = Vec::new();
    for cfs in sources.iter() {
        let mut file_records = read_records(root.as_deref(), cfs)?;
        records.append(&mut file_records);
    }
    info!("Read {} records in total", records.len());

    if args.list {
        let terms = available_terms(&records);
        let programs = available_programs(&records);
        info!("Terms: {}", terms.join(", "));
        info!("Programs: {}", programs.join(", "));
        println!("terms:");
        for t in terms.iter() {
            println!("  {}", t);
        }
        println!("programs:");
        for p in programs.iter() {
            println!("  {}", p);
        }
        return Ok(());
    }

    let selection = merge_selection(args, &config)?;
    let institutions = target_institutions(args, &config);

    let table = match compute_recap(&records, &selection, &institutions).context(EngineSnafu)? {
        Some(t) => t,
        None => {
            warn!(
                "No data found for terms {:?} and programs {:?}, nothing to export",
                selection.terms, selection.programs
            );
            return Ok(());
        }
    };

    for line in render_table(&table) {
        info!("{}", line);
    }

    let output_dir = match &config.output_settings.output_directory {
        Some(d) => Some(output_directory(root.as_deref(), d)?),
        None => None,
    };

    let export_target = match (&args.export, &output_dir) {
        (Some(target), _) => Some(export_path(target, &table.terms)),
        (None, Some(dir)) => Some(
            dir.join(io_export::export_file_name(&table.terms))
                .display()
                .to_string(),
        ),
        (None, None) => None,
    };
    if let Some(target) = export_target {
        io_export::write_recap_xlsx(&table, &target)?;
    }

    let chart_target = match (&args.chart, config.output_settings.generate_chart, &output_dir) {
        (Some(target), _, _) => Some(target.clone()),
        (None, Some(true), Some(dir)) => Some(
            dir.join(io_export::chart_file_name(&table.terms))
                .display()
                .to_string(),
        ),
        _ => None,
    };
    if let Some(target) = chart_target {
        io_export::write_chart_csv(&chart_points(&table), &target)?;
    }

    let c = OutputConfig {
        recap: config
            .output_settings
            .recap_name
            .clone()
            .unwrap_or_else(|| DEFAULT_RECAP_NAME.to_string()),
        sources: sources
            .iter()
            .map(|s| io_common::simplify_file_name(&s.file_path))
            .collect(),
        terms: table.terms.clone(),
        programs: selection.programs.clone(),
        institutions: table.institutions.clone(),
    };
    let result_js = build_summary_js(&c, &table);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    debug!("summary: {}", pretty_js_stats);

    match args.out.as_deref() {
        Some("stdout") => println!("{}", pretty_js_stats),
        Some(out_path) => {
            info!("Writing summary to {:?}", out_path);
            fs::write(out_path, &pretty_js_stats).context(WritingFileSnafu { path: out_path })?;
        }
        None => {}
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &args.reference {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }

    Ok(())
}
