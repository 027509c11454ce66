use std::collections::HashMap;
use std::path::Path;

use crate::recap::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Positions of the record fields in a row.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct RecordColumns {
    pub term: usize,
    pub institution: usize,
    pub program_code: usize,
    pub program_name: usize,
    pub degree_level: usize,
    pub student_count: usize,
}

impl RecordColumns {
    pub fn max_index(&self) -> usize {
        [
            self.term,
            self.institution,
            self.program_code,
            self.program_name,
            self.degree_level,
            self.student_count,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// Given the header of a file (names of each of the columns), finds the position of each
/// of the required columns.
pub fn get_col_index_mapping(
    names: &ColumnNames,
    header: &[Option<String>],
) -> RecapResult<RecordColumns> {
    let col_names: HashMap<String, usize> = header
        .iter()
        .enumerate()
        .filter_map(|(idx, x)| x.as_ref().map(|s| (s.trim().to_string(), idx)))
        .collect();

    debug!("get_col_index_mapping: col_names: {:?}", col_names);

    let mut col_indexes: Vec<usize> = Vec::new();
    for (_, cname) in names.resolved().iter() {
        let idx = col_names
            .get(cname)
            .context(MissingColumnSnafu { column: cname })?;
        col_indexes.push(*idx);
    }
    Ok(RecordColumns {
        term: col_indexes[0],
        institution: col_indexes[1],
        program_code: col_indexes[2],
        program_name: col_indexes[3],
        degree_level: col_indexes[4],
        student_count: col_indexes[5],
    })
}

/// Parses a student count written as text. Whole numbers written with a decimal
/// point (`30.0`) are accepted.
pub fn parse_count(s: &str, lineno: usize) -> RecapResult<u64> {
    let trimmed = s.trim();
    if let Ok(x) = trimmed.parse::<u64>() {
        return Ok(x);
    }
    match trimmed.parse::<f64>() {
        Ok(f) => count_from_float(f, lineno),
        Err(_) => InvalidCountSnafu {
            lineno,
            content: s.to_string(),
        }
        .fail(),
    }
}

pub fn count_from_float(f: f64, lineno: usize) -> RecapResult<u64> {
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Ok(f as u64)
    } else {
        InvalidCountSnafu {
            lineno,
            content: f.to_string(),
        }
        .fail()
    }
}

/// Renders a number found in a text column (term or program code).
pub fn number_to_text(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// The text values of one row, in record order, before validation.
pub struct RawRow {
    pub lineno: usize,
    pub term: String,
    pub institution: String,
    pub program_code: String,
    pub program_name: String,
    pub degree_level: String,
    pub student_count: u64,
}

pub fn add_raw_row(builder: &mut Builder, row: RawRow) -> RecapResult<()> {
    let lineno = row.lineno;
    builder
        .add_record(Record {
            term_id: row.term,
            institution_name: row.institution,
            program_code: row.program_code,
            program_name: row.program_name,
            degree_level: row.degree_level,
            student_count: row.student_count,
        })
        .context(InvalidRecordSnafu { lineno })
}
