// Primitives for reading CSV files.

use std::io::Read;

use crate::recap::{
    io_common::{add_raw_row, get_col_index_mapping, parse_count, RawRow, RecordColumns},
    *,
};

pub fn read_csv_records(path: &str, cfs: &FileSource) -> RecapResult<Vec<Record>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    read_csv_from(rdr, cfs)
}

fn read_csv_from<R: Read>(rdr: csv::Reader<R>, cfs: &FileSource) -> RecapResult<Vec<Record>> {
    let mut records = rdr.into_records();

    let header: Vec<Option<String>> = records
        .next()
        .context(EmptyFileSnafu {})?
        .context(CsvLineParseSnafu { lineno: 1usize })?
        .iter()
        .map(|s| Some(s.to_string()))
        .collect();
    debug!("read_csv_records: header: {:?}", header);
    let cols = get_col_index_mapping(&cfs.column_names(), &header)?;

    let mut builder = Builder::new();
    for (idx, line_r) in records.enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        debug!("read_csv_records: lineno: {:?} row: {:?}", lineno, line);
        let row = read_line(&line, &cols, lineno)?;
        add_raw_row(&mut builder, row)?;
    }
    Ok(builder.records().to_vec())
}

fn read_line(line: &csv::StringRecord, cols: &RecordColumns, lineno: usize) -> RecapResult<RawRow> {
    ensure!(line.len() > cols.max_index(), CsvLineTooShortSnafu { lineno });
    let get = |idx: usize| -> RecapResult<String> {
        line.get(idx)
            .map(|s| s.to_string())
            .context(CsvLineTooShortSnafu { lineno })
    };
    Ok(RawRow {
        lineno,
        term: get(cols.term)?,
        institution: get(cols.institution)?,
        program_code: get(cols.program_code)?,
        program_name: get(cols.program_name)?,
        degree_level: get(cols.degree_level)?,
        student_count: parse_count(&get(cols.student_count)?, lineno)?,
    })
}

// Used by the tests to read from memory.
#[cfg(test)]
pub fn read_csv_str(data: &str, cfs: &FileSource) -> RecapResult<Vec<Record>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data.as_bytes());
    read_csv_from(rdr, cfs)
}
