use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::recap::{
    io_common::{
        add_raw_row, count_from_float, get_col_index_mapping, number_to_text, parse_count, RawRow,
    },
    *,
};

pub fn read_xlsx_records(path: &str, cfs: &FileSource) -> RecapResult<Vec<Record>> {
    let wrange = get_range(path, cfs)?;

    let header = wrange.rows().next().context(EmptyFileSnafu {})?;
    debug!("read_xlsx_records: header: {:?}", header);
    let cols = get_col_index(&cfs.column_names(), header)?;

    let mut iter = wrange.rows();
    iter.next();
    let mut builder = Builder::new();
    let empty = DataType::Empty;
    for (idx, row) in iter.enumerate() {
        // The header is line 1, as displayed by spreadsheet programs.
        let lineno = idx + 2;
        debug!("read_xlsx_records: lineno: {:?} row: {:?}", lineno, &row);
        if row.iter().all(|c| matches!(c, DataType::Empty)) {
            debug!("read_xlsx_records: lineno: {:?}: skipping empty row", lineno);
            continue;
        }

        let cell = |col_idx: usize| row.get(col_idx).unwrap_or(&empty);
        let raw = RawRow {
            lineno,
            term: read_text(cell(cols.term), lineno)?,
            institution: read_text(cell(cols.institution), lineno)?,
            program_code: read_text(cell(cols.program_code), lineno)?,
            program_name: read_text(cell(cols.program_name), lineno)?,
            degree_level: read_text(cell(cols.degree_level), lineno)?,
            student_count: read_count(cell(cols.student_count), lineno)?,
        };
        add_raw_row(&mut builder, raw)?;
    }
    Ok(builder.records().to_vec())
}

fn get_col_index(
    names: &ColumnNames,
    header: &[DataType],
) -> RecapResult<io_common::RecordColumns> {
    let remapped: Vec<Option<String>> = header
        .iter()
        .map(|dt| match dt {
            DataType::String(s) => Some(s.clone()),
            _ => None,
        })
        .collect();
    get_col_index_mapping(names, &remapped)
}

fn read_text(cell: &DataType, lineno: usize) -> RecapResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Float(f) => Ok(number_to_text(*f)),
        // The record check reports the missing value.
        DataType::Empty => Ok("".to_string()),
        _ => WrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

fn read_count(cell: &DataType, lineno: usize) -> RecapResult<u64> {
    match cell {
        DataType::Int(i) if *i >= 0 => Ok(*i as u64),
        DataType::Float(f) => count_from_float(*f, lineno),
        DataType::String(s) => parse_count(s, lineno),
        _ => InvalidCountSnafu {
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

fn get_range(path: &str, cfs: &FileSource) -> RecapResult<calamine::Range<DataType>> {
    let worksheet_name_o = cfs.excel_worksheet_name.clone();
    debug!(
        "read_xlsx_records: path: {:?} worksheet: {:?}",
        path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(&worksheet_name)
            .context(MissingWorksheetSnafu {
                worksheet: worksheet_name.clone(),
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let sheet_names = workbook.sheet_names().to_vec();
        if sheet_names.len() > 1 {
            info!(
                "read_xlsx_records: {} worksheets in {:?}, using the first one: {:?}",
                sheet_names.len(),
                path,
                sheet_names.first()
            );
        }
        let wrange = workbook
            .worksheet_range_at(0)
            .context(MissingWorksheetSnafu {
                worksheet: "(first)",
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn write_workbook(file_name: &str, rows: &[Vec<Option<&str>>], count_as_number: bool) -> String {
        let path = std::env::temp_dir().join(file_name);
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                match v {
                    None => {}
                    // Counts and terms of data rows are written as numbers, like the PDDikti exports.
                    Some(s) if r > 0 && count_as_number && (c == 0 || c == 5) => {
                        sheet
                            .write_number(r as u32, c as u16, s.parse::<f64>().unwrap())
                            .unwrap();
                    }
                    Some(s) => {
                        sheet.write_string(r as u32, c as u16, *s).unwrap();
                    }
                }
            }
        }
        workbook.save(&path).unwrap();
        path.display().to_string()
    }

    fn source(path: &str) -> FileSource {
        FileSource {
            provider: "xlsx".to_string(),
            file_path: path.to_string(),
            excel_worksheet_name: None,
            columns: None,
        }
    }

    fn header() -> Vec<Option<&'static str>> {
        vec![
            Some("id_smt"),
            Some("nama_pt"),
            Some("kode_prodi"),
            Some("nm_prodi"),
            Some("nm_jenj_didik"),
            Some("jumlah_mhs"),
        ]
    }

    #[test]
    fn reads_numeric_cells() {
        let rows = vec![
            header(),
            vec![
                Some("20231"),
                Some("Universitas Kristen Petra"),
                Some("61201"),
                Some("Manajemen"),
                Some("S1"),
                Some("120"),
            ],
            vec![None, None, None, None, None, None],
            vec![
                Some("20232"),
                Some("Universitas Kristen Petra"),
                Some("55201"),
                Some("Informatika"),
                Some("S1"),
                Some("80"),
            ],
        ];
        let path = write_workbook("rekap_io_xlsx_numeric.xlsx", &rows, true);
        let records = read_xlsx_records(&path, &source(&path)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].term_id, "20231");
        assert_eq!(records[0].student_count, 120);
        assert_eq!(records[1].program_code, "55201");
        assert_eq!(records[1].student_count, 80);
    }

    #[test]
    fn fractional_count_is_rejected() {
        let rows = vec![
            header(),
            vec![
                Some("20231"),
                Some("Universitas Kristen Petra"),
                Some("61201"),
                Some("Manajemen"),
                Some("S1"),
                Some("12.5"),
            ],
        ];
        let path = write_workbook("rekap_io_xlsx_fraction.xlsx", &rows, true);
        let err = read_xlsx_records(&path, &source(&path)).unwrap_err();
        assert!(matches!(err, RecapError::InvalidCount { lineno: 2, .. }));
    }

    #[test]
    fn unknown_worksheet() {
        let path = write_workbook("rekap_io_xlsx_sheet.xlsx", &[header()], false);
        let mut cfs = source(&path);
        cfs.excel_worksheet_name = Some("Data".to_string());
        let err = read_xlsx_records(&path, &cfs).unwrap_err();
        assert!(matches!(err, RecapError::MissingWorksheet { .. }));
    }
}
