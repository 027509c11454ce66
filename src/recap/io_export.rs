// Writers for the recap: Excel workbook and chart data.

use std::io::Write;

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, XlsxError};

use crate::recap::*;

pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const SHEET_NAME: &str = "Rekapitulasi";

pub const IDENTITY_LABELS: [&str; 3] = ["Kode", "Nama Prodi", "Jenjang"];
pub const COUNT_LABEL: &str = "Jumlah Mhs";
pub const PERCENT_LABEL: &str = "%";

/// The name of the exported file for the given terms, for example `Rekapitulasi_20231_20232.xlsx`.
pub fn export_file_name(terms: &[String]) -> String {
    format!("{}_{}.xlsx", SHEET_NAME, terms.join("_"))
}

pub fn chart_file_name(terms: &[String]) -> String {
    format!("{}_{}_chart.csv", SHEET_NAME, terms.join("_"))
}

/// The two header rows of the recap.
///
/// The first row holds the identity labels, then each institution name over its
/// two columns (the second one left blank, it is covered by a merge in the workbook).
/// The second row is blank under the identity labels.
pub fn header_rows(table: &RecapTable) -> (Vec<String>, Vec<String>) {
    let mut top: Vec<String> = IDENTITY_LABELS.iter().map(|s| s.to_string()).collect();
    let mut bottom: Vec<String> = vec!["".to_string(); IDENTITY_LABELS.len()];
    for name in table.institutions.iter() {
        top.push(name.clone());
        top.push("".to_string());
        bottom.push(COUNT_LABEL.to_string());
        bottom.push(PERCENT_LABEL.to_string());
    }
    (top, bottom)
}

fn build_workbook(table: &RecapTable) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();

    let fmt_header = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin);
    let fmt_integer = Format::new().set_num_format("0");
    let fmt_percent = Format::new().set_num_format("0.00");

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let (top, bottom) = header_rows(table);
    for (col, label) in top.iter().enumerate().take(IDENTITY_LABELS.len()) {
        sheet.write_string_with_format(0, col as u16, label, &fmt_header)?;
    }
    for (idx, name) in table.institutions.iter().enumerate() {
        let col = (IDENTITY_LABELS.len() + 2 * idx) as u16;
        sheet.merge_range(0, col, 0, col + 1, name, &fmt_header)?;
    }
    for (col, label) in bottom.iter().enumerate() {
        if label.is_empty() {
            sheet.write_blank(1, col as u16, &fmt_header)?;
        } else {
            sheet.write_string_with_format(1, col as u16, label, &fmt_header)?;
        }
    }

    for (idx, row) in table.rows.iter().enumerate() {
        let r = (idx + 2) as u32;
        sheet.write_string(r, 0, &row.code)?;
        sheet.write_string(r, 1, &row.program_name)?;
        sheet.write_string(r, 2, &row.degree_level)?;
        for (c_idx, cell) in row.cells.iter().enumerate() {
            let col = (IDENTITY_LABELS.len() + 2 * c_idx) as u16;
            sheet.write_number_with_format(r, col, cell.count as f64, &fmt_integer)?;
            sheet.write_number_with_format(r, col + 1, cell.percent, &fmt_percent)?;
        }
    }

    sheet.set_column_width(0, 10)?;
    sheet.set_column_width(1, 30)?;
    sheet.set_column_width(2, 10)?;
    sheet.set_freeze_panes(2, IDENTITY_LABELS.len() as u16)?;

    Ok(workbook)
}

pub fn recap_to_xlsx_bytes(table: &RecapTable) -> RecapResult<Vec<u8>> {
    let mut workbook = build_workbook(table).context(WritingExcelSnafu { path: "(memory)" })?;
    workbook
        .save_to_buffer()
        .context(WritingExcelSnafu { path: "(memory)" })
}

pub fn write_recap_xlsx(table: &RecapTable, path: &str) -> RecapResult<()> {
    info!("Writing recap to {:?} ({})", path, XLSX_MIME_TYPE);
    let bytes = recap_to_xlsx_bytes(table)?;
    fs::write(path, bytes).context(WritingFileSnafu { path })
}

pub fn write_chart<W: Write>(points: &[ChartPoint], writer: W) -> RecapResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Kode", "Nama Prodi", "Universitas", COUNT_LABEL])
        .context(CsvWriteSnafu {})?;
    for p in points.iter() {
        let count = p.count.to_string();
        wtr.write_record([
            p.code.as_str(),
            p.program_name.as_str(),
            p.institution.as_str(),
            count.as_str(),
        ])
        .context(CsvWriteSnafu {})?;
    }
    wtr.flush().context(WritingFileSnafu { path: "(chart)" })?;
    Ok(())
}

pub fn write_chart_csv(points: &[ChartPoint], path: &str) -> RecapResult<()> {
    info!("Writing chart data to {:?}", path);
    let file = fs::File::create(path).context(WritingFileSnafu { path })?;
    write_chart(points, file)
}
