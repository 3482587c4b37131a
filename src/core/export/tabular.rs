//! CSV and XLSX dumps of a record batch
//!
//! Tabular exports carry every source column under its original name with no
//! fixed-width formatting. Columns are the union of all records' columns in
//! order of first appearance.

use crate::domain::{BpaError, FieldValue, Record, Result};
use indexmap::IndexSet;
use rust_xlsxwriter::{Format, Workbook};

/// Worksheet name of the XLSX export
pub const SHEET_NAME: &str = "BPA_Export";

const MAX_COLUMN_WIDTH: usize = 255;

/// Column names over the whole batch, in first-appearance order
pub fn column_union(records: &[Record]) -> Vec<String> {
    let mut columns: IndexSet<&str> = IndexSet::new();
    for record in records {
        columns.extend(record.column_names());
    }
    columns.into_iter().map(str::to_string).collect()
}

/// Renders the batch as CSV with every cell quoted
pub fn render_csv(records: &[Record]) -> Result<Vec<u8>> {
    let columns = column_union(records);
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    if !columns.is_empty() {
        writer.write_record(&columns)?;
    }
    for record in records {
        writer.write_record(columns.iter().map(|name| record.text(name)))?;
    }
    writer
        .into_inner()
        .map_err(|e| BpaError::Write(format!("Failed to finish CSV output: {}", e.error())))
}

/// Renders the batch as a single-sheet workbook
pub fn render_xlsx(records: &[Record]) -> Result<Vec<u8>> {
    let columns = column_union(records);
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();

    for (col, name) in columns.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, name, &header_format)?;
    }

    for (offset, record) in records.iter().enumerate() {
        let row = (offset + 1) as u32;
        for (col, name) in columns.iter().enumerate() {
            let col16 = col as u16;
            let value = record.value(name);
            match value {
                FieldValue::Null => {}
                FieldValue::Integer(n) => {
                    sheet.write_number(row, col16, *n as f64)?;
                }
                FieldValue::Decimal(d) => {
                    sheet.write_number(row, col16, *d)?;
                }
                FieldValue::Bool(b) => {
                    sheet.write_boolean(row, col16, *b)?;
                }
                _ => {
                    sheet.write_string(row, col16, value.to_plain_string())?;
                }
            }
            widths[col] = widths[col].max(value.to_plain_string().chars().count());
        }
    }

    for (col, width) in widths.iter().enumerate() {
        let width = (width + 2).min(MAX_COLUMN_WIDTH);
        sheet.set_column_width(col as u16, width as f64)?;
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<Record> {
        vec![
            Record::new()
                .with("cod_procedimento", "0301010064")
                .with("quantidade", 2i64),
            Record::new()
                .with("cod_procedimento", "0301010072")
                .with("nome_paciente", "José \"Zé\" Silva"),
        ]
    }

    #[test]
    fn test_column_union_keeps_first_appearance_order() {
        assert_eq!(
            column_union(&records()),
            vec!["cod_procedimento", "quantidade", "nome_paciente"]
        );
    }

    #[test]
    fn test_csv_quotes_every_cell() {
        let bytes = render_csv(&records()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "\"cod_procedimento\",\"quantidade\",\"nome_paciente\""
        );
        assert_eq!(lines[1], "\"0301010064\",\"2\",\"\"");
        assert_eq!(lines[2], "\"0301010072\",\"\",\"José \"\"Zé\"\" Silva\"");
    }

    #[test]
    fn test_xlsx_is_a_zip_container() {
        let bytes = render_xlsx(&records()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_empty_batch_renders_nothing() {
        let text = String::from_utf8(render_csv(&[]).unwrap()).unwrap();
        assert!(text.is_empty());
    }
}
