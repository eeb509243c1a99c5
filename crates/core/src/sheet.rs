//! Spreadsheet interchange: CSV rows in, CSV tables out.
//!
//! Uploaded files become [`SourceRow`]s keyed by header; exported tables
//! follow the column order declared by the entity registry.

use serde_json::Value;

use crate::error::CoreError;
use crate::import::SourceRow;
use crate::types::{value_as_text, Record};

/// Parse an uploaded CSV file.
///
/// The first line is the header. Cells are trimmed and kept as strings;
/// blank lines are skipped but still counted, so `row_number` always matches
/// the line a user sees in their spreadsheet program.
pub fn parse_csv_rows(data: &[u8]) -> Result<Vec<SourceRow>, CoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CoreError::Validation(format!("CSV parse error: {e}")))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CoreError::Validation("CSV header row is empty".into()));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| CoreError::Validation(format!("CSV parse error: {e}")))?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let row_number = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(rows.len() + 2);

        let mut fields = Record::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            if header.is_empty() {
                continue;
            }
            fields.insert(header.clone(), Value::String(cell.to_string()));
        }

        rows.push(SourceRow {
            row_number,
            record: fields,
        });
    }

    Ok(rows)
}

/// Serialize rows as CSV with a header of `columns`, in that order.
///
/// Missing cells and nulls are written empty.
pub fn build_csv(columns: &[&str], rows: &[Record]) -> Result<Vec<u8>, CoreError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(columns)
        .map_err(|e| CoreError::Internal(format!("CSV write error: {e}")))?;

    for row in rows {
        let cells = columns
            .iter()
            .map(|c| row.get(*c).map(value_as_text).unwrap_or_default());
        writer
            .write_record(cells)
            .map_err(|e| CoreError::Internal(format!("CSV write error: {e}")))?;
    }

    writer
        .into_inner()
        .map_err(|e| CoreError::Internal(format!("CSV flush error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_header_keyed_rows_with_line_numbers() {
        let data = b"sol_id,branch_name,cluster_id\n0042, Andheri ,1\n\n0043,\"Fort, Main\",1\n";
        let rows = parse_csv_rows(data).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[0].record["branch_name"], "Andheri");
        assert_eq!(rows[1].row_number, 4);
        assert_eq!(rows[1].record["branch_name"], "Fort, Main");
    }

    #[test]
    fn strips_byte_order_mark_from_first_header() {
        let data = "\u{feff}name\nRavi\n".as_bytes();
        let rows = parse_csv_rows(data).unwrap();
        assert_eq!(rows[0].record["name"], "Ravi");
    }

    #[test]
    fn short_rows_leave_fields_absent() {
        let rows = parse_csv_rows(b"name,email\nRavi\n").unwrap();
        assert!(rows[0].record.get("email").is_none());
    }

    #[test]
    fn build_follows_column_order_and_blanks_nulls() {
        let row = json!({"name": "Ravi", "id": 3, "role": null})
            .as_object()
            .unwrap()
            .clone();
        let out = build_csv(&["id", "name", "role", "email"], &[row]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "id,name,role,email\n3,Ravi,,\n");
    }

    #[test]
    fn build_quotes_embedded_commas() {
        let row = json!({"remarks": "late, rain"}).as_object().unwrap().clone();
        let out = build_csv(&["remarks"], &[row]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "remarks\n\"late, rain\"\n");
    }
}
