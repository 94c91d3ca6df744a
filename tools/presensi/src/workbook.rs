//! Spreadsheet access for the backing file.
//!
//! Reading goes through calamine so any workbook a spreadsheet program saved
//! back (xlsx, xls, ods) still loads. Writing always produces a fresh xlsx
//! with every cell stored as text.

use crate::errors::PresensiError;
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveTime, TimeDelta};
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

const COLUMN_WIDTH: f64 = 16.0;

/// Read the first sheet of `path` as text rows, header included.
pub fn read_rows(path: &Path) -> Result<Vec<Vec<String>>, PresensiError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| PresensiError::Load(format!("failed to open {}: {e}", path.display())))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| {
            PresensiError::Load(format!("failed to read first sheet of {}: {e}", path.display()))
        })?,
        None => return Ok(Vec::new()),
    };

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

/// Replace `path` with a single-sheet workbook holding `header` then `rows`.
pub fn write_rows<R>(path: &Path, header: &[&str], rows: &[R]) -> Result<(), PresensiError>
where
    R: AsRef<[String]>,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| PresensiError::Persistence(e.to_string()))?;
        }
    }

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();

    for (col, title) in header.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *title, &bold)
            .map_err(persistence_err)?;
        worksheet
            .set_column_width(col as u16, COLUMN_WIDTH)
            .map_err(persistence_err)?;
    }

    for (idx, row) in rows.iter().enumerate() {
        let row_num = (idx + 1) as u32;
        for (col, value) in row.as_ref().iter().enumerate() {
            worksheet
                .write_string(row_num, col as u16, value.as_str())
                .map_err(persistence_err)?;
        }
    }

    workbook.save(path).map_err(persistence_err)
}

fn persistence_err(error: rust_xlsxwriter::XlsxError) -> PresensiError {
    PresensiError::Persistence(error.to_string())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::DateTime(dt) => excel_serial_text(dt.as_f64()),
        Data::DateTimeIso(s) => iso_text(s),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#{e:?}"),
    }
}

/// A spreadsheet program may turn our text cells into serial date values.
/// Serials below one day are times of day, anything else is a date.
fn excel_serial_text(value: f64) -> String {
    if (0.0..1.0).contains(&value) {
        let total_minutes = (value * 24.0 * 60.0).round() as u32;
        return NaiveTime::from_hms_opt((total_minutes / 60) % 24, total_minutes % 60, 0)
            .map(|time| time.format(crate::record::TIME_FORMAT).to_string())
            .unwrap_or_else(|| value.to_string());
    }

    // Excel counts days from 1899-12-30.
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .zip(TimeDelta::try_days(value.floor() as i64))
        .and_then(|(epoch, days)| epoch.checked_add_signed(days))
        .map(crate::record::render_date)
        .unwrap_or_else(|| value.to_string())
}

fn iso_text(value: &str) -> String {
    let date_part = value.split('T').next().unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(crate::record::render_date)
        .unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::{excel_serial_text, iso_text, read_rows, write_rows};

    #[test]
    fn written_rows_read_back_as_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/book.xlsx");
        let rows = vec![vec![
            "Ana".to_string(),
            "05-03-2024".to_string(),
            "08:30".to_string(),
            "Present".to_string(),
        ]];

        write_rows(&path, &["Name", "Date", "Time", "Status"], &rows).expect("write");
        let read = read_rows(&path).expect("read");

        assert_eq!(read.len(), 2);
        assert_eq!(read[0], vec!["Name", "Date", "Time", "Status"]);
        assert_eq!(read[1], rows[0]);
    }

    #[test]
    fn header_only_workbook_reads_one_row() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("book.xlsx");
        write_rows::<Vec<String>>(&path, &["Name", "Date", "Time", "Status"], &[])
            .expect("write");
        assert_eq!(read_rows(&path).expect("read").len(), 1);
    }

    #[test]
    fn serial_values_render_in_record_patterns() {
        // 45356 is 2024-03-05 in the 1900 date system.
        assert_eq!(excel_serial_text(45356.0), "05-03-2024");
        assert_eq!(excel_serial_text(0.5), "12:00");
        assert_eq!(excel_serial_text(8.5 / 24.0), "08:30");
    }

    #[test]
    fn iso_dates_render_in_record_pattern() {
        assert_eq!(iso_text("2024-01-03T00:00:00"), "03-01-2024");
        assert_eq!(iso_text("not a date"), "not a date");
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = read_rows(&dir.path().join("absent.xlsx")).expect_err("missing");
        assert!(err.to_string().contains("failed to open"));
    }
}
