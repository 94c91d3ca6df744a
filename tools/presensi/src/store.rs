use crate::errors::PresensiError;
use crate::record::AttendanceRecord;
use crate::workbook::{read_rows, write_rows};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

pub const HEADER: [&str; 4] = ["Name", "Date", "Time", "Status"];
pub const DEFAULT_FILE_NAME: &str = "presensi.xlsx";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Backing file was absent; a header-only file was written.
    Created,
    Loaded(usize),
}

/// In-memory attendance list mirrored to a spreadsheet file.
///
/// Every mutation rewrites the whole file before returning, so after a
/// successful call the file and `list_all()` agree.
#[derive(Debug)]
pub struct AttendanceStore {
    path: PathBuf,
    records: Vec<AttendanceRecord>,
}

impl AttendanceStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            records: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Replace the in-memory list with the backing file's rows.
    ///
    /// Any bad row fails the whole load and leaves the list empty.
    pub fn load(&mut self) -> Result<LoadOutcome, PresensiError> {
        self.records.clear();

        if !self.path.exists() {
            self.save()?;
            return Ok(LoadOutcome::Created);
        }

        let rows = read_rows(&self.path)?;
        let mut loaded = Vec::with_capacity(rows.len().saturating_sub(1));
        for (idx, row) in rows.iter().enumerate().skip(1) {
            // idx 0 is the header, spreadsheet rows are 1-based.
            let record = record_from_row(row)
                .map_err(|reason| PresensiError::Load(format!("row {}: {reason}", idx + 1)))?;
            loaded.push(record);
        }

        self.records = loaded;
        Ok(LoadOutcome::Loaded(self.records.len()))
    }

    pub fn save(&self) -> Result<(), PresensiError> {
        let rows = self
            .records
            .iter()
            .map(AttendanceRecord::to_row)
            .collect::<Vec<_>>();
        write_rows(&self.path, &HEADER, &rows)
    }

    /// Validate and append one record, then persist.
    ///
    /// A validation failure leaves both the list and the file untouched.
    pub fn add(
        &mut self,
        name: &str,
        date_text: &str,
        time_text: &str,
        status: &str,
    ) -> Result<&AttendanceRecord, PresensiError> {
        let record = AttendanceRecord::parse(name, date_text, time_text, status)?;
        self.records.push(record);
        self.save()?;
        let last = self.records.len() - 1;
        Ok(&self.records[last])
    }

    /// First record, in current order, whose name or rendered date equals
    /// `query`. Name is compared before date.
    pub fn find(&self, query: &str) -> Option<&AttendanceRecord> {
        self.records
            .iter()
            .find(|record| record.name == query || record.date_text() == query)
    }

    /// Name-only lookup, for callers that must not match a date.
    pub fn find_by_name(&self, name: &str) -> Option<&AttendanceRecord> {
        self.records.iter().find(|record| record.name == name)
    }

    /// Date-only lookup.
    pub fn find_by_date(&self, date: NaiveDate) -> Option<&AttendanceRecord> {
        self.records.iter().find(|record| record.date == date)
    }

    pub fn list_all(&self) -> &[AttendanceRecord] {
        &self.records
    }

    /// Stable ascending sort by date, then persist.
    pub fn sort_by_date(&mut self) -> Result<(), PresensiError> {
        self.records.sort_by_key(|record| record.date);
        self.save()
    }
}

fn record_from_row(row: &[String]) -> Result<AttendanceRecord, String> {
    let [name, date, time, status, ..] = row else {
        return Err(format!("expected 4 columns, found {}", row.len()));
    };
    AttendanceRecord::parse(name, date, time, status).map_err(|e| e.to_string())
}
