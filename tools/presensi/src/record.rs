use crate::errors::PresensiError;
use chrono::{NaiveDate, NaiveTime};

/// Pattern used to read and write the date column.
pub const DATE_FORMAT: &str = "%d-%m-%Y";
/// Pattern the time column is validated against. The text itself is kept.
pub const TIME_FORMAT: &str = "%H:%M";

pub const FORMAT_HINT: &str =
    "Invalid date or time format. Date must be DD-MM-YYYY and time must be HH:MM.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub name: String,
    pub date: NaiveDate,
    pub time: String,
    pub status: String,
}

impl AttendanceRecord {
    pub fn parse(
        name: &str,
        date_text: &str,
        time_text: &str,
        status: &str,
    ) -> Result<Self, PresensiError> {
        if name.is_empty() {
            return Err(PresensiError::Validation("name must not be empty".to_string()));
        }
        let date = parse_date(date_text)?;
        validate_time(time_text)?;
        Ok(Self {
            name: name.to_string(),
            date,
            time: time_text.to_string(),
            status: status.to_string(),
        })
    }

    pub fn date_text(&self) -> String {
        render_date(self.date)
    }

    /// Cells in backing-file column order.
    pub fn to_row(&self) -> [String; 4] {
        [
            self.name.clone(),
            self.date_text(),
            self.time.clone(),
            self.status.clone(),
        ]
    }
}

pub fn parse_date(text: &str) -> Result<NaiveDate, PresensiError> {
    // chrono's %Y takes any digit count and a sign; the column is always YYYY.
    let year = text.rsplit('-').next().unwrap_or_default();
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid_date(text, "year must have four digits"));
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| invalid_date(text, &e.to_string()))
}

fn invalid_date(text: &str, reason: &str) -> PresensiError {
    PresensiError::Validation(format!("invalid date '{text}' (expected DD-MM-YYYY): {reason}"))
}

pub fn render_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn validate_time(text: &str) -> Result<(), PresensiError> {
    NaiveTime::parse_from_str(text, TIME_FORMAT)
        .map(|_| ())
        .map_err(|e| {
            PresensiError::Validation(format!("invalid time '{text}' (expected HH:MM): {e}"))
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 2] = [Self::Present, Self::Absent];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
    }

    /// Two options, so stepping either way lands on the other one.
    pub fn next(self) -> Self {
        match self {
            Self::Present => Self::Absent,
            Self::Absent => Self::Present,
        }
    }

    pub fn previous(self) -> Self {
        self.next()
    }
}

/// Text block shown for one record in the result pane and on stdout.
pub fn describe(record: &AttendanceRecord) -> String {
    format!(
        "Name: {}\nDate: {}\nTime: {}\nStatus: {}\n",
        record.name,
        record.date_text(),
        record.time,
        record.status
    )
}
