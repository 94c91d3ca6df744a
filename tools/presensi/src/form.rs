//! Form state and command dispatch into the record store.
//!
//! Nothing here touches the terminal: `tui` renders a `FormState` and feeds
//! it `FormAction`s, and the one-shot CLI commands call the same command
//! functions so both front ends report identical messages.

use crate::errors::PresensiError;
use crate::logging::EventLog;
use crate::record::{describe, parse_date, render_date, AttendanceStatus, FORMAT_HINT};
use crate::store::AttendanceStore;
use chrono::NaiveDate;
use serde_json::json;

pub const MSG_ADDED: &str = "Attendance record added.";
pub const MSG_MISSING_FIELDS: &str = "All fields must be filled.";
pub const MSG_NOT_FOUND: &str = "Attendance record not found.";
pub const MSG_EMPTY: &str = "No attendance records.";
pub const MSG_SORTED: &str = "Attendance records sorted by date.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Name,
    Date,
    Time,
    Status,
    Query,
    AddButton,
    FindButton,
    ListButton,
    SortButton,
    ExitButton,
}

impl Focus {
    pub const ORDER: [Focus; 10] = [
        Self::Name,
        Self::Date,
        Self::Time,
        Self::Status,
        Self::AddButton,
        Self::Query,
        Self::FindButton,
        Self::ListButton,
        Self::SortButton,
        Self::ExitButton,
    ];

    pub fn next(self) -> Self {
        let idx = self.position();
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }

    pub fn previous(self) -> Self {
        let idx = self.position();
        Self::ORDER[(idx + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    fn position(self) -> usize {
        Self::ORDER
            .iter()
            .position(|focus| *focus == self)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    Input(char),
    Backspace,
    FocusNext,
    FocusPrevious,
    CycleStatus { forward: bool },
    FillToday(NaiveDate),
    Activate,
    AddRecord,
    FindRecord,
    ListAll,
    SortRecords,
    DismissPopup,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFlow {
    Continue,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub name: String,
    pub date: String,
    pub time: String,
    pub status: Option<AttendanceStatus>,
    pub query: String,
    pub focus: Focus,
    pub result: String,
    pub popup: Option<String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            name: String::new(),
            date: String::new(),
            time: String::new(),
            status: None,
            query: String::new(),
            focus: Focus::Name,
            result: String::new(),
            popup: None,
        }
    }
}

impl FormState {
    /// Apply one action. An open popup is modal: the next action only
    /// dismisses it.
    pub fn apply(
        &mut self,
        action: FormAction,
        store: &mut AttendanceStore,
        events: &EventLog,
    ) -> FormFlow {
        if self.popup.is_some() {
            self.popup = None;
            return FormFlow::Continue;
        }

        match action {
            FormAction::Input(ch) => {
                if let Some(field) = self.focused_field_mut() {
                    field.push(ch);
                } else if self.focus == Focus::Status && ch == ' ' {
                    self.cycle_status(true);
                }
            }
            FormAction::Backspace => {
                if let Some(field) = self.focused_field_mut() {
                    field.pop();
                } else if self.focus == Focus::Status {
                    self.status = None;
                }
            }
            FormAction::FocusNext => self.focus = self.focus.next(),
            FormAction::FocusPrevious => self.focus = self.focus.previous(),
            FormAction::CycleStatus { forward } => self.cycle_status(forward),
            FormAction::FillToday(date) => self.date = render_date(date),
            FormAction::Activate => return self.activate(store, events),
            FormAction::AddRecord => self.submit_add(store, events),
            FormAction::FindRecord => {
                self.result = find_command(store, events, &self.query, FindField::Any)
                    .unwrap_or_else(|message| message);
            }
            FormAction::ListAll => self.result = list_command(store),
            FormAction::SortRecords => {
                self.popup = Some(match sort_command(store, events) {
                    Ok(()) => MSG_SORTED.to_string(),
                    Err(message) => message,
                });
            }
            FormAction::DismissPopup => {}
            FormAction::Exit => return FormFlow::Exit,
        }
        FormFlow::Continue
    }

    fn activate(&mut self, store: &mut AttendanceStore, events: &EventLog) -> FormFlow {
        let action = match self.focus {
            Focus::Name | Focus::Date | Focus::Time => FormAction::FocusNext,
            Focus::Status => FormAction::CycleStatus { forward: true },
            Focus::Query | Focus::FindButton => FormAction::FindRecord,
            Focus::AddButton => FormAction::AddRecord,
            Focus::ListButton => FormAction::ListAll,
            Focus::SortButton => FormAction::SortRecords,
            Focus::ExitButton => FormAction::Exit,
        };
        self.apply(action, store, events)
    }

    fn submit_add(&mut self, store: &mut AttendanceStore, events: &EventLog) {
        let status = self.status.map(AttendanceStatus::as_str).unwrap_or("");
        match add_command(store, events, &self.name, &self.date, &self.time, status) {
            Ok(()) => {
                self.popup = Some(MSG_ADDED.to_string());
                self.name.clear();
                self.date.clear();
                self.time.clear();
                self.status = None;
                self.focus = Focus::Name;
            }
            Err(message) => self.popup = Some(message),
        }
    }

    fn cycle_status(&mut self, forward: bool) {
        self.status = Some(match (self.status, forward) {
            (None, _) => AttendanceStatus::Present,
            (Some(status), true) => status.next(),
            (Some(status), false) => status.previous(),
        });
    }

    fn focused_field_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::Name => Some(&mut self.name),
            Focus::Date => Some(&mut self.date),
            Focus::Time => Some(&mut self.time),
            Focus::Query => Some(&mut self.query),
            _ => None,
        }
    }
}

/// Add a record; the error carries the message to show the user.
pub fn add_command(
    store: &mut AttendanceStore,
    events: &EventLog,
    name: &str,
    date: &str,
    time: &str,
    status: &str,
) -> Result<(), String> {
    if [name, date, time, status].iter().any(|field| field.is_empty()) {
        events.warn("record_rejected", json!({"reason": "missing fields"}));
        return Err(MSG_MISSING_FIELDS.to_string());
    }

    match store.add(name, date, time, status) {
        Ok(record) => {
            events.info(
                "record_added",
                json!({
                    "name": record.name,
                    "date": record.date_text(),
                    "time": record.time,
                    "status": record.status,
                }),
            );
            Ok(())
        }
        Err(PresensiError::Validation(reason)) => {
            events.warn("record_rejected", json!({"reason": reason}));
            Err(FORMAT_HINT.to_string())
        }
        Err(error) => {
            events.error("persistence_failed", json!({"error": error.to_string()}));
            Err(error.to_string())
        }
    }
}

/// Which column a lookup compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FindField {
    /// Name, or the date as DD-MM-YYYY.
    #[default]
    Any,
    Name,
    Date,
}

impl FindField {
    fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Name => "name",
            Self::Date => "date",
        }
    }
}

/// Result-pane text for a lookup. Only a date lookup with unparseable text
/// fails, carrying the format hint.
pub fn find_command(
    store: &AttendanceStore,
    events: &EventLog,
    query: &str,
    field: FindField,
) -> Result<String, String> {
    let hit = match field {
        FindField::Any => store.find(query),
        FindField::Name => store.find_by_name(query),
        FindField::Date => {
            let date = parse_date(query).map_err(|_| FORMAT_HINT.to_string())?;
            store.find_by_date(date)
        }
    };
    events.info(
        "record_lookup",
        json!({"query": query, "field": field.as_str(), "found": hit.is_some()}),
    );
    Ok(match hit {
        Some(record) => describe(record),
        None => MSG_NOT_FOUND.to_string(),
    })
}

/// Result-pane text listing every record in current order.
pub fn list_command(store: &AttendanceStore) -> String {
    if store.is_empty() {
        return MSG_EMPTY.to_string();
    }
    store
        .list_all()
        .iter()
        .map(describe)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn sort_command(store: &mut AttendanceStore, events: &EventLog) -> Result<(), String> {
    match store.sort_by_date() {
        Ok(()) => {
            events.info("records_sorted", json!({"records": store.len()}));
            Ok(())
        }
        Err(error) => {
            events.error("persistence_failed", json!({"error": error.to_string()}));
            Err(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        find_command, FindField, Focus, FormAction, FormFlow, FormState, MSG_ADDED, MSG_EMPTY,
        MSG_MISSING_FIELDS, MSG_NOT_FOUND, MSG_SORTED,
    };
    use crate::logging::EventLog;
    use crate::record::{AttendanceStatus, FORMAT_HINT};
    use crate::store::AttendanceStore;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn temp_store() -> (AttendanceStore, TempDir) {
        let dir = TempDir::new().expect("tempdir");
        let mut store = AttendanceStore::new(dir.path().join("presensi.xlsx"));
        store.load().expect("load");
        (store, dir)
    }

    fn type_text(state: &mut FormState, store: &mut AttendanceStore, text: &str) {
        for ch in text.chars() {
            state.apply(FormAction::Input(ch), store, &EventLog::disabled());
        }
    }

    fn fill(state: &mut FormState, store: &mut AttendanceStore, fields: [&str; 3]) {
        let events = EventLog::disabled();
        state.focus = Focus::Name;
        for value in fields {
            type_text(state, store, value);
            state.apply(FormAction::FocusNext, store, &events);
        }
        state.apply(FormAction::CycleStatus { forward: true }, store, &events);
    }

    #[test]
    fn focus_cycles_through_fields_and_buttons() {
        assert_eq!(Focus::Name.next(), Focus::Date);
        assert_eq!(Focus::Status.next(), Focus::AddButton);
        assert_eq!(Focus::ExitButton.next(), Focus::Name);
        assert_eq!(Focus::Name.previous(), Focus::ExitButton);
    }

    #[test]
    fn add_clears_fields_and_shows_popup() {
        let (mut store, _dir) = temp_store();
        let events = EventLog::disabled();
        let mut state = FormState::default();

        fill(&mut state, &mut store, ["Ana", "05-03-2024", "08:30"]);
        assert_eq!(state.status, Some(AttendanceStatus::Present));
        state.apply(FormAction::AddRecord, &mut store, &events);

        assert_eq!(state.popup.as_deref(), Some(MSG_ADDED));
        assert!(state.name.is_empty() && state.date.is_empty() && state.time.is_empty());
        assert_eq!(state.status, None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn add_with_missing_fields_is_refused() {
        let (mut store, _dir) = temp_store();
        let mut state = FormState::default();
        type_text(&mut state, &mut store, "Ana");

        state.apply(FormAction::AddRecord, &mut store, &EventLog::disabled());

        assert_eq!(state.popup.as_deref(), Some(MSG_MISSING_FIELDS));
        assert_eq!(state.name, "Ana");
        assert!(store.is_empty());
    }

    #[test]
    fn add_with_bad_date_shows_format_hint_and_keeps_input() {
        let (mut store, _dir) = temp_store();
        let mut state = FormState::default();
        fill(&mut state, &mut store, ["X", "31-13-2024", "10:00"]);

        state.apply(FormAction::AddRecord, &mut store, &EventLog::disabled());

        assert_eq!(state.popup.as_deref(), Some(FORMAT_HINT));
        assert_eq!(state.date, "31-13-2024");
        assert!(store.is_empty());
    }

    #[test]
    fn popup_swallows_the_next_action() {
        let (mut store, _dir) = temp_store();
        let events = EventLog::disabled();
        let mut state = FormState::default();
        state.apply(FormAction::AddRecord, &mut store, &events);
        assert!(state.popup.is_some());

        let flow = state.apply(FormAction::Exit, &mut store, &events);
        assert_eq!(flow, FormFlow::Continue);
        assert!(state.popup.is_none());
        assert_eq!(
            state.apply(FormAction::Exit, &mut store, &events),
            FormFlow::Exit
        );
    }

    #[test]
    fn find_list_and_sort_update_result_pane() {
        let (mut store, _dir) = temp_store();
        let events = EventLog::disabled();
        let mut state = FormState::default();

        state.apply(FormAction::ListAll, &mut store, &events);
        assert_eq!(state.result, MSG_EMPTY);

        store.add("A", "03-01-2024", "09:00", "Present").expect("add");
        store.add("B", "01-01-2024", "09:00", "Absent").expect("add");

        state.focus = Focus::Query;
        type_text(&mut state, &mut store, "01-01-2024");
        state.apply(FormAction::Activate, &mut store, &events);
        assert!(state.result.starts_with("Name: B\n"));

        state.query = "Citra".to_string();
        state.apply(FormAction::FindRecord, &mut store, &events);
        assert_eq!(state.result, MSG_NOT_FOUND);

        state.apply(FormAction::SortRecords, &mut store, &events);
        assert_eq!(state.popup.as_deref(), Some(MSG_SORTED));
        state.apply(FormAction::DismissPopup, &mut store, &events);

        state.apply(FormAction::ListAll, &mut store, &events);
        let b = state.result.find("Name: B").expect("B listed");
        let a = state.result.find("Name: A").expect("A listed");
        assert!(b < a);
    }

    #[test]
    fn find_can_be_restricted_to_one_column() {
        let (mut store, _dir) = temp_store();
        let events = EventLog::disabled();
        store.add("01-01-2024", "03-01-2024", "09:00", "Absent").expect("add");
        store.add("C", "01-01-2024", "09:00", "Present").expect("add");

        let any = find_command(&store, &events, "01-01-2024", FindField::Any).expect("any");
        assert!(any.starts_with("Name: 01-01-2024
"));

        let by_date = find_command(&store, &events, "01-01-2024", FindField::Date).expect("date");
        assert!(by_date.starts_with("Name: C
"));

        let by_name = find_command(&store, &events, "C", FindField::Name).expect("name");
        assert!(by_name.contains("Date: 01-01-2024"));
        assert_eq!(
            find_command(&store, &events, "03-01-2024", FindField::Name).expect("name"),
            MSG_NOT_FOUND
        );

        assert_eq!(
            find_command(&store, &events, "1-1-24", FindField::Date),
            Err(FORMAT_HINT.to_string())
        );
    }

    #[test]
    fn fill_today_writes_date_pattern() {
        let (mut store, _dir) = temp_store();
        let mut state = FormState::default();
        let today = NaiveDate::from_ymd_opt(2024, 3, 5).expect("date");

        state.apply(FormAction::FillToday(today), &mut store, &EventLog::disabled());
        assert_eq!(state.date, "05-03-2024");
    }

    #[test]
    fn exit_button_ends_the_loop() {
        let (mut store, _dir) = temp_store();
        let mut state = FormState {
            focus: Focus::ExitButton,
            ..FormState::default()
        };
        assert_eq!(
            state.apply(FormAction::Activate, &mut store, &EventLog::disabled()),
            FormFlow::Exit
        );
    }
}
