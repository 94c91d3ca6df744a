use crate::form::{Focus, FormAction};
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyBinding {
    pub key: &'static str,
    pub action: &'static str,
}

pub const FORM_BINDINGS: [HotkeyBinding; 8] = [
    HotkeyBinding {
        key: "Tab",
        action: "next",
    },
    HotkeyBinding {
        key: "Enter",
        action: "press",
    },
    HotkeyBinding {
        key: "^A",
        action: "add",
    },
    HotkeyBinding {
        key: "^F",
        action: "find",
    },
    HotkeyBinding {
        key: "^L",
        action: "list",
    },
    HotkeyBinding {
        key: "^S",
        action: "sort",
    },
    HotkeyBinding {
        key: "^T",
        action: "today",
    },
    HotkeyBinding {
        key: "Esc",
        action: "exit",
    },
];

pub fn controls_legend() -> String {
    format_bindings("Keys: ", &FORM_BINDINGS)
}

/// Translate a key press into a form action. `None` means ignore the key.
pub fn action_for_key(
    key: KeyEvent,
    focus: Focus,
    popup_open: bool,
    today: NaiveDate,
) -> Option<FormAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if popup_open {
        return Some(FormAction::DismissPopup);
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('a') => Some(FormAction::AddRecord),
            KeyCode::Char('f') => Some(FormAction::FindRecord),
            KeyCode::Char('l') => Some(FormAction::ListAll),
            KeyCode::Char('s') => Some(FormAction::SortRecords),
            KeyCode::Char('t') => Some(FormAction::FillToday(today)),
            KeyCode::Char('q') | KeyCode::Char('c') => Some(FormAction::Exit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Esc => Some(FormAction::Exit),
        KeyCode::Tab | KeyCode::Down => Some(FormAction::FocusNext),
        KeyCode::BackTab | KeyCode::Up => Some(FormAction::FocusPrevious),
        KeyCode::Enter => Some(FormAction::Activate),
        KeyCode::Backspace => Some(FormAction::Backspace),
        KeyCode::Left if focus == Focus::Status => Some(FormAction::CycleStatus { forward: false }),
        KeyCode::Right if focus == Focus::Status => Some(FormAction::CycleStatus { forward: true }),
        KeyCode::Char(ch) => Some(FormAction::Input(ch)),
        _ => None,
    }
}

fn format_bindings(prefix: &str, bindings: &[HotkeyBinding]) -> String {
    let parts = bindings
        .iter()
        .map(|binding| format!("{} {}", binding.key, binding.action))
        .collect::<Vec<_>>();
    format!("{prefix}{}", parts.join("  "))
}

#[cfg(test)]
mod tests {
    use super::{action_for_key, controls_legend};
    use crate::form::{Focus, FormAction};
    use chrono::NaiveDate;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).expect("date")
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn control_chords_map_to_commands() {
        let cases = [
            ('a', FormAction::AddRecord),
            ('f', FormAction::FindRecord),
            ('l', FormAction::ListAll),
            ('s', FormAction::SortRecords),
            ('t', FormAction::FillToday(today())),
            ('q', FormAction::Exit),
        ];
        for (ch, expected) in cases {
            let key = press(KeyCode::Char(ch), KeyModifiers::CONTROL);
            assert_eq!(action_for_key(key, Focus::Name, false, today()), Some(expected));
        }
    }

    #[test]
    fn plain_characters_are_field_input() {
        let key = press(KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(
            action_for_key(key, Focus::Name, false, today()),
            Some(FormAction::Input('a'))
        );
        let key = press(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(
            action_for_key(key, Focus::Name, false, today()),
            Some(FormAction::Input('A'))
        );
    }

    #[test]
    fn arrows_cycle_status_only_when_focused() {
        let left = press(KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(
            action_for_key(left, Focus::Status, false, today()),
            Some(FormAction::CycleStatus { forward: false })
        );
        assert_eq!(action_for_key(left, Focus::Name, false, today()), None);
    }

    #[test]
    fn any_key_dismisses_open_popup() {
        let key = press(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(
            action_for_key(key, Focus::Name, true, today()),
            Some(FormAction::DismissPopup)
        );
    }

    #[test]
    fn key_release_events_are_ignored() {
        let key = KeyEvent {
            code: KeyCode::Enter,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(action_for_key(key, Focus::AddButton, false, today()), None);
    }

    #[test]
    fn legend_lists_every_binding() {
        let legend = controls_legend();
        assert!(legend.starts_with("Keys: "));
        for key in ["^A add", "^F find", "^L list", "^S sort", "Esc exit"] {
            assert!(legend.contains(key), "missing {key}");
        }
    }
}
