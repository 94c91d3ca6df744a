use crate::errors::PresensiError;
use crate::form::{Focus, FormFlow, FormState};
use crate::hotkeys::{action_for_key, controls_legend};
use crate::logging::EventLog;
use crate::runtime::Clock;
use crate::store::AttendanceStore;
use crossterm::event::{self, Event};
use ratatui::backend::TestBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::{DefaultTerminal, Frame, Terminal};

const LABEL_WIDTH: usize = 18;

const BUTTONS: [(Focus, &str); 5] = [
    (Focus::AddButton, "Add"),
    (Focus::FindButton, "Find"),
    (Focus::ListButton, "List"),
    (Focus::SortButton, "Sort"),
    (Focus::ExitButton, "Exit"),
];

pub fn draw_form(frame: &mut Frame, state: &FormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            "ATTENDANCE",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  record, find and sort attendance entries"),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let status = state
        .status
        .map(|status| status.as_str())
        .unwrap_or_default();
    let record_lines = vec![
        field_line("Name", &state.name, state.focus == Focus::Name),
        field_line("Date (DD-MM-YYYY)", &state.date, state.focus == Focus::Date),
        field_line("Time (HH:MM)", &state.time, state.focus == Focus::Time),
        field_line("Status (<- ->)", status, state.focus == Focus::Status),
    ];
    frame.render_widget(
        Paragraph::new(record_lines)
            .block(Block::default().borders(Borders::ALL).title("Record")),
        chunks[1],
    );

    frame.render_widget(
        Paragraph::new(field_line(
            "Name or date",
            &state.query,
            state.focus == Focus::Query,
        ))
        .block(Block::default().borders(Borders::ALL).title("Search")),
        chunks[2],
    );

    let mut buttons = Vec::new();
    for (focus, label) in BUTTONS {
        let style = if state.focus == focus {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        buttons.push(Span::styled(format!("[ {label} ]"), style));
        buttons.push(Span::raw("  "));
    }
    frame.render_widget(
        Paragraph::new(Line::from(buttons))
            .block(Block::default().borders(Borders::ALL).title("Actions")),
        chunks[3],
    );

    frame.render_widget(
        Paragraph::new(state.result.as_str())
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Results")),
        chunks[4],
    );

    frame.render_widget(
        Paragraph::new(controls_legend()).style(Style::default().fg(Color::DarkGray)),
        chunks[5],
    );

    if let Some(message) = &state.popup {
        let area = popup_area(frame.area());
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(message.as_str())
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("Notice")
                        .border_style(Style::default().fg(Color::Yellow)),
                ),
            area,
        );
    }
}

fn field_line<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
    let label = Span::raw(format!("{label:<LABEL_WIDTH$} "));
    if focused {
        Line::from(vec![
            label,
            Span::styled(
                format!("{value}_"),
                Style::default().fg(Color::Black).bg(Color::Cyan),
            ),
        ])
    } else {
        Line::from(vec![label, Span::raw(value)])
    }
}

fn popup_area(area: Rect) -> Rect {
    let width = (area.width * 3 / 5).max(20).min(area.width);
    let height = 5.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Render one frame into a string, row by row.
pub fn render_form(state: &FormState, width: u16, height: u16) -> Result<String, PresensiError> {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).map_err(terminal_err)?;
    terminal
        .draw(|frame| draw_form(frame, state))
        .map_err(terminal_err)?;

    let mut out = String::new();
    let buffer = terminal.backend().buffer();
    for y in 0..height {
        for x in 0..width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    Ok(out)
}

/// Run the interactive form until the user exits. `notice` opens as a
/// popup before the first key press.
pub fn run_form(
    store: &mut AttendanceStore,
    clock: &dyn Clock,
    events: &EventLog,
    notice: Option<String>,
) -> Result<(), PresensiError> {
    let mut terminal = ratatui::try_init().map_err(terminal_err)?;
    let result = event_loop(&mut terminal, store, clock, events, notice);
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    store: &mut AttendanceStore,
    clock: &dyn Clock,
    events: &EventLog,
    notice: Option<String>,
) -> Result<(), PresensiError> {
    let mut state = FormState {
        popup: notice,
        ..FormState::default()
    };

    loop {
        terminal
            .draw(|frame| draw_form(frame, &state))
            .map_err(terminal_err)?;

        let Event::Key(key) = event::read().map_err(terminal_err)? else {
            continue;
        };
        let today = clock.now().date();
        let Some(action) = action_for_key(key, state.focus, state.popup.is_some(), today) else {
            continue;
        };
        if state.apply(action, store, events) == FormFlow::Exit {
            return Ok(());
        }
    }
}

fn terminal_err(error: std::io::Error) -> PresensiError {
    PresensiError::Terminal(error.to_string())
}
