use anyhow::{Context, Result};
use chanops_core::channel::channel_from_row;
use chanops_core::session::Session;
use chanops_core::status::Operation;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Terminal;
use std::io::{self, Stdout};

/// How the operator left the list: throw the session away, or run
/// reconciliation and push the result to the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitIntent {
    Discard,
    Commit,
}

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Run the interactive channel list until the operator quits. Keys
/// 1-6 apply the matching operation to the selected channel, Up/Down
/// move the selection, `q` discards, `s` commits.
pub fn run(session: &mut Session) -> Result<ExitIntent> {
    let mut terminal = init_terminal()?;
    let result = event_loop(&mut terminal, session);
    restore_terminal(&mut terminal)?;
    result
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().context("failed to clear terminal")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

fn event_loop(terminal: &mut Tui, session: &mut Session) -> Result<ExitIntent> {
    let mut rows = session.display_rows();
    let mut list_state = ListState::default();
    if !rows.is_empty() {
        list_state.select(Some(0));
    }

    loop {
        terminal
            .draw(|frame| draw(frame, &rows, &mut list_state, session.has_pending()))
            .context("failed to draw frame")?;

        let Event::Key(key) = event::read().context("failed to read terminal event")? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(ExitIntent::Discard),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(ExitIntent::Discard);
            }
            KeyCode::Char('s') => return Ok(ExitIntent::Commit),
            KeyCode::Down => move_selection(&mut list_state, rows.len(), 1),
            KeyCode::Up => move_selection(&mut list_state, rows.len(), -1),
            KeyCode::Char(c) => {
                if let Some(op) = Operation::from_key(c) {
                    let Some(selected) = list_state.selected() else {
                        continue;
                    };
                    let channel = channel_from_row(&rows[selected]).to_string();
                    session.apply(op, &channel)?;
                    rows = session.display_rows();
                }
            }
            _ => {}
        }
    }
}

fn move_selection(state: &mut ListState, len: usize, delta: i64) {
    if len == 0 {
        return;
    }
    let current = state.selected().unwrap_or(0) as i64;
    let next = (current + delta).clamp(0, len as i64 - 1);
    state.select(Some(next as usize));
}

fn draw(
    frame: &mut ratatui::Frame,
    rows: &[String],
    list_state: &mut ListState,
    pending: bool,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(3)])
        .split(frame.area());

    let help = Paragraph::new(help_text(pending))
        .block(Block::default().title("Keys").borders(Borders::ALL))
        .style(Style::default().fg(Color::White));
    frame.render_widget(help, chunks[0]);

    let items: Vec<ListItem> = rows.iter().map(|r| ListItem::new(r.as_str())).collect();
    let list = List::new(items)
        .block(Block::default().title("Channels").borders(Borders::ALL))
        .style(Style::default().fg(Color::Yellow))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, chunks[1], list_state);
}

fn help_text(pending: bool) -> String {
    let mut lines = Vec::with_capacity(4);
    for pair in Operation::all().chunks(2) {
        let line: Vec<String> = pair
            .iter()
            .map(|op| format!("{}. {}", op.key(), op.help_text()))
            .collect();
        lines.push(line.join("  ==  "));
    }
    let tail = if pending {
        "q. discard and quit  ==  s. commit and quit (changes pending)"
    } else {
        "q. discard and quit  ==  s. commit and quit"
    };
    lines.push(tail.to_string());
    lines.join("\n")
}
