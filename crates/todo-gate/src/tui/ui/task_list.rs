/*
[INPUT]:  TaskStore snapshot, TaskListView focus/input/edit state
[OUTPUT]: New-task input and task list rendered into Ratatui frame
[POS]:    TUI UI task panel
[UPDATE]: When task row layout or inline edit rendering changes
*/

use ratatui::layout::{Constraint, Direction, Layout, Position};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::app::AppState;
use crate::tui::runtime::border_style;
use crate::tui::view::Focus;

const EMPTY_MESSAGE: &str = "No tasks yet. Add one above!";
const HIGHLIGHT_SYMBOL: &str = "> ";
const DONE_MARKER: &str = "[x] ";
const OPEN_MARKER: &str = "[ ] ";

fn focused_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        border_style()
    }
}

pub(in crate::tui) fn draw_task_panel(
    frame: &mut ratatui::Frame,
    area: ratatui::layout::Rect,
    app: &mut AppState,
) {
    let Some(store) = app.session.tasks() else {
        return;
    };
    let view = &mut app.view;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let input_focused = view.focus() == Focus::Input && view.editing().is_none();
    let input = Paragraph::new(view.input().to_string()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focused_border(input_focused))
            .title("New task"),
    );
    frame.render_widget(input, layout[0]);
    if input_focused {
        let width = view.input().width() as u16;
        let x = (layout[0].x + 1 + width).min(layout[0].right().saturating_sub(2));
        frame.set_cursor_position(Position::new(x, layout[0].y + 1));
    }

    let list_block = Block::default()
        .borders(Borders::ALL)
        .border_style(focused_border(view.focus() == Focus::List))
        .title("Tasks");

    if store.is_empty() {
        let empty = Paragraph::new(Span::styled(
            EMPTY_MESSAGE,
            Style::default().fg(Color::DarkGray),
        ))
        .block(list_block);
        frame.render_widget(empty, layout[1]);
        return;
    }

    let editing = view.editing().cloned();
    let items = store
        .tasks()
        .iter()
        .map(|task| {
            if let Some(edit) = editing.as_ref().filter(|edit| edit.id == task.id) {
                return ListItem::new(Line::from(vec![
                    Span::raw(OPEN_MARKER),
                    Span::styled(
                        edit.buffer.clone(),
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::UNDERLINED),
                    ),
                ]));
            }
            if task.completed {
                ListItem::new(Line::from(vec![
                    Span::styled(DONE_MARKER, Style::default().fg(Color::Green)),
                    Span::styled(
                        task.text.clone(),
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::CROSSED_OUT),
                    ),
                ]))
            } else {
                ListItem::new(Line::from(vec![
                    Span::raw(OPEN_MARKER),
                    Span::raw(task.text.clone()),
                ]))
            }
        })
        .collect::<Vec<_>>();

    let list_area = layout[1];
    let list = List::new(items)
        .block(list_block)
        .highlight_style(
            Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(HIGHLIGHT_SYMBOL);
    frame.render_stateful_widget(list, list_area, view.list_state_mut());

    if let (Some(edit), Some(selected)) = (editing, view.selected_index()) {
        let state = view.list_state_mut();
        let row = selected.saturating_sub(state.offset()) as u16;
        let prefix = (HIGHLIGHT_SYMBOL.width() + OPEN_MARKER.width()) as u16;
        let x = list_area.x + 1 + prefix + edit.buffer.width() as u16;
        let y = list_area.y + 1 + row;
        if x < list_area.right().saturating_sub(1) && y < list_area.bottom().saturating_sub(1) {
            frame.set_cursor_position(Position::new(x, y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use todo_gate_core::{AuthTiming, MemoryStore, Session, TASKS_KEY};

    use crate::tui::app::AppState;
    use crate::tui::runtime::LogBuffer;

    async fn unlocked_app(storage: MemoryStore) -> AppState {
        let timing = AuthTiming {
            scan_delay: std::time::Duration::from_millis(10),
            settle_delay: std::time::Duration::from_millis(10),
        };
        let mut session = Session::simulated(Arc::new(storage), timing);
        while !session.is_authenticated() {
            session.trigger_scan();
            let event = session.next_auth_event().await.unwrap();
            session.apply_auth_event(event);
        }
        let mut app = AppState::new(session, Arc::new(Mutex::new(LogBuffer::new(8))));
        app.view.sync_selection(app.session.tasks().map_or(0, |store| store.len()));
        app
    }

    fn render(app: &mut AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal
            .draw(|frame| draw_task_panel(frame, frame.area(), app))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test(start_paused = true)]
    async fn test_renders_markers_for_seed_tasks() {
        let mut app = unlocked_app(MemoryStore::new()).await;
        let screen = render(&mut app);
        assert!(screen.contains("[ ] Review the weekly plan"));
        assert!(screen.contains("[x] Set up the to-do list"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_renders_empty_message() {
        let storage = MemoryStore::with_entry(TASKS_KEY, "[]");
        let mut app = unlocked_app(storage).await;
        let screen = render(&mut app);
        assert!(screen.contains(EMPTY_MESSAGE));
    }
}
