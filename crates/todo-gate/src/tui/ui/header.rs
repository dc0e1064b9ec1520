/*
[INPUT]:  TaskStore counts
[OUTPUT]: Task screen title bar rendered into Ratatui frame
[POS]:    TUI UI header
[UPDATE]: When header contents change
*/

use ratatui::layout::Alignment;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::tui::app::AppState;
use crate::tui::runtime::{border_style, header_style};

pub(in crate::tui) fn draw_header(
    frame: &mut ratatui::Frame,
    area: ratatui::layout::Rect,
    app: &AppState,
) {
    let counts = app
        .session
        .tasks()
        .map(|store| store.counts())
        .unwrap_or_default();
    let summary = format!(
        "{} tasks, {} done, {} open",
        counts.total,
        counts.completed,
        counts.total - counts.completed
    );

    let lines = vec![
        Line::from(Span::styled(" TO DO LIST ", header_style())),
        Line::from(summary),
    ];
    let widget = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style()),
    );
    frame.render_widget(widget, area);
}
