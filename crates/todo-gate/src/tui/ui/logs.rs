/*
[INPUT]:  LogBufferHandle tail
[OUTPUT]: Log panel rendered into Ratatui frame
[POS]:    TUI UI logs panel
[UPDATE]: When log panel layout changes
*/

use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::tui::runtime::{border_style, lock_log_buffer, LogBufferHandle};

pub(in crate::tui) fn draw_logs(
    frame: &mut ratatui::Frame,
    area: ratatui::layout::Rect,
    buffer: &LogBufferHandle,
) {
    let available = area.height.saturating_sub(2) as usize;
    let lines = lock_log_buffer(buffer).tail(available);

    let text = lines.into_iter().map(Line::from).collect::<Vec<_>>();
    let widget = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title("Logs"),
    );
    frame.render_widget(widget, area);
}
