/*
[INPUT]:  AppState gate position, current scanner status, scan progress
[OUTPUT]: Full-screen biometric gate rendered into Ratatui frame
[POS]:    TUI UI gate screen
[UPDATE]: When scan stages, glyphs or prompts change
*/

use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};

use todo_gate_core::{ScanKind, ScanStatus};

use crate::tui::app::AppState;
use crate::tui::runtime::{border_style, centered_rect};

const FINGERPRINT_GLYPH: &[&str] = &[
    "  .-''''-.  ",
    " /  .--.  \\ ",
    " | / .. \\ | ",
    " | | () | | ",
    " | \\ '' / | ",
    "  \\ '--' /  ",
    "   '-..-'   ",
];

const FACE_GLYPH: &[&str] = &[
    "   .------.   ",
    "  /  o  o  \\  ",
    " |    ..    | ",
    " |  \\____/  | ",
    "  \\        /  ",
    "   '------'   ",
];

fn status_color(status: ScanStatus) -> Color {
    match status {
        ScanStatus::Idle => Color::DarkGray,
        ScanStatus::Scanning => Color::Cyan,
        ScanStatus::Success => Color::Green,
        ScanStatus::Error => Color::Red,
    }
}

pub(in crate::tui) fn draw_auth_screen(
    frame: &mut ratatui::Frame,
    area: ratatui::layout::Rect,
    app: &AppState,
) {
    let step = app.session.auth_step();
    let Some(scanner) = app.session.auth().current_scanner() else {
        return;
    };
    let kind = scanner.kind();
    let status = scanner.status();
    let color = status_color(status);

    let panel = centered_rect(area, 60, 80);
    let title = match step.position() {
        Some((index, total)) => format!(" {} Scan - Step {index} of {total} ", kind.label()),
        None => format!(" {} Scan ", kind.label()),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(title);
    let inner = block.inner(panel);
    frame.render_widget(block, panel);

    let glyph = match kind {
        ScanKind::Fingerprint => FINGERPRINT_GLYPH,
        ScanKind::Face => FACE_GLYPH,
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(glyph.len() as u16),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    let glyph_lines = glyph
        .iter()
        .map(|line| Line::from(Span::styled(*line, Style::default().fg(color))))
        .collect::<Vec<_>>();
    frame.render_widget(
        Paragraph::new(glyph_lines).alignment(Alignment::Center),
        rows[1],
    );

    let mut message = vec![Line::from(Span::styled(
        kind.status_text(status),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))];
    if let Some(reason) = scanner.stage().last_error() {
        message.push(Line::from(Span::styled(
            reason.to_string(),
            Style::default().fg(Color::Red),
        )));
    }
    frame.render_widget(
        Paragraph::new(message).alignment(Alignment::Center),
        rows[3],
    );

    if let Some(progress) = app.scan_progress() {
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(color))
            .ratio(progress.clamp(0.0, 1.0))
            .label(format!("{:.0}%", progress * 100.0));
        frame.render_widget(gauge, rows[4]);
    }

    let hints = match status {
        ScanStatus::Idle => "[Enter/Space] Scan   [q] Quit",
        ScanStatus::Scanning | ScanStatus::Success => "[q] Quit",
        ScanStatus::Error => "[r] Retry   [q] Quit",
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            hints,
            Style::default().fg(Color::DarkGray),
        )))
        .alignment(Alignment::Center),
        rows[6],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicode_width::UnicodeWidthStr;

    #[test]
    fn test_glyph_rows_share_one_width() {
        for glyph in [FINGERPRINT_GLYPH, FACE_GLYPH] {
            let width = glyph[0].width();
            assert!(glyph.iter().all(|row| row.width() == width), "{glyph:?}");
        }
    }
}
