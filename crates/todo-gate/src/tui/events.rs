/*
[INPUT]:  Key events from the input thread
[OUTPUT]: AppState mutations (gate triggers, task commands, quit)
[POS]:    TUI key dispatch
[UPDATE]: When adding screen-level keybindings
*/

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::AppState;
use super::view::ViewOutcome;

pub(super) fn handle_key_event(app: &mut AppState, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if !app.session.is_authenticated() {
        handle_auth_key(app, key.code);
        return;
    }

    let Some(store) = app.session.tasks_mut() else {
        return;
    };
    match app.view.handle_key(key.code, store) {
        ViewOutcome::None => {}
        ViewOutcome::Quit => app.should_quit = true,
        ViewOutcome::ToggleLogs => app.show_logs = !app.show_logs,
        ViewOutcome::Message(message) => app.status_message = message,
    }
}

fn handle_auth_key(app: &mut AppState, code: KeyCode) {
    match code {
        KeyCode::Enter | KeyCode::Char(' ') => app.trigger_scan(),
        KeyCode::Char('r') => app.retry_scan(),
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use todo_gate_core::{AuthStep, AuthTiming, MemoryStore, Session};

    use crate::tui::runtime::LogBuffer;

    fn app() -> AppState {
        let timing = AuthTiming {
            scan_delay: Duration::from_millis(50),
            settle_delay: Duration::from_millis(20),
        };
        let session = Session::simulated(Arc::new(MemoryStore::new()), timing);
        AppState::new(session, Arc::new(Mutex::new(LogBuffer::new(16))))
    }

    fn press(app: &mut AppState, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    async fn drain_until(app: &mut AppState, step: AuthStep) {
        while app.session.auth_step() != step {
            let event = app
                .session
                .next_auth_event()
                .await
                .expect("scanner channel open");
            app.apply_auth_event(event);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_drive_gate_then_task_screen() {
        let mut app = app();

        // Task keys do nothing while locked
        press(&mut app, KeyCode::Char('d'));
        assert!(app.session.tasks().is_none());

        press(&mut app, KeyCode::Enter);
        assert!(app.scan_started.is_some());
        drain_until(&mut app, AuthStep::Face).await;
        assert_eq!(app.status_message, "Fingerprint accepted");

        press(&mut app, KeyCode::Char(' '));
        drain_until(&mut app, AuthStep::Authenticated).await;
        assert_eq!(app.status_message, "Welcome back");
        assert_eq!(app.view.selected_index(), Some(0));

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.session.tasks().map(|store| store.len()), Some(2));
        assert_eq!(app.status_message, "Task deleted");

        press(&mut app, KeyCode::Char('l'));
        assert!(app.show_logs);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let mut app = app();
        handle_key_event(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }
}
