/*
[INPUT]:  Key codes, TaskStore
[OUTPUT]: TaskStore commands (add/toggle/edit/delete) and list interaction state
[POS]:    TUI task list interaction model, kept free of rendering for tests
[UPDATE]: When changing task list keybindings or inline edit behaviour
*/

use ratatui::crossterm::event::KeyCode;
use ratatui::widgets::ListState;

use todo_gate_core::{Task, TaskId, TaskStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Focus {
    List,
    Input,
}

/// Inline edit in progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct EditState {
    pub(super) id: TaskId,
    pub(super) buffer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum ViewOutcome {
    None,
    Quit,
    ToggleLogs,
    Message(String),
}

pub(super) struct TaskListView {
    focus: Focus,
    input: String,
    editing: Option<EditState>,
    list_state: ListState,
}

impl TaskListView {
    pub(super) fn new() -> Self {
        Self {
            focus: Focus::List,
            input: String::new(),
            editing: None,
            list_state: ListState::default(),
        }
    }

    pub(super) fn focus(&self) -> Focus {
        self.focus
    }

    pub(super) fn input(&self) -> &str {
        &self.input
    }

    pub(super) fn editing(&self) -> Option<&EditState> {
        self.editing.as_ref()
    }

    pub(super) fn list_state_mut(&mut self) -> &mut ListState {
        &mut self.list_state
    }

    pub(super) fn selected_index(&self) -> Option<usize> {
        self.list_state.selected()
    }

    /// Edit is offered only for incomplete tasks and never while another edit is open
    pub(super) fn can_edit(&self, task: &Task) -> bool {
        self.editing.is_none() && !task.completed
    }

    /// Clamp the selection to a collection of `len` rows
    pub(super) fn sync_selection(&mut self, len: usize) {
        let next = match (len, self.list_state.selected()) {
            (0, _) => None,
            (_, None) => Some(0),
            (len, Some(selected)) => Some(selected.min(len - 1)),
        };
        self.list_state.select(next);
    }

    pub(super) fn handle_key(&mut self, key: KeyCode, store: &mut TaskStore) -> ViewOutcome {
        self.sync_selection(store.len());
        if self.editing.is_some() {
            return self.handle_edit_key(key, store);
        }
        match self.focus {
            Focus::Input => self.handle_input_key(key, store),
            Focus::List => self.handle_list_key(key, store),
        }
    }

    fn handle_input_key(&mut self, key: KeyCode, store: &mut TaskStore) -> ViewOutcome {
        match key {
            KeyCode::Char(ch) => {
                self.input.push(ch);
                ViewOutcome::None
            }
            KeyCode::Backspace => {
                self.input.pop();
                ViewOutcome::None
            }
            KeyCode::Enter => {
                let added = store.add(&self.input);
                // Cleared whether or not the add went through
                self.input.clear();
                match added {
                    Some(_) => {
                        self.list_state.select(Some(0));
                        ViewOutcome::Message("Task added".to_string())
                    }
                    None => ViewOutcome::None,
                }
            }
            KeyCode::Esc | KeyCode::Tab | KeyCode::Down => {
                self.focus = Focus::List;
                ViewOutcome::None
            }
            _ => ViewOutcome::None,
        }
    }

    fn handle_list_key(&mut self, key: KeyCode, store: &mut TaskStore) -> ViewOutcome {
        match key {
            KeyCode::Char('q') => ViewOutcome::Quit,
            KeyCode::Char('l') => ViewOutcome::ToggleLogs,
            KeyCode::Char('i') | KeyCode::Char('a') | KeyCode::Tab => {
                self.focus = Focus::Input;
                ViewOutcome::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(-1, store.len());
                ViewOutcome::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(1, store.len());
                ViewOutcome::None
            }
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                let Some(id) = self.selected_id(store) else {
                    return ViewOutcome::None;
                };
                store.toggle(id);
                match store.get(id) {
                    Some(task) if task.completed => ViewOutcome::Message("Task completed".to_string()),
                    Some(_) => ViewOutcome::Message("Task reopened".to_string()),
                    None => ViewOutcome::None,
                }
            }
            KeyCode::Char('e') | KeyCode::Enter => self.begin_edit(store),
            KeyCode::Char('d') | KeyCode::Delete => {
                let Some(id) = self.selected_id(store) else {
                    return ViewOutcome::None;
                };
                if store.delete(id) {
                    self.sync_selection(store.len());
                    ViewOutcome::Message("Task deleted".to_string())
                } else {
                    ViewOutcome::None
                }
            }
            _ => ViewOutcome::None,
        }
    }

    fn handle_edit_key(&mut self, key: KeyCode, store: &mut TaskStore) -> ViewOutcome {
        match key {
            KeyCode::Char(ch) => {
                if let Some(edit) = self.editing.as_mut() {
                    edit.buffer.push(ch);
                }
                ViewOutcome::None
            }
            KeyCode::Backspace => {
                if let Some(edit) = self.editing.as_mut() {
                    edit.buffer.pop();
                }
                ViewOutcome::None
            }
            KeyCode::Enter => self.commit_edit(store),
            KeyCode::Esc => {
                self.editing = None;
                ViewOutcome::Message("Edit cancelled".to_string())
            }
            // Leaving the row is a blur: save first, then move
            KeyCode::Up | KeyCode::Down | KeyCode::Tab => {
                let outcome = self.commit_edit(store);
                match key {
                    KeyCode::Up => self.move_selection(-1, store.len()),
                    KeyCode::Down => self.move_selection(1, store.len()),
                    _ => self.focus = Focus::Input,
                }
                outcome
            }
            _ => ViewOutcome::None,
        }
    }

    fn begin_edit(&mut self, store: &TaskStore) -> ViewOutcome {
        let Some(task) = self.selected_id(store).and_then(|id| store.get(id)) else {
            return ViewOutcome::None;
        };
        if !self.can_edit(task) {
            return ViewOutcome::Message("Completed tasks cannot be edited".to_string());
        }
        self.editing = Some(EditState {
            id: task.id,
            buffer: task.text.clone(),
        });
        ViewOutcome::None
    }

    fn commit_edit(&mut self, store: &mut TaskStore) -> ViewOutcome {
        let Some(edit) = self.editing.take() else {
            return ViewOutcome::None;
        };
        let unchanged = store
            .get(edit.id)
            .is_some_and(|task| task.text == edit.buffer.trim());
        if unchanged {
            return ViewOutcome::None;
        }
        if store.edit(edit.id, &edit.buffer) {
            ViewOutcome::Message("Task updated".to_string())
        } else {
            ViewOutcome::None
        }
    }

    fn selected_id(&self, store: &TaskStore) -> Option<TaskId> {
        let index = self.list_state.selected()?;
        store.tasks().get(index).map(|task| task.id)
    }

    fn move_selection(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, (len - 1) as isize) as usize;
        self.list_state.select(Some(next));
    }
}
