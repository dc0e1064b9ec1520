/*
[INPUT]:  AppState and log buffer handles
[OUTPUT]: Render functions for the gate screen and the task screen panels
[POS]:    TUI UI module root
[UPDATE]: When adding a screen or panel
*/

mod auth;
mod header;
mod logs;
mod task_list;

pub(in crate::tui) use auth::draw_auth_screen;
pub(in crate::tui) use header::draw_header;
pub(in crate::tui) use logs::draw_logs;
pub(in crate::tui) use task_list::draw_task_panel;
