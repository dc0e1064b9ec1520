/*
[INPUT]:  Session (auth gate + task store), log buffer, terminal input
[OUTPUT]: Ratatui-based TUI for the scan gate and task list
[POS]:    TUI module root
[UPDATE]: When adding TUI submodules or public exports
*/

mod app;
mod events;
mod runtime;
mod terminal;
mod ui;
mod view;

pub use runtime::{LogBuffer, LogBufferHandle, LogWriterFactory, run_tui_with_log};
