// src/surface.rs
use crate::form::WorkoutForm;
use crate::rows::WorkoutRow;
use crate::state::Operation;

/// Inline status line under the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Success(String),
    Error(String),
    Info(String),
}

/// Everything the controller needs from the user-facing side.
/// Implementations only draw and ask; they never call the backend.
pub trait ViewSurface {
    fn render_table(&mut self, rows: &[WorkoutRow], selected: Option<usize>);
    fn show_form(&mut self, form: &WorkoutForm);
    fn show_status(&mut self, status: Status);
    /// Blocking notice the user has to acknowledge.
    fn alert(&mut self, message: &str);
    fn confirm(&mut self, question: &str) -> bool;
    /// `None` when the user cancels.
    fn prompt(&mut self, question: &str) -> Option<String>;
    fn set_selection_controls(&mut self, visible: bool);
    fn set_controls_enabled(&mut self, enabled: bool);
    fn set_database_status(&mut self, status: &str);
    fn set_pending(&mut self, op: Operation, pending: bool);
    fn reset_file_input(&mut self);
    fn save_download(&mut self, file_name: &str, contents: &[u8]) -> std::io::Result<()>;
}
