// src/state.rs
use crate::form::WorkoutForm;
use crate::model::Workout;
use crate::rows::{build_rows, WorkoutRow};
use std::collections::HashSet;
use strum_macros::Display;

/// User-triggered operations. Each one carries its own busy flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Operation {
    Refresh,
    Create,
    Update,
    Delete,
    ConvertUnits,
    Import,
    Export,
    ConnectDatabase,
    CheckConnection,
}

/// Issued for every list/search request; only the latest one may touch the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DatabaseStatus {
    #[default]
    Disconnected,
    Connected { name: String },
}

impl DatabaseStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, DatabaseStatus::Connected { .. })
    }
}

/// Everything the controller knows about the view. One writer: the controller.
#[derive(Debug, Default)]
pub struct ViewState {
    pub workouts: Vec<Workout>, // last successful fetch, server order
    pub selected: Option<usize>,
    pub form: WorkoutForm,
    pub search_query: Option<String>,
    pub database: DatabaseStatus,
    pub controls_enabled: bool,
    pending: HashSet<Operation>,
    latest_token: u64,
}

impl ViewState {
    pub fn new(controls_enabled: bool) -> Self {
        ViewState {
            controls_enabled,
            ..Default::default()
        }
    }

    pub fn rows(&self) -> Vec<WorkoutRow> {
        build_rows(&self.workouts)
    }

    pub fn selected_workout(&self) -> Option<&Workout> {
        self.selected.and_then(|index| self.workouts.get(index))
    }

    pub fn index_of(&self, id: i64) -> Option<usize> {
        self.workouts.iter().position(|w| w.id == id)
    }

    pub fn is_pending(&self, op: Operation) -> bool {
        self.pending.contains(&op)
    }

    /// Marks `op` as in flight. Returns `false` when it already was.
    pub fn begin(&mut self, op: Operation) -> bool {
        self.pending.insert(op)
    }

    pub fn settle(&mut self, op: Operation) {
        self.pending.remove(&op);
    }

    pub fn next_token(&mut self) -> RequestToken {
        self.latest_token += 1;
        RequestToken(self.latest_token)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest_token
    }

    /// Replaces the collection if `token` is still the newest request.
    /// Selection never survives a refresh.
    pub fn apply_workouts(&mut self, token: RequestToken, workouts: Vec<Workout>) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.workouts = workouts;
        self.selected = None;
        true
    }

    /// Toggles selection of `index`. Returns the new selection.
    pub fn toggle_selection(&mut self, index: usize) -> Option<usize> {
        if self.selected == Some(index) {
            self.selected = None;
            self.form = WorkoutForm::default();
        } else if let Some(workout) = self.workouts.get(index) {
            self.form = WorkoutForm::from(workout);
            self.selected = Some(index);
        }
        self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn clear_form(&mut self) {
        self.form = WorkoutForm::default();
    }
}
