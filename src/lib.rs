use std::path::Path;
use tracing::{debug, error, info, warn};

// --- Declare modules ---
pub mod api_client;
mod config;
pub mod form;
pub mod model;
pub mod rows;
pub mod state;
pub mod surface;

// --- Expose public types ---
pub use api_client::{extract_error_message, ApiError, HttpBackend, WorkoutBackend};
pub use config::{
    get_config_path as get_config_path_util,
    load_config as load_config_util,
    parse_color,
    save_config as save_config_util,
    Config,
    ConfigError,
    StandardColor,
    ThemeConfig,
};
pub use form::{FormField, ValidationError, WorkoutForm};
pub use model::{NewWorkout, UnitType, Workout, WorkoutId, WorkoutUpdate};
pub use rows::WorkoutRow;
pub use state::{DatabaseStatus, Operation, RequestToken, ViewState};
pub use surface::{Status, ViewSurface};

/// Fixed name for the CSV download produced by `export`.
pub const EXPORT_FILE_NAME: &str = "workouts.csv";

const GENERIC_FAILURE: &str = "Could not reach the workout server. Please try again.";
const DATABASE_REQUIRED: &str = "Connect a workout database first.";

/// How an action ended. Side effects (refresh, form clear) may have run regardless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// Refused before reaching the backend (validation, no selection, controls disabled).
    Rejected(String),
    /// The user declined a confirmation or prompt.
    Cancelled,
    Failed(String),
    /// Same operation already in flight.
    Busy,
}

impl ActionOutcome {
    pub const fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Completed | ActionOutcome::Cancelled)
    }
}

#[derive(Clone, Copy)]
enum Notice {
    Inline,
    Alert,
}

/// Mediates between the form, the table and the backend.
pub struct WorkoutView<B: WorkoutBackend, S: ViewSurface> {
    pub state: ViewState,
    backend: B,
    surface: S,
    database_binding: bool,
}

impl<B: WorkoutBackend, S: ViewSurface> WorkoutView<B, S> {
    /// With `database_binding` set, every data control starts disabled until a
    /// database is connected (or found connected by `load`).
    pub fn new(backend: B, surface: S, database_binding: bool) -> Self {
        Self {
            state: ViewState::new(!database_binding),
            backend,
            surface,
            database_binding,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Initial page load: restore a bound database, or just fetch everything.
    pub async fn load(&mut self) -> ActionOutcome {
        self.surface.set_controls_enabled(self.state.controls_enabled);
        self.surface.set_selection_controls(false);
        self.surface.show_form(&self.state.form);
        if self.database_binding {
            self.check_connection().await
        } else {
            self.fetch(None).await
        }
    }

    // --- Listing ---

    pub async fn refresh(&mut self) -> ActionOutcome {
        if let Some(outcome) = self.guard_controls() {
            return outcome;
        }
        self.fetch(None).await
    }

    /// An empty or whitespace-only query lists everything.
    pub async fn search(&mut self, query: &str) -> ActionOutcome {
        if let Some(outcome) = self.guard_controls() {
            return outcome;
        }
        self.fetch(Some(query)).await
    }

    async fn fetch(&mut self, query: Option<&str>) -> ActionOutcome {
        if !self.begin(Operation::Refresh) {
            return ActionOutcome::Busy;
        }
        let token = self.state.next_token();
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let result = match query {
            Some(q) => self.backend.search_by_name(q).await,
            None => self.backend.list_all().await,
        };
        self.settle(Operation::Refresh);

        match result {
            Ok(workouts) => {
                let count = workouts.len();
                if !self.state.apply_workouts(token, workouts) {
                    warn!("Dropping stale workout list ({} records)", count);
                    return ActionOutcome::Completed;
                }
                self.state.search_query = query.map(str::to_string);
                self.render_table();
                self.surface.set_selection_controls(false);
                debug!("Rendered {} workouts", count);
                ActionOutcome::Completed
            }
            Err(e) => {
                // Selection never survives a refresh, failed or not
                self.state.clear_selection();
                self.surface.set_selection_controls(false);
                self.report(e, "Failed to load workouts.", Notice::Alert)
            }
        }
    }

    // --- Selection and form ---

    /// Clicking the selected row again deselects it and clears the form.
    pub fn select_row(&mut self, index: usize) -> ActionOutcome {
        if index >= self.state.workouts.len() {
            let message = format!("No workout at row {}.", index + 1);
            self.surface.show_status(Status::Error(message.clone()));
            return ActionOutcome::Rejected(message);
        }
        let selected = self.state.toggle_selection(index);
        self.surface.show_form(&self.state.form);
        self.surface.set_selection_controls(selected.is_some());
        self.render_table();
        ActionOutcome::Completed
    }

    /// Selects the row holding workout `id`. Already selected is left alone.
    pub fn select_by_id(&mut self, id: i64) -> ActionOutcome {
        match self.state.index_of(id) {
            Some(index) if self.state.selected == Some(index) => ActionOutcome::Completed,
            Some(index) => self.select_row(index),
            None => {
                let message = format!("Workout with ID {id} not found.");
                self.surface.show_status(Status::Error(message.clone()));
                ActionOutcome::Rejected(message)
            }
        }
    }

    pub fn set_form_field(&mut self, field: FormField, value: impl Into<String>) {
        self.state.form.set(field, value);
        self.surface.show_form(&self.state.form);
    }

    pub fn clear_form(&mut self) {
        self.state.clear_form();
        self.surface.show_form(&self.state.form);
    }

    // --- Mutations ---

    pub async fn create(&mut self) -> ActionOutcome {
        if let Some(outcome) = self.guard_controls() {
            return outcome;
        }
        let workout = match self.state.form.validate() {
            Ok(workout) => workout,
            Err(e) => return self.reject(e),
        };
        if !self.begin(Operation::Create) {
            return ActionOutcome::Busy;
        }
        let result = self.backend.create(&workout).await;
        self.settle(Operation::Create);

        let outcome = match result {
            Ok(()) => {
                info!("Created workout '{}'", workout.name);
                self.surface
                    .show_status(Status::Success(format!("Added workout: {}", workout.name)));
                ActionOutcome::Completed
            }
            Err(e) => self.report(e, "Failed to add workout.", Notice::Inline),
        };
        self.finish_mutation().await;
        outcome
    }

    pub async fn update(&mut self) -> ActionOutcome {
        if let Some(outcome) = self.guard_controls() {
            return outcome;
        }
        let Some(id) = self.state.selected_workout().map(|w| w.id) else {
            return self.no_selection("update");
        };
        let fields = match self.state.form.validate() {
            Ok(fields) => fields,
            Err(e) => return self.reject(e),
        };
        if !self.begin(Operation::Update) {
            return ActionOutcome::Busy;
        }
        let result = self.backend.update(&WorkoutUpdate { id, fields }).await;
        self.settle(Operation::Update);

        let outcome = match result {
            Ok(()) => {
                info!("Updated workout {}", id);
                self.surface
                    .show_status(Status::Success(format!("Workout {id} updated.")));
                ActionOutcome::Completed
            }
            Err(e) => self.report(e, "Failed to update workout.", Notice::Inline),
        };
        self.finish_mutation().await;
        outcome
    }

    pub async fn delete(&mut self) -> ActionOutcome {
        if let Some(outcome) = self.guard_controls() {
            return outcome;
        }
        let Some((id, name)) = self
            .state
            .selected_workout()
            .map(|w| (w.id, w.name.clone()))
        else {
            return self.no_selection("delete");
        };
        if !self
            .surface
            .confirm(&format!("Delete workout '{name}' (ID {id})?"))
        {
            debug!("Delete of workout {} declined", id);
            return ActionOutcome::Cancelled;
        }
        if !self.begin(Operation::Delete) {
            return ActionOutcome::Busy;
        }
        let result = self.backend.delete(WorkoutId { id }).await;
        self.settle(Operation::Delete);

        let outcome = match result {
            Ok(()) => {
                info!("Deleted workout {}", id);
                self.surface
                    .show_status(Status::Success(format!("Deleted workout ID {id}.")));
                ActionOutcome::Completed
            }
            Err(e) => self.report(e, "Failed to delete workout.", Notice::Alert),
        };
        self.finish_mutation().await;
        outcome
    }

    pub async fn convert_units(&mut self, target: UnitType) -> ActionOutcome {
        if let Some(outcome) = self.guard_controls() {
            return outcome;
        }
        if !self
            .surface
            .confirm(&format!("Convert all workouts to {target}?"))
        {
            return ActionOutcome::Cancelled;
        }
        if !self.begin(Operation::ConvertUnits) {
            return ActionOutcome::Busy;
        }
        let result = self.backend.convert_units(target).await;
        self.settle(Operation::ConvertUnits);

        let outcome = match result {
            Ok(()) => {
                self.surface.show_status(Status::Success(format!(
                    "Converted all workouts to {target}."
                )));
                ActionOutcome::Completed
            }
            Err(e) => self.report(e, "Failed to convert units.", Notice::Alert),
        };
        self.fetch(None).await;
        outcome
    }

    // --- CSV ---

    pub async fn import(&mut self, file: Option<&Path>) -> ActionOutcome {
        if let Some(outcome) = self.guard_controls() {
            return outcome;
        }
        let Some(path) = file else {
            let message = "Choose a CSV file to import.";
            self.surface.alert(message);
            return ActionOutcome::Rejected(message.to_string());
        };
        let contents = match tokio::fs::read(path).await {
            Ok(contents) => contents,
            Err(e) => {
                error!("Failed to read import file {}: {}", path.display(), e);
                let message = format!("Could not read {}: {}", path.display(), e);
                self.surface.alert(&message);
                self.fetch(None).await;
                self.surface.reset_file_input();
                return ActionOutcome::Failed(message);
            }
        };
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| EXPORT_FILE_NAME.to_string());

        if !self.begin(Operation::Import) {
            return ActionOutcome::Busy;
        }
        let result = self.backend.import_csv(&file_name, contents).await;
        self.settle(Operation::Import);

        let outcome = match result {
            Ok(()) => {
                info!("Imported workouts from {}", file_name);
                self.surface.show_status(Status::Success(format!(
                    "Imported workouts from {file_name}."
                )));
                ActionOutcome::Completed
            }
            Err(e) => self.report(e, "Failed to import workouts.", Notice::Alert),
        };
        self.fetch(None).await;
        self.surface.reset_file_input();
        outcome
    }

    pub async fn export(&mut self) -> ActionOutcome {
        if let Some(outcome) = self.guard_controls() {
            return outcome;
        }
        if !self.begin(Operation::Export) {
            return ActionOutcome::Busy;
        }
        let result = self.backend.export_csv().await;
        self.settle(Operation::Export);

        match result {
            Ok(contents) => match self.surface.save_download(EXPORT_FILE_NAME, &contents) {
                Ok(()) => {
                    self.surface.show_status(Status::Success(format!(
                        "Exported workouts to {EXPORT_FILE_NAME}."
                    )));
                    ActionOutcome::Completed
                }
                Err(e) => {
                    error!("Failed to save {}: {}", EXPORT_FILE_NAME, e);
                    let message = format!("Could not save {EXPORT_FILE_NAME}: {e}");
                    self.surface.alert(&message);
                    ActionOutcome::Failed(message)
                }
            },
            Err(e) => self.report(e, "Failed to export workouts.", Notice::Alert),
        }
    }

    // --- Database binding ---

    /// Binds the backend to a database file. Prompts when `path` is `None`;
    /// an empty answer aborts without a request.
    pub async fn connect_database(&mut self, path: Option<String>) -> ActionOutcome {
        let path = path.or_else(|| self.surface.prompt("Path to the workout database file:"));
        let Some(path) = path.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()) else {
            return ActionOutcome::Cancelled;
        };
        if !self.begin(Operation::ConnectDatabase) {
            return ActionOutcome::Busy;
        }
        let result = self.backend.connect_database(&path).await;
        self.settle(Operation::ConnectDatabase);

        match result {
            Ok(()) => {
                let name = Path::new(&path)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.clone());
                info!("Connected to database {}", path);
                self.mark_connected(name);
                self.fetch(None).await
            }
            Err(e) => self.report(e, "Failed to connect to database.", Notice::Alert),
        }
    }

    /// Restores connection state without prompting.
    pub async fn check_connection(&mut self) -> ActionOutcome {
        if !self.begin(Operation::CheckConnection) {
            return ActionOutcome::Busy;
        }
        let result = self.backend.database_name().await;
        self.settle(Operation::CheckConnection);

        match result {
            Ok(Some(name)) => {
                self.mark_connected(name);
                self.fetch(None).await
            }
            Ok(None) => {
                self.mark_disconnected();
                ActionOutcome::Completed
            }
            Err(e) => {
                self.mark_disconnected();
                self.report(e, "Failed to check database connection.", Notice::Alert)
            }
        }
    }

    fn mark_disconnected(&mut self) {
        self.state.database = DatabaseStatus::Disconnected;
        if self.database_binding {
            self.state.controls_enabled = false;
            self.surface.set_controls_enabled(false);
        }
        self.surface.set_database_status("No database connected");
    }

    fn mark_connected(&mut self, name: String) {
        self.surface.set_database_status(&format!("Connected to {name}"));
        self.state.database = DatabaseStatus::Connected { name };
        self.state.controls_enabled = true;
        self.surface.set_controls_enabled(true);
    }

    // --- Helpers ---

    fn render_table(&mut self) {
        let rows = self.state.rows();
        self.surface.render_table(&rows, self.state.selected);
    }

    async fn finish_mutation(&mut self) {
        self.fetch(None).await;
        self.clear_form();
    }

    fn guard_controls(&mut self) -> Option<ActionOutcome> {
        if self.state.controls_enabled {
            return None;
        }
        self.surface.alert(DATABASE_REQUIRED);
        Some(ActionOutcome::Rejected(DATABASE_REQUIRED.to_string()))
    }

    fn begin(&mut self, op: Operation) -> bool {
        if !self.state.begin(op) {
            debug!("{} already in flight, ignoring", op);
            return false;
        }
        self.surface.set_pending(op, true);
        true
    }

    fn settle(&mut self, op: Operation) {
        self.state.settle(op);
        self.surface.set_pending(op, false);
    }

    fn reject(&mut self, e: ValidationError) -> ActionOutcome {
        let message = e.to_string();
        self.surface.show_status(Status::Error(message.clone()));
        ActionOutcome::Rejected(message)
    }

    fn no_selection(&mut self, action: &str) -> ActionOutcome {
        let message = format!("Select a workout to {action}.");
        self.surface.show_status(Status::Info(message.clone()));
        ActionOutcome::Rejected(message)
    }

    /// Server errors carry their own text; anything else gets logged and a generic alert.
    fn report(&mut self, e: ApiError, fallback: &str, notice: Notice) -> ActionOutcome {
        match e {
            ApiError::Server { status, message } => {
                let text = message.unwrap_or_else(|| fallback.to_string());
                warn!("Backend rejected request ({}): {}", status, text);
                match notice {
                    Notice::Inline => self.surface.show_status(Status::Error(text.clone())),
                    Notice::Alert => self.surface.alert(&text),
                }
                ActionOutcome::Failed(text)
            }
            other => {
                error!("{} {}", fallback, other);
                self.surface.alert(GENERIC_FAILURE);
                ActionOutcome::Failed(other.to_string())
            }
        }
    }
}
