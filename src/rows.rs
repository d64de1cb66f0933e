// src/rows.rs
// Pure record -> display mapping. Rendering lives on the surface.
use crate::model::{format_start_time, Workout};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutRow {
    pub id: i64,
    pub name: String,
    pub start: String,
    pub duration: String,
    pub distance: String, // always two decimals
    pub unit: String,
    pub notes: String,
}

impl WorkoutRow {
    pub const HEADERS: [&'static str; 7] = [
        "ID",
        "Name",
        "Start",
        "Duration (min)",
        "Distance",
        "Unit",
        "Notes",
    ];

    /// Cells in header order.
    pub fn cells(&self) -> [String; 7] {
        [
            self.id.to_string(),
            self.name.clone(),
            self.start.clone(),
            self.duration.clone(),
            self.distance.clone(),
            self.unit.clone(),
            self.notes.clone(),
        ]
    }
}

impl From<&Workout> for WorkoutRow {
    fn from(workout: &Workout) -> Self {
        WorkoutRow {
            id: workout.id,
            name: workout.name.clone(),
            start: format_start_time(&workout.start_date_time),
            duration: workout.duration.to_string(),
            distance: format!("{:.2}", workout.distance),
            unit: workout.unit.to_string(),
            notes: workout.notes.clone(),
        }
    }
}

pub fn build_rows(workouts: &[Workout]) -> Vec<WorkoutRow> {
    workouts.iter().map(WorkoutRow::from).collect()
}
