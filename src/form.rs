// src/form.rs
use crate::model::{parse_start_time, NewWorkout, UnitType, Workout, START_TIME_FORMAT};
use strum_macros::{Display, EnumString};
use thiserror::Error;

pub const MAX_NAME_LEN: usize = 50;
pub const MAX_NOTES_LEN: usize = 200;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Workout name cannot be empty.")]
    EmptyName,
    #[error("Workout name cannot be longer than 50 characters.")]
    NameTooLong,
    #[error("Start date/time cannot be empty.")]
    EmptyStartTime,
    #[error("Start date/time must be in 'YYYY-MM-DDTHH:MM' format (e.g. 2025-10-04T14:30), got '{0}'.")]
    InvalidStartTime(String),
    #[error("Duration must be a whole number of minutes, got '{0}'.")]
    DurationNotNumeric(String),
    #[error("Duration must be at least 1 minute.")]
    DurationTooShort,
    #[error("Distance must be a number, got '{0}'.")]
    DistanceNotNumeric(String),
    #[error("Distance must be a non-negative number.")]
    NegativeDistance,
    #[error("Unit must be either KILOMETERS or MILES, got '{0}'.")]
    InvalidUnit(String),
    #[error("Notes cannot exceed 200 characters.")]
    NotesTooLong,
}

/// Editable fields of the workout form, addressed by name from the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FormField {
    Name,
    #[strum(to_string = "start", serialize = "startdatetime")]
    Start,
    Duration,
    Distance,
    Unit,
    Notes,
}

/// Raw form input. Nothing is parsed until `validate` is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutForm {
    pub name: String,
    pub start: String,
    pub duration: String,
    pub distance: String,
    pub unit: String,
    pub notes: String,
}

impl Default for WorkoutForm {
    fn default() -> Self {
        WorkoutForm {
            name: String::new(),
            start: String::new(),
            duration: String::new(),
            distance: String::new(),
            unit: UnitType::default().to_string(),
            notes: String::new(),
        }
    }
}

impl From<&Workout> for WorkoutForm {
    fn from(workout: &Workout) -> Self {
        WorkoutForm {
            name: workout.name.clone(),
            start: workout.start_date_time.format(START_TIME_FORMAT).to_string(),
            duration: workout.duration.to_string(),
            distance: workout.distance.to_string(),
            unit: workout.unit.to_string(),
            notes: workout.notes.clone(),
        }
    }
}

impl WorkoutForm {
    pub fn is_empty(&self) -> bool {
        *self == WorkoutForm::default()
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Start => &self.start,
            FormField::Duration => &self.duration,
            FormField::Distance => &self.distance,
            FormField::Unit => &self.unit,
            FormField::Notes => &self.notes,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Name => self.name = value,
            FormField::Start => self.start = value,
            FormField::Duration => self.duration = value,
            FormField::Distance => self.distance = value,
            FormField::Unit => self.unit = value,
            FormField::Notes => self.notes = value,
        }
    }

    /// Checks every field in display order and builds the request body.
    /// The first failing rule wins.
    pub fn validate(&self) -> Result<NewWorkout, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(ValidationError::NameTooLong);
        }

        let start = self.start.trim();
        if start.is_empty() {
            return Err(ValidationError::EmptyStartTime);
        }
        let start_date_time = parse_start_time(start)
            .ok_or_else(|| ValidationError::InvalidStartTime(start.to_string()))?;

        let duration_raw = self.duration.trim();
        let duration: i64 = duration_raw
            .parse()
            .map_err(|_| ValidationError::DurationNotNumeric(duration_raw.to_string()))?;
        if duration < 1 {
            return Err(ValidationError::DurationTooShort);
        }

        let distance_raw = self.distance.trim();
        let distance: f64 = distance_raw
            .parse()
            .ok()
            .filter(|d: &f64| d.is_finite())
            .ok_or_else(|| ValidationError::DistanceNotNumeric(distance_raw.to_string()))?;
        if distance < 0.0 {
            return Err(ValidationError::NegativeDistance);
        }

        let unit_raw = self.unit.trim();
        let unit: UnitType = unit_raw
            .parse()
            .map_err(|_| ValidationError::InvalidUnit(unit_raw.to_string()))?;

        if self.notes.chars().count() > MAX_NOTES_LEN {
            return Err(ValidationError::NotesTooLong);
        }

        Ok(NewWorkout {
            name: name.to_string(),
            start_date_time,
            duration,
            distance,
            unit,
            notes: self.notes.clone(),
        })
    }
}
