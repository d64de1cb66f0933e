// src/model.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{Display, EnumString};

/// Wire format the backend uses for `startDateTime`.
pub const START_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";
/// Canonical display format for start times ("Oct 21, 2025 07:30").
pub const START_TIME_DISPLAY_FORMAT: &str = "%b %d, %Y %H:%M";

/// A single logged workout as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: i64,
    pub name: String,
    #[serde(with = "start_time")]
    pub start_date_time: NaiveDateTime,
    pub duration: i64, // minutes
    pub distance: f64,
    pub unit: UnitType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
}

/// Create body: every workout field except the backend-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkout {
    pub name: String,
    #[serde(with = "start_time")]
    pub start_date_time: NaiveDateTime,
    pub duration: i64,
    pub distance: f64,
    pub unit: UnitType,
    pub notes: String,
}

/// Update body: `{id, ...fields}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutUpdate {
    pub id: i64,
    #[serde(flatten)]
    pub fields: NewWorkout,
}

/// Delete body: `{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutId {
    pub id: i64,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(ascii_case_insensitive)]
pub enum UnitType {
    #[strum(to_string = "KILOMETERS", serialize = "km")]
    Kilometers,
    #[strum(to_string = "MILES", serialize = "mi", serialize = "mile")]
    Miles,
}

impl Default for UnitType {
    fn default() -> Self {
        UnitType::Kilometers
    }
}

impl From<&Workout> for NewWorkout {
    fn from(workout: &Workout) -> Self {
        NewWorkout {
            name: workout.name.clone(),
            start_date_time: workout.start_date_time,
            duration: workout.duration,
            distance: workout.distance,
            unit: workout.unit,
            notes: workout.notes.clone(),
        }
    }
}

/// Parses a start time in the wire format, tolerating seconds or a space separator.
pub fn parse_start_time(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    [START_TIME_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
}

pub fn format_start_time(start: &NaiveDateTime) -> String {
    start.format(START_TIME_DISPLAY_FORMAT).to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

mod start_time {
    use super::{parse_start_time, START_TIME_FORMAT};
    use chrono::NaiveDateTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(START_TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_start_time(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid startDateTime '{raw}'")))
    }
}
