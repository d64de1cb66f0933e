use anyhow::Result;
use chrono::NaiveDate;
use serde_json::json;
use workout_logger_lib::{
    FormField, UnitType, ValidationError, Workout, WorkoutForm, WorkoutRow, WorkoutUpdate,
};

fn morning_run_form() -> WorkoutForm {
    WorkoutForm {
        name: "Morning Run".to_string(),
        start: "2025-10-21T07:30".to_string(),
        duration: "45".to_string(),
        distance: "5.0".to_string(),
        unit: "KILOMETERS".to_string(),
        notes: "Felt good".to_string(),
    }
}

#[test]
fn test_create_body_matches_form_exactly() -> Result<()> {
    let body = serde_json::to_value(morning_run_form().validate()?)?;
    assert_eq!(
        body,
        json!({
            "name": "Morning Run",
            "startDateTime": "2025-10-21T07:30",
            "duration": 45,
            "distance": 5.0,
            "unit": "KILOMETERS",
            "notes": "Felt good"
        })
    );
    Ok(())
}

#[test]
fn test_update_body_flattens_fields_next_to_id() -> Result<()> {
    let update = WorkoutUpdate {
        id: 7,
        fields: morning_run_form().validate()?,
    };
    let body = serde_json::to_value(&update)?;
    assert_eq!(body["id"], json!(7));
    assert_eq!(body["startDateTime"], json!("2025-10-21T07:30"));
    assert_eq!(body.as_object().map(|o| o.len()), Some(7));
    Ok(())
}

#[test]
fn test_validation_rules_in_order() {
    let long_name = "x".repeat(51);
    let long_notes = "n".repeat(201);
    let cases: Vec<(FormField, &str, ValidationError)> = vec![
        (FormField::Name, "", ValidationError::EmptyName),
        (FormField::Name, &long_name, ValidationError::NameTooLong),
        (FormField::Start, "  ", ValidationError::EmptyStartTime),
        (
            FormField::Start,
            "21/10/2025",
            ValidationError::InvalidStartTime("21/10/2025".to_string()),
        ),
        (
            FormField::Duration,
            "",
            ValidationError::DurationNotNumeric(String::new()),
        ),
        (
            FormField::Duration,
            "4.5",
            ValidationError::DurationNotNumeric("4.5".to_string()),
        ),
        (FormField::Duration, "0", ValidationError::DurationTooShort),
        (
            FormField::Distance,
            "five",
            ValidationError::DistanceNotNumeric("five".to_string()),
        ),
        (
            FormField::Distance,
            "NaN",
            ValidationError::DistanceNotNumeric("NaN".to_string()),
        ),
        (FormField::Distance, "-1", ValidationError::NegativeDistance),
        (
            FormField::Unit,
            "furlongs",
            ValidationError::InvalidUnit("furlongs".to_string()),
        ),
        (FormField::Notes, &long_notes, ValidationError::NotesTooLong),
    ];

    for (field, value, expected) in cases {
        let mut form = morning_run_form();
        form.set(field, value);
        assert_eq!(form.validate(), Err(expected), "{field} = {value:?}");
    }
}

#[test]
fn test_validation_accepts_lenient_input() -> Result<()> {
    let mut form = morning_run_form();
    form.set(FormField::Start, "2025-10-21 07:30");
    form.set(FormField::Unit, "mi");
    form.set(FormField::Distance, " 0 ");
    form.set(FormField::Notes, "");
    let workout = form.validate()?;
    assert_eq!(workout.unit, UnitType::Miles);
    assert_eq!(workout.distance, 0.0);
    assert_eq!(
        workout.start_date_time,
        NaiveDate::from_ymd_opt(2025, 10, 21).unwrap().and_hms_opt(7, 30, 0).unwrap()
    );
    Ok(())
}

#[test]
fn test_form_field_names_parse() {
    assert_eq!("name".parse::<FormField>(), Ok(FormField::Name));
    assert_eq!("Start".parse::<FormField>(), Ok(FormField::Start));
    assert_eq!("startDateTime".parse::<FormField>(), Ok(FormField::Start));
    assert_eq!(FormField::Distance.to_string(), "distance");
    assert!("weight".parse::<FormField>().is_err());
}

#[test]
fn test_unit_parsing_and_wire_format() -> Result<()> {
    assert_eq!("kilometers".parse::<UnitType>(), Ok(UnitType::Kilometers));
    assert_eq!("KM".parse::<UnitType>(), Ok(UnitType::Kilometers));
    assert_eq!("Miles".parse::<UnitType>(), Ok(UnitType::Miles));
    assert_eq!(UnitType::Miles.to_string(), "MILES");
    assert_eq!(serde_json::to_string(&UnitType::Miles)?, "\"MILES\"");
    assert_eq!(serde_json::from_str::<UnitType>("\"KILOMETERS\"")?, UnitType::Kilometers);
    Ok(())
}

#[test]
fn test_server_record_decodes_and_maps_to_row() -> Result<()> {
    let workouts: Vec<Workout> = serde_json::from_value(json!([
        {
            "id": 3,
            "name": "Hill Repeats",
            "startDateTime": "2025-03-09T18:05",
            "duration": 62,
            "distance": 10.0,
            "unit": "MILES",
            "notes": null
        },
        {
            "id": 4,
            "name": "Tempo",
            "startDateTime": "2025-12-01T06:00:00",
            "duration": 30,
            "distance": 6.786,
            "unit": "KILOMETERS",
            "notes": "windy"
        }
    ]))?;

    assert_eq!(workouts[0].notes, "");
    let row = WorkoutRow::from(&workouts[0]);
    assert_eq!(
        row,
        WorkoutRow {
            id: 3,
            name: "Hill Repeats".to_string(),
            start: "Mar 09, 2025 18:05".to_string(),
            duration: "62".to_string(),
            distance: "10.00".to_string(),
            unit: "MILES".to_string(),
            notes: String::new(),
        }
    );

    let row = WorkoutRow::from(&workouts[1]);
    assert_eq!(row.start, "Dec 01, 2025 06:00");
    assert_eq!(row.distance, "6.79");
    assert_eq!(row.cells()[0], "4");
    Ok(())
}

#[test]
fn test_form_round_trips_selected_workout() -> Result<()> {
    let workout = Workout {
        id: 11,
        name: "Long Ride".to_string(),
        start_date_time: NaiveDate::from_ymd_opt(2025, 5, 4).unwrap().and_hms_opt(9, 15, 0).unwrap(),
        duration: 180,
        distance: 80.5,
        unit: UnitType::Kilometers,
        notes: "Headwind".to_string(),
    };
    let form = WorkoutForm::from(&workout);
    assert_eq!(form.start, "2025-05-04T09:15");
    assert_eq!(form.get(FormField::Distance), "80.5");

    let fields = form.validate()?;
    assert_eq!(fields.duration, 180);
    assert_eq!(fields.notes, "Headwind");
    Ok(())
}
