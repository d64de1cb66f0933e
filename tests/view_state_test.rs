use chrono::NaiveDate;
use workout_logger_lib::{Operation, UnitType, ViewState, Workout, WorkoutForm};

fn workout(id: i64, name: &str) -> Workout {
    Workout {
        id,
        name: name.to_string(),
        start_date_time: NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap(),
        duration: 20,
        distance: 3.0,
        unit: UnitType::Kilometers,
        notes: String::new(),
    }
}

#[test]
fn test_stale_refresh_is_dropped() {
    let mut state = ViewState::new(true);
    let first = state.next_token();
    let second = state.next_token();

    // The newer response lands first; the older one must not overwrite it
    assert!(state.apply_workouts(second, vec![workout(2, "Newer")]));
    assert!(!state.apply_workouts(first, vec![workout(1, "Older")]));
    assert_eq!(state.workouts.len(), 1);
    assert_eq!(state.workouts[0].name, "Newer");
    assert!(!state.is_current(first));
}

#[test]
fn test_refresh_clears_selection() {
    let mut state = ViewState::new(true);
    let token = state.next_token();
    state.apply_workouts(token, vec![workout(1, "A"), workout(2, "B")]);
    state.toggle_selection(1);
    assert_eq!(state.selected_workout().map(|w| w.id), Some(2));

    let token = state.next_token();
    state.apply_workouts(token, vec![workout(1, "A")]);
    assert_eq!(state.selected, None);
}

#[test]
fn test_busy_flag_refuses_reentry() {
    let mut state = ViewState::new(true);
    assert!(state.begin(Operation::Delete));
    assert!(!state.begin(Operation::Delete));
    assert!(state.begin(Operation::Refresh)); // other operations are independent
    state.settle(Operation::Delete);
    assert!(!state.is_pending(Operation::Delete));
    assert!(state.is_pending(Operation::Refresh));
    assert!(state.begin(Operation::Delete));
}

#[test]
fn test_toggle_selection() {
    let mut state = ViewState::new(true);
    let token = state.next_token();
    state.apply_workouts(token, vec![workout(5, "Row")]);

    assert_eq!(state.toggle_selection(0), Some(0));
    assert_eq!(state.form.name, "Row");
    assert_eq!(state.toggle_selection(0), None);
    assert_eq!(state.form, WorkoutForm::default());

    // Out of range leaves things as they were
    assert_eq!(state.toggle_selection(3), None);
    assert_eq!(state.index_of(5), Some(0));
    assert_eq!(state.index_of(6), None);
}
