use serde_json::{json, Value};
use timetable_engine_wasm::{
    check_move_json, expand_sections_json, facet_values_json, filter_occurrences_json,
};

fn rows() -> String {
    json!([
        {"section_id": "A", "pattern_slot_id": "P1", "time_slot_id": 101, "day_pattern": "MW",
         "start_time": "09:00:00", "end_time": "10:00:00", "course": "MATH 101",
         "instructor": "Lee", "room": "Room 101", "grade_level": 9},
        {"section_id": "B", "pattern_slot_id": "P2", "time_slot_id": 102, "day_pattern": "M",
         "start_time": "09:30", "end_time": "10:30", "course": "HIST 110",
         "instructor": "Kim", "room": "Room 101", "grade_level": "11"}
    ])
    .to_string()
}

fn occurrences() -> String {
    expand_sections_json(&rows(), "2026-03-18").unwrap()
}

fn parse(s: &str) -> Value {
    serde_json::from_str(s).unwrap()
}

#[test]
fn expansion_anchors_to_monday() {
    let parsed = parse(&occurrences());
    let items = parsed.as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["id"], "A-M");
    assert_eq!(items[0]["start"], "2026-03-16T09:00:00");
    assert_eq!(items[1]["id"], "A-W");
    assert_eq!(items[1]["start"], "2026-03-18T09:00:00");
    assert_eq!(items[2]["grade_level"], "11");
}

#[test]
fn expansion_accepts_rfc3339_reference() {
    let out = expand_sections_json(&rows(), "2026-03-22T23:00:00-04:00").unwrap();
    assert_eq!(parse(&out)[0]["start"], "2026-03-16T09:00:00");
}

#[test]
fn expansion_reports_bad_input() {
    let err = expand_sections_json("not json", "2026-03-16").unwrap_err();
    assert!(err.contains("Invalid sections JSON"));

    let err = expand_sections_json(&rows(), "next tuesday").unwrap_err();
    assert!(err.contains("Invalid datetime"));
}

#[test]
fn clean_move_is_clear() {
    let out = check_move_json(
        &occurrences(),
        "A-W",
        "2026-03-18T11:00:00",
        "2026-03-18T12:00:00",
    )
    .unwrap();
    let parsed = parse(&out);
    assert_eq!(parsed["status"], "clear");
    assert_eq!(parsed["time_slot_id"], "101");
    assert!(parsed["conflicts"].as_array().unwrap().is_empty());
}

#[test]
fn overlapping_room_is_reported() {
    let out = check_move_json(
        &occurrences(),
        "A-M",
        "2026-03-16T09:30:00",
        "2026-03-16T10:30:00",
    )
    .unwrap();
    let parsed = parse(&out);
    assert_eq!(parsed["status"], "conflicts");

    let conflicts = parsed["conflicts"].as_array().unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0]["occurrence_id"], "B-M");
    assert_eq!(conflicts[0]["kind"], "Room");
    assert!(conflicts[0]["message"]
        .as_str()
        .unwrap()
        .starts_with("Room conflict: Room 101"));
}

#[test]
fn cross_day_move_is_rejected() {
    let out = check_move_json(
        &occurrences(),
        "A-M",
        "2026-03-17T14:00:00",
        "2026-03-17T15:00:00",
    )
    .unwrap();
    let parsed = parse(&out);
    assert_eq!(parsed["status"], "rejected");
    assert!(parsed.get("time_slot_id").is_none());
    assert!(parsed["messages"][0]
        .as_str()
        .unwrap()
        .contains("different day"));
}

#[test]
fn drag_into_another_week_is_rejected() {
    // Next Monday at B's time would find nothing to collide with.
    let out = check_move_json(
        &occurrences(),
        "A-M",
        "2026-03-23T09:30:00",
        "2026-03-23T10:30:00",
    )
    .unwrap();
    let parsed = parse(&out);
    assert_eq!(parsed["status"], "rejected");
    assert!(parsed["conflicts"].as_array().unwrap().is_empty());
    assert!(parsed["messages"][0]
        .as_str()
        .unwrap()
        .contains("displayed week"));
}

#[test]
fn unknown_occurrence_is_rejected() {
    let out = check_move_json(
        &occurrences(),
        "Z-M",
        "2026-03-16T09:00:00",
        "2026-03-16T10:00:00",
    )
    .unwrap();
    let parsed = parse(&out);
    assert_eq!(parsed["status"], "rejected");
    assert_eq!(parsed["messages"][0], "Unknown occurrence: Z-M");
}

#[test]
fn facet_values_are_sorted() {
    let parsed = parse(&facet_values_json(&occurrences()).unwrap());
    assert_eq!(parsed["professors"], json!(["Kim", "Lee"]));
    assert_eq!(parsed["rooms"], json!(["Room 101"]));
    assert_eq!(parsed["grade_levels"], json!(["11", "9"]));
}

#[test]
fn filter_combines_facets() {
    let all = occurrences();

    let by_prof = parse(&filter_occurrences_json(&all, r#"{"professors":["Lee"]}"#).unwrap());
    assert_eq!(by_prof.as_array().unwrap().len(), 2);

    let none = parse(
        &filter_occurrences_json(&all, r#"{"professors":["Lee"],"grade_levels":["11"]}"#).unwrap(),
    );
    assert!(none.as_array().unwrap().is_empty());

    let everything = parse(&filter_occurrences_json(&all, "").unwrap());
    assert_eq!(everything.as_array().unwrap().len(), 3);
}

#[test]
fn filter_rejects_bad_selection() {
    let err = filter_occurrences_json(&occurrences(), "[1, 2]").unwrap_err();
    assert!(err.contains("Invalid selection JSON"));
}
