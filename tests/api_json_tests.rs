use chrono::{Duration, NaiveTime};
use timetable_wizard::api_json::*;
use timetable_wizard::GeneratorError;

#[test]
fn test_parse_json_with_all_options() {
    let json_data = r#"
    {
        "groups": [[3101, 3102, 3103], [4201], []],
        "options": {
            "minimum_start_time": "09:30",
            "minimum_interval": "00:10",
            "maximum_interval": "02:30",
            "allow_consec": "3",
            "allow_one_class_a_day": false,
            "allow_only_open_section": true,
            "allow_run": false
        }
    }
    "#;

    let req = parse_json_input(json_data).expect("Debe parsear la petición completa");
    assert_eq!(req.groups, vec![vec![3101, 3102, 3103], vec![4201], vec![]]);

    let o = &req.options;
    assert_eq!(o.minimum_start_time, NaiveTime::from_hms_opt(9, 30, 0));
    assert_eq!(o.minimum_interval, Some(Duration::minutes(10)));
    assert_eq!(o.maximum_interval, Some(Duration::minutes(150)));
    assert_eq!(o.allow_consec, Some(3));
    assert!(!o.allow_one_class_a_day);
    assert!(o.allow_only_open_section);
    assert!(o.walking_rule_active());
}

#[test]
fn test_parse_json_minimal_options() {
    let json_data = r#"
    {
        "groups": [[1]],
        "options": {
            "minimum_start_time": null,
            "minimum_interval": null,
            "maximum_interval": null,
            "allow_consec": 0,
            "allow_one_class_a_day": true,
            "allow_only_open_section": false
        }
    }
    "#;

    let req = parse_json_input(json_data).expect("Debe parsear opciones mínimas");
    assert_eq!(req.options, Options::default());
}

#[test]
fn test_bool_options_are_strict() {
    let json_data = r#"
    {
        "groups": [[1]],
        "options": {
            "minimum_start_time": null,
            "minimum_interval": null,
            "maximum_interval": null,
            "allow_consec": null,
            "allow_one_class_a_day": "yes",
            "allow_only_open_section": false
        }
    }
    "#;

    match parse_json_input(json_data) {
        Err(GeneratorError::InvalidOption { key, .. }) => assert_eq!(key, "allow_one_class_a_day"),
        other => panic!("se esperaba InvalidOption, se obtuvo {:?}", other),
    }
}
