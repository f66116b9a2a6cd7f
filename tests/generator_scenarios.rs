use chrono::NaiveTime;
use serde_json::{json, Value};
use timetable_wizard::algorithm::filters::has_day_with_multiple_classes;
use timetable_wizard::models::{Coordinates, Location};
use timetable_wizard::{
    count_timetables, generate_timetables, CancelToken, CandidateSection, Day, GenerateRequest, GeneratorConfig,
    GeneratorError, InMemoryCatalog, Options, Timeslot, TimetableGenerator,
};

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn section(id: i64, slots: &[(Day, (u32, u32), (u32, u32))], open: i32) -> CandidateSection {
    let ts = slots
        .iter()
        .map(|&(d, (h1, m1), (h2, m2))| Timeslot::new(d, t(h1, m1), t(h2, m2), None).unwrap())
        .collect();
    CandidateSection::new(id, ts, open)
}

fn run(groups: Vec<Vec<CandidateSection>>, options: &Options) -> (Vec<Vec<i64>>, u64) {
    let cfg = GeneratorConfig::sequential();
    let tables = generate_timetables(groups.clone(), options, &cfg).unwrap();
    let count = count_timetables(groups, options, &cfg).unwrap();
    (tables.iter().map(|t| t.section_ids()).collect(), count)
}

#[test]
fn test_touching_boundary_is_not_overlap() {
    // 9:00-9:50 y 9:50-10:40 el mismo lunes: se tocan pero no chocan
    let a = section(1, &[(Day::Mon, (9, 0), (9, 50))], 5);
    let b = section(2, &[(Day::Mon, (9, 50), (10, 40))], 5);
    let (ids, count) = run(vec![vec![a], vec![b]], &Options::default());
    assert_eq!(ids, vec![vec![1, 2]]);
    assert_eq!(count, 1);
}

#[test]
fn test_overlap_gives_nothing() {
    let a = section(1, &[(Day::Mon, (9, 0), (9, 50))], 5);
    let b = section(2, &[(Day::Mon, (9, 30), (10, 20))], 5);
    let (ids, count) = run(vec![vec![a], vec![b]], &Options::default());
    assert!(ids.is_empty());
    assert_eq!(count, 0);
}

#[test]
fn test_minimum_interval_rejects_short_gap() {
    let a = section(1, &[(Day::Mon, (9, 0), (9, 50))], 5);
    let b = section(2, &[(Day::Mon, (10, 0), (10, 50))], 5);
    let opts = Options { minimum_interval: Some(chrono::Duration::minutes(15)), ..Options::default() };
    let (ids, count) = run(vec![vec![a.clone()], vec![b.clone()]], &opts);
    assert!(ids.is_empty());
    assert_eq!(count, 0);

    // con 10 minutos de mínimo la brecha alcanza
    let opts = Options { minimum_interval: Some(chrono::Duration::minutes(10)), ..Options::default() };
    assert_eq!(run(vec![vec![a], vec![b]], &opts).1, 1);
}

#[test]
fn test_shared_signature_expands_to_every_section() {
    let g0: Vec<CandidateSection> = (1..=3).map(|id| section(id, &[(Day::Tue, (10, 0), (11, 15))], 5)).collect();
    let g1 = vec![section(9, &[(Day::Wed, (8, 0), (9, 0))], 5)];
    let (ids, count) = run(vec![g0, g1], &Options::default());
    assert_eq!(ids, vec![vec![1, 9], vec![2, 9], vec![3, 9]]);
    assert_eq!(count, 3);
}

#[test]
fn test_maximum_interval_and_consecutive_limits() {
    let a = section(1, &[(Day::Mon, (8, 0), (9, 0))], 5);
    let b = section(2, &[(Day::Mon, (9, 10), (10, 0))], 5);
    let c = section(3, &[(Day::Mon, (10, 10), (11, 0))], 5);
    let far = section(4, &[(Day::Mon, (16, 0), (17, 0))], 5);
    let groups = vec![vec![a], vec![b], vec![c, far]];

    // tres seguidas con brechas de 10 minutos: con máximo 2 sólo sirve la de la tarde
    let opts = Options { allow_consec: Some(2), ..Options::default() };
    assert_eq!(run(groups.clone(), &opts).0, vec![vec![1, 2, 4]]);

    // la de la tarde deja 6 horas de hueco
    let opts = Options { maximum_interval: Some(chrono::Duration::hours(2)), ..Options::default() };
    assert_eq!(run(groups, &opts).0, vec![vec![1, 2, 3]]);
}

#[test]
fn test_seat_filter_never_returns_full_sections() {
    let g0 = vec![section(1, &[(Day::Mon, (8, 0), (9, 0))], 0), section(2, &[(Day::Mon, (8, 0), (9, 0))], 3)];
    let g1 = vec![section(3, &[(Day::Tue, (8, 0), (9, 0))], -1), section(4, &[(Day::Thu, (8, 0), (9, 0))], 1)];
    let opts = Options { allow_only_open_section: true, ..Options::default() };
    let tables = generate_timetables(vec![g0, g1], &opts, &GeneratorConfig::sequential()).unwrap();
    assert_eq!(tables.len(), 1);
    assert!(tables.iter().all(|t| t.sections.iter().all(|s| s.open_seats > 0)));
}

#[test]
fn test_early_start_filter() {
    let g0 = vec![section(1, &[(Day::Mon, (8, 0), (9, 0))], 5), section(2, &[(Day::Mon, (10, 0), (11, 0))], 5)];
    let opts = Options { minimum_start_time: Some(t(9, 0)), ..Options::default() };
    assert_eq!(run(vec![g0], &opts).0, vec![vec![2]]);
}

#[test]
fn test_one_class_a_day_filter() {
    let g0 = vec![section(1, &[(Day::Mon, (8, 0), (9, 0))], 5), section(2, &[(Day::Tue, (8, 0), (9, 0))], 5)];
    let g1 = vec![section(3, &[(Day::Mon, (10, 0), (11, 0))], 5), section(4, &[(Day::Wed, (10, 0), (11, 0))], 5)];
    let opts = Options { allow_one_class_a_day: false, ..Options::default() };
    let tables = generate_timetables(vec![g0.clone(), g1.clone()], &opts, &GeneratorConfig::sequential()).unwrap();
    assert_eq!(tables.iter().map(|t| t.section_ids()).collect::<Vec<_>>(), vec![vec![1, 3]]);
    for table in &tables {
        let keys: Vec<_> = table.timeslots().map(|s| s.key()).collect();
        assert!(has_day_with_multiple_classes(&keys));
    }
    assert_eq!(count_timetables(vec![g0, g1], &opts, &GeneratorConfig::sequential()).unwrap(), 1);
}

#[test]
fn test_zero_choice_group_gives_no_timetables() {
    let g0 = vec![section(1, &[(Day::Mon, (8, 0), (9, 0))], 5)];
    let g1 = vec![section(2, &[(Day::Tue, (8, 0), (9, 0))], 0)];
    let opts = Options { allow_only_open_section: true, ..Options::default() };
    assert_eq!(run(vec![g0, g1], &opts), (vec![], 0));
}

#[test]
fn test_walking_rule_only_when_allow_run_is_false() {
    let loc = |lat: f64| Location {
        building: "B".into(),
        room: "101".into(),
        coordinates: Some(Coordinates { latitude: lat, longitude: -70.6 }),
    };
    let a = CandidateSection::new(1, vec![Timeslot::new(Day::Fri, t(9, 0), t(9, 50), Some(loc(-33.40))).unwrap()], 5);
    // ~5.5 km en 10 minutos
    let b = CandidateSection::new(2, vec![Timeslot::new(Day::Fri, t(10, 0), t(10, 50), Some(loc(-33.45))).unwrap()], 5);
    let groups = vec![vec![a], vec![b]];

    assert_eq!(run(groups.clone(), &Options::default()).1, 1);
    let opts = Options { allow_run: false, ..Options::default() };
    assert_eq!(run(groups, &opts), (vec![], 0));
}

#[test]
fn test_placeholder_coordinates_count_as_unknown() {
    let loc = |c: Coordinates| Location { building: "B".into(), room: "1".into(), coordinates: Some(c) };
    let a = CandidateSection::new(1, vec![Timeslot::new(Day::Fri, t(9, 0), t(9, 50), Some(loc(Coordinates::PLACEHOLDER))).unwrap()], 5);
    let far = Coordinates { latitude: 10.0, longitude: 10.0 };
    let b = CandidateSection::new(2, vec![Timeslot::new(Day::Fri, t(10, 0), t(10, 50), Some(loc(far))).unwrap()], 5);
    let opts = Options { allow_run: false, ..Options::default() };
    assert_eq!(run(vec![vec![a], vec![b]], &opts).1, 1);
}

#[test]
fn test_parallel_output_matches_sequential() {
    let mk = |base: i64, day: Day| -> Vec<CandidateSection> {
        (0..4).map(|i| section(base + i, &[(day, (8 + i as u32, 0), (9 + i as u32, 0))], 5)).collect()
    };
    let groups = vec![mk(10, Day::Mon), mk(20, Day::Mon), mk(30, Day::Tue), mk(40, Day::Mon)];
    let seq = generate_timetables(groups.clone(), &Options::default(), &GeneratorConfig::sequential()).unwrap();
    let cfg = GeneratorConfig { threads: 4, ..GeneratorConfig::sequential() };
    let par = generate_timetables(groups, &Options::default(), &cfg).unwrap();
    assert!(!seq.is_empty());
    assert_eq!(seq, par);
}

#[test]
fn test_unscheduled_sections_policy() {
    let g0 = vec![CandidateSection::new(1, vec![], 5), section(2, &[(Day::Mon, (8, 0), (9, 0))], 5)];
    let cfg = GeneratorConfig::sequential();
    assert_eq!(count_timetables(vec![g0.clone()], &Options::default(), &cfg).unwrap(), 1);

    let cfg = GeneratorConfig { include_unscheduled_sections: true, ..cfg };
    assert_eq!(count_timetables(vec![g0], &Options::default(), &cfg).unwrap(), 2);
}

fn catalog_json() -> Value {
    json!([
        { "id": 101, "open_seats": 4, "name": "Cálculo I", "section_code": "101",
          "timeslots": [{ "day": "M", "start": "08:30", "end": "09:50" }, { "day": "W", "start": "08:30", "end": "09:50" }] },
        { "id": 102, "open_seats": 0,
          "timeslots": [{ "day": "Tu", "start": "08:30", "end": "09:50" }] },
        { "id": 201, "open_seats": 10,
          "timeslots": [{ "day": "M", "start": "10:00", "end": "11:20" }] }
    ])
}

#[test]
fn test_json_request_through_catalog() {
    let catalog = InMemoryCatalog::from_json_value(catalog_json()).unwrap();
    let generator = TimetableGenerator::new(catalog, GeneratorConfig::sequential());
    let body = json!({
        "groups": [[101, 102], [201]],
        "options": {
            "minimum_start_time": "08:00",
            "minimum_interval": null,
            "maximum_interval": null,
            "allow_consec": null,
            "allow_one_class_a_day": true,
            "allow_only_open_section": true,
            "ignored_key": 1
        }
    });
    let tables = generator.generate_json(&body).unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].section_ids(), vec![101, 201]);
    assert_eq!(tables[0].sections[0].meta.name, "Cálculo I");
    assert_eq!(generator.count_json(&body).unwrap(), 1);

    let out = serde_json::to_value(&tables[0]).unwrap();
    assert_eq!(out["sections"][0]["timeslots"][0]["start"], "08:30");
}

#[test]
fn test_missing_section_and_bad_options() {
    let catalog = InMemoryCatalog::from_json_value(catalog_json()).unwrap();
    let generator = TimetableGenerator::new(catalog, GeneratorConfig::sequential());

    let err = generator
        .generate(&GenerateRequest::new(vec![vec![101], vec![999]], Options::default()))
        .unwrap_err();
    assert!(matches!(err, GeneratorError::InvalidInput(_)));

    let err = generator
        .generate_json(&json!({ "groups": [[101]], "options": { "minimum_start_time": "8am" } }))
        .unwrap_err();
    assert!(matches!(err, GeneratorError::InvalidOption { ref key, .. } if key == "minimum_start_time"));
}

#[test]
fn test_cancelled_generation_is_an_error_not_empty() {
    let catalog = InMemoryCatalog::from_json_value(catalog_json()).unwrap();
    let token = CancelToken::new();
    let generator = TimetableGenerator::new(catalog, GeneratorConfig::sequential()).with_cancel_token(token.clone());
    token.cancel();
    let err = generator.count(&GenerateRequest::new(vec![vec![101], vec![201]], Options::default())).unwrap_err();
    assert!(matches!(err, GeneratorError::SearchAborted { .. }));
}

#[test]
fn test_expired_deadline_aborts_generation() {
    let groups = vec![
        vec![section(1, &[(Day::Mon, (9, 0), (10, 0))], 5)],
        vec![section(2, &[(Day::Tue, (9, 0), (10, 0))], 5)],
    ];
    let cfg = GeneratorConfig { deadline: Some(std::time::Duration::ZERO), ..GeneratorConfig::sequential() };
    let err = generate_timetables(groups.clone(), &Options::default(), &cfg).unwrap_err();
    assert!(matches!(err, GeneratorError::SearchAborted { .. }));
    let err = count_timetables(groups, &Options::default(), &cfg).unwrap_err();
    assert!(matches!(err, GeneratorError::SearchAborted { .. }));

    // TIMETABLE_DEADLINE_MS=0 llega al mismo resultado
    let cfg = GeneratorConfig::from_lookup(|k| (k == "TIMETABLE_DEADLINE_MS").then(|| "0".to_string())).unwrap();
    let catalog = InMemoryCatalog::from_json_value(catalog_json()).unwrap();
    let generator = TimetableGenerator::new(catalog, cfg);
    let err = generator.count(&GenerateRequest::new(vec![vec![101]], Options::default())).unwrap_err();
    assert!(matches!(err, GeneratorError::SearchAborted { .. }));
}

#[test]
fn test_generous_deadline_returns_normal_results() {
    let g0: Vec<CandidateSection> = (1..=3).map(|id| section(id, &[(Day::Tue, (10, 0), (11, 15))], 5)).collect();
    let g1 = vec![section(9, &[(Day::Wed, (8, 0), (9, 0))], 5)];
    let cfg = GeneratorConfig { deadline: Some(std::time::Duration::from_secs(60)), ..GeneratorConfig::sequential() };
    let tables = generate_timetables(vec![g0.clone(), g1.clone()], &Options::default(), &cfg).unwrap();
    assert_eq!(tables.iter().map(|t| t.section_ids()).collect::<Vec<_>>(), vec![vec![1, 9], vec![2, 9], vec![3, 9]]);
    assert_eq!(count_timetables(vec![g0, g1], &Options::default(), &cfg).unwrap(), 3);
}

#[test]
fn test_minimum_interval_above_maximum_is_accepted() {
    // cada regla sólo mira pares del mismo día: lunes y martes no se afectan
    let catalog: InMemoryCatalog =
        vec![section(1, &[(Day::Mon, (9, 0), (10, 0))], 5), section(2, &[(Day::Tue, (9, 0), (10, 0))], 5)]
            .into_iter()
            .collect();
    let generator = TimetableGenerator::new(catalog, GeneratorConfig::sequential());
    let body = json!({
        "groups": [[1], [2]],
        "options": {
            "minimum_start_time": null,
            "minimum_interval": "01:00",
            "maximum_interval": "00:30",
            "allow_consec": null,
            "allow_one_class_a_day": true,
            "allow_only_open_section": false
        }
    });
    assert_eq!(generator.count_json(&body).unwrap(), 1);

    let typed = Options {
        minimum_interval: Some(chrono::Duration::hours(1)),
        maximum_interval: Some(chrono::Duration::minutes(30)),
        ..Options::default()
    };
    let groups = vec![
        vec![section(1, &[(Day::Mon, (9, 0), (10, 0))], 5)],
        vec![section(2, &[(Day::Tue, (9, 0), (10, 0))], 5)],
    ];
    assert_eq!(count_timetables(groups, &typed, &GeneratorConfig::sequential()).unwrap(), 1);
}
