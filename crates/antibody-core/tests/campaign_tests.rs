use antibody_core::campaign::{generate, generate_json, CampaignError};
use antibody_core::limits::{EngineLimits, LimitViolation};
use antibody_explore::immune::driver::{SearchError, SearchPhase};
use antibody_explore::space::candidate::is_near_duplicate;
use antibody_ir::parse::parse_request;

const CANONICAL: &str = r#"{
    "parameters": [
        { "values": ["a1", "a2", "a3"] },
        { "values": ["b1", "b2", "b3"] },
        { "values": ["c1", "c2", "c3"] },
        { "values": ["d1", "d2", "d3"] }
    ],
    "search": { "strength": 2, "population_size": 20, "max_iterations": 75, "seed": 42 }
}"#;

#[test]
fn test_generate_canonical_request() {
    let report = generate_json(CANONICAL, &EngineLimits::default()).unwrap();
    assert_eq!(report.phase, SearchPhase::Converged);
    assert_eq!(report.total, 54);
    assert_eq!(report.covered, 54);
    assert_eq!(report.audited_covered, 54);
    assert!(report.suite.len() <= 30, "suite of {}", report.suite.len());
    assert!(report.suite.iter().all(|case| case.len() == 4));

    let text = report.to_string();
    assert!(text.contains("Coverage Achieved: 54/54 (100.00%)"));
    assert!(text.contains("Test Case 1: ["));
}

#[test]
fn test_analytics_follow_the_run() {
    let report = generate_json(CANONICAL, &EngineLimits::default()).unwrap();
    let analytics = &report.analytics;
    assert_eq!(analytics.coverage_curve.len(), report.iterations);
    assert_eq!(analytics.phase, SearchPhase::Converged);
    assert!((analytics.final_coverage() - 1.0).abs() < 1e-9);
    assert!(analytics
        .coverage_curve
        .windows(2)
        .all(|w| w[0].covered <= w[1].covered));
    let last = analytics.iteration_stats.last().unwrap();
    assert_eq!(last.suite_size, report.suite.len());
}

#[test]
fn test_fixture_with_forbidden_rule() {
    let json = include_str!("../../antibody-ir/tests/fixtures/four_by_three.json");
    let report = generate_json(json, &EngineLimits::default()).unwrap();
    assert!(report
        .suite
        .iter()
        .all(|case| !(case[0] == "a1" && case[1] == "b1")));
    assert_eq!(report.phase, SearchPhase::Exhausted);
    assert_eq!(report.uncoverable, 1);
    assert_eq!(report.audited_covered, report.covered);
    assert!(report.to_string().contains("Uncoverable under forbidden rules: 1"));
}

#[test]
fn test_invalid_json_is_parse_error() {
    let result = generate_json("not json", &EngineLimits::default());
    assert!(matches!(result, Err(CampaignError::Parse(_))));
}

#[test]
fn test_invalid_configuration_is_rejected_up_front() {
    let mut request = parse_request(CANONICAL).unwrap();
    request.search.strength = 5;
    let result = generate(&request, &EngineLimits::default());
    assert!(matches!(
        result,
        Err(CampaignError::Search(SearchError::InvalidConfiguration(_)))
    ));
}

#[test]
fn test_limit_violation_is_rejected_up_front() {
    let limits = EngineLimits {
        max_obligations: 10,
        ..Default::default()
    };
    let result = generate_json(CANONICAL, &limits);
    assert!(matches!(
        result,
        Err(CampaignError::Limit(LimitViolation::TooManyObligations { size: 54, max: 10 }))
    ));
}

#[test]
fn test_unsatisfiable_rules_surface_as_distinct_error() {
    let json = r#"{
        "parameters": [ { "values": ["x", "y"] }, { "values": ["p", "q"] } ],
        "forbidden": [
            [ { "position": 1, "value": "p" } ],
            [ { "position": 1, "value": "q" } ]
        ]
    }"#;
    let result = generate_json(json, &EngineLimits::default());
    assert!(matches!(
        result,
        Err(CampaignError::Search(SearchError::UnsatisfiableConstraintSet(_)))
    ));
}

#[test]
fn test_report_round_trips_through_json() {
    let report = generate_json(CANONICAL, &EngineLimits::default()).unwrap();
    let json = report.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["total"], 54);
    assert_eq!(value["phase"], "Converged");
}

#[test]
fn test_partial_coverage_is_a_successful_return() {
    let json = r#"{
        "parameters": [
            { "values": ["1", "2", "3", "4"] },
            { "values": ["1", "2", "3", "4"] },
            { "values": ["1", "2", "3", "4"] },
            { "values": ["1", "2", "3", "4"] },
            { "values": ["1", "2", "3", "4"] }
        ],
        "search": { "strength": 3, "population_size": 4, "max_iterations": 2 }
    }"#;
    let report = generate_json(json, &EngineLimits::default()).unwrap();
    assert_eq!(report.phase, SearchPhase::Exhausted);
    assert_eq!(report.iterations, 2);
    assert!(report.covered < report.total);
    assert!(!report.suite.is_empty());
}

#[test]
fn test_suite_has_no_identical_cases() {
    let request = parse_request(CANONICAL).unwrap();
    let report = generate(&request, &EngineLimits::default()).unwrap();
    let cases: Vec<_> = report
        .suite
        .iter()
        .map(|tokens| {
            let refs: Vec<&str> = tokens.iter().map(String::as_str).collect();
            antibody_explore::space::TestCase::from_tokens(&request.parameters, &refs).unwrap()
        })
        .collect();
    for (i, case) in cases.iter().enumerate() {
        assert!(!is_near_duplicate(case, &cases[..i], 1));
    }
}
