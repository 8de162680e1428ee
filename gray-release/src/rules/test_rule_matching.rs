use rstest::rstest;
use serde_json::json;

use crate::rules::{
    rule_match_reason::GrayMatchReason,
    rule_matching::{evaluate, match_reason},
    rule_models::{GrayRule, UserAttributes},
};

fn rule(value: serde_json::Value) -> GrayRule {
    serde_json::from_value(value).expect("invalid rule fixture")
}

fn user(area_code: Option<&str>, mobile_phone: Option<&str>) -> UserAttributes {
    UserAttributes::new(area_code, mobile_phone)
}

#[rstest]
#[case::everything_on(json!({
    "isOpen": false,
    "all": true,
    "areaCode": ["all"],
    "phonePrefix": "1",
    "whiteList": ["13800000000"]
}))]
#[case::all_users(json!({"isOpen": false, "all": true}))]
#[case::area_list(json!({"isOpen": false, "areaCode": ["11"]}))]
#[case::white_list(json!({"isOpen": false, "whiteList": ["13800000000"]}))]
#[case::empty(json!({}))]
fn test_closed_rule_never_matches(#[case] value: serde_json::Value) {
    let closed = rule(value);
    for candidate in [
        user(None, None),
        user(Some("110105"), Some("13800000000")),
        user(Some("all"), Some("1")),
    ] {
        assert!(!evaluate(&closed, &candidate));
        assert_eq!(match_reason(&closed, &candidate), GrayMatchReason::RuleClosed);
    }
}

#[rstest]
#[case::no_attributes(None, None)]
#[case::area_only(Some("990000"), None)]
#[case::phone_only(None, Some("17000000000"))]
fn test_open_rule_for_all_users_always_matches(
    #[case] area_code: Option<&str>,
    #[case] mobile_phone: Option<&str>,
) {
    let open = rule(json!({"isOpen": true, "all": true, "areaCode": ["11"], "phonePrefix": "138"}));
    assert!(evaluate(&open, &user(area_code, mobile_phone)));
    assert_eq!(
        match_reason(&open, &user(area_code, mobile_phone)),
        GrayMatchReason::AllUsers
    );
}

#[test]
fn test_all_areas_sentinel_matches_users_without_area() {
    let all_areas = rule(json!({"isOpen": true, "areaCode": ["all", "110000"]}));
    assert!(evaluate(&all_areas, &user(None, None)));
    assert!(evaluate(&all_areas, &user(Some("220000"), None)));
    assert_eq!(
        match_reason(&all_areas, &user(None, None)),
        GrayMatchReason::AllAreas
    );
}

#[test]
fn test_sentinel_outside_first_position_is_a_plain_code() {
    let later = rule(json!({"isOpen": true, "areaCode": ["110000", "all"]}));
    assert!(!evaluate(&later, &user(Some("220000"), None)));
    assert!(evaluate(&later, &user(Some("all-areas"), None)));
}

#[rstest]
#[case::prefix_match(Some("110105"), true)]
#[case::exact_match(Some("11"), true)]
#[case::other_area(Some("220000"), false)]
#[case::shorter_than_code(Some("1"), false)]
#[case::missing_area(None, false)]
fn test_area_code_prefix_matching(#[case] area_code: Option<&str>, #[case] expected: bool) {
    let area_rule = rule(json!({"isOpen": true, "areaCode": ["11"]}));
    assert_eq!(evaluate(&area_rule, &user(area_code, None)), expected);
}

#[test]
fn test_area_code_matching_is_case_sensitive() {
    let area_rule = rule(json!({"isOpen": true, "areaCode": ["ab"]}));
    assert!(evaluate(&area_rule, &user(Some("abc"), None)));
    assert!(!evaluate(&area_rule, &user(Some("ABC"), None)));
}

#[test]
fn test_empty_area_list_never_matches() {
    let no_areas = rule(json!({"isOpen": true, "areaCode": []}));
    assert!(!evaluate(&no_areas, &user(Some("110105"), None)));
    assert!(!evaluate(&no_areas, &user(None, None)));
}

#[rstest]
#[case::prefix_match(Some("13812345678"), true)]
#[case::other_prefix(Some("13912345678"), false)]
#[case::missing_phone(None, false)]
fn test_phone_prefix_matching(#[case] mobile_phone: Option<&str>, #[case] expected: bool) {
    let phone_rule = rule(json!({"isOpen": true, "phonePrefix": "138"}));
    assert_eq!(evaluate(&phone_rule, &user(None, mobile_phone)), expected);
}

#[test]
fn test_empty_phone_prefix_does_not_match_everyone() {
    let no_prefix = rule(json!({"isOpen": true, "phonePrefix": ""}));
    assert!(!evaluate(&no_prefix, &user(None, Some("13812345678"))));
}

#[test]
fn test_white_list_requires_exact_phone() {
    let white_list = rule(json!({"isOpen": true, "whiteList": ["13800000000", "13900000000"]}));
    assert!(evaluate(&white_list, &user(None, Some("13900000000"))));
    assert!(!evaluate(&white_list, &user(None, Some("1390000000"))));
    assert_eq!(
        match_reason(&white_list, &user(None, Some("13800000000"))),
        GrayMatchReason::WhiteListMatch
    );
}

#[test]
fn test_first_matching_clause_is_reported() {
    let layered = rule(json!({
        "isOpen": true,
        "areaCode": ["11"],
        "phonePrefix": "138",
        "whiteList": ["13800000000"]
    }));

    assert_eq!(
        match_reason(&layered, &user(Some("110105"), Some("13800000000"))),
        GrayMatchReason::AreaCodeMatch
    );
    assert_eq!(
        match_reason(&layered, &user(Some("220000"), Some("13800000000"))),
        GrayMatchReason::PhonePrefixMatch
    );
    assert_eq!(
        match_reason(&layered, &user(Some("220000"), Some("13900000000"))),
        GrayMatchReason::NoMatch
    );
}

#[test]
fn test_match_reason_labels() {
    assert_eq!(GrayMatchReason::AreaCodeMatch.to_string(), "area_code_match");
    assert_eq!(
        "white_list_match".parse::<GrayMatchReason>().unwrap(),
        GrayMatchReason::WhiteListMatch
    );
    assert!(!GrayMatchReason::NoMatch.is_match());
    assert!(GrayMatchReason::AllAreas.is_match());
}
