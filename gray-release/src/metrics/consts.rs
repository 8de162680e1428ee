// Rule source
pub const RULE_FETCH_COUNTER: &str = "gray_release_rule_fetch_total";
pub const RULE_TEST_OVERRIDE_COUNTER: &str = "gray_release_rule_test_override_total";

// Decisions and redirects
pub const DECISION_COUNTER: &str = "gray_release_decision_total";
pub const REDIRECT_COUNTER: &str = "gray_release_redirect_total";
pub const SUPERSEDED_REFRESH_COUNTER: &str = "gray_release_superseded_refresh_total";

// Navigation interception
pub const NAVIGATION_REWRITE_COUNTER: &str = "gray_release_navigation_rewrite_total";

// Storage
pub const STORAGE_ERRORS_COUNTER: &str = "gray_release_storage_errors_total";
pub const CORRUPT_RECORD_COUNTER: &str = "gray_release_corrupt_record_total";
