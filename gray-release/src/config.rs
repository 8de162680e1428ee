use envconfig::Envconfig;
use std::ops::Deref;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlexBool(pub bool);

impl FromStr for FlexBool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(FlexBool(true)),
            "false" | "0" | "no" | "off" | "" => Ok(FlexBool(false)),
            _ => Err(format!("Invalid boolean value: {}", s)),
        }
    }
}

impl From<FlexBool> for bool {
    fn from(flex: FlexBool) -> Self {
        flex.0
    }
}

impl Deref for FlexBool {
    type Target = bool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    #[envconfig(from = "GRAY_RELEASE_ENABLED", default = "true")]
    pub enabled: FlexBool,

    #[envconfig(
        from = "RULE_ENDPOINT",
        default = "http://localhost:8000/api/gray-release/rule"
    )]
    pub rule_endpoint: String,

    #[envconfig(from = "RULE_REQUEST_TIMEOUT_MS", default = "5000")]
    pub rule_request_timeout_ms: u64,

    #[envconfig(from = "STORAGE_DIR", default = ".gray-release")]
    pub storage_dir: String,

    #[envconfig(from = "STORAGE_KEY", default = "grayReleaseInfo")]
    pub storage_key: String,

    #[envconfig(from = "CANARY_PREFIX", default = "gray")]
    pub canary_prefix: String,

    #[envconfig(from = "CANARY_PAGES_PATH", default = "canary_pages.json")]
    pub canary_pages_path: String,

    #[envconfig(from = "DEBUG", default = "false")]
    pub debug: FlexBool,

    // dry-run inputs, only read by the binary
    #[envconfig(from = "USER_AREA_CODE")]
    pub user_area_code: Option<String>,

    #[envconfig(from = "USER_MOBILE_PHONE")]
    pub user_mobile_phone: Option<String>,

    #[envconfig(from = "CURRENT_PAGE")]
    pub current_page: Option<String>,
}

impl Config {
    pub fn default_test_config() -> Self {
        Self {
            enabled: FlexBool(true),
            rule_endpoint: "http://localhost:8000/api/gray-release/rule".to_string(),
            rule_request_timeout_ms: 5000,
            storage_dir: ".gray-release-test".to_string(),
            storage_key: "grayReleaseInfo".to_string(),
            canary_prefix: "gray".to_string(),
            canary_pages_path: "canary_pages.json".to_string(),
            debug: FlexBool(false),
            user_area_code: None,
            user_mobile_phone: None,
            current_page: None,
        }
    }

    pub fn rule_request_timeout(&self) -> Duration {
        Duration::from_millis(self.rule_request_timeout_ms)
    }

    pub fn storage_dir(&self) -> PathBuf {
        PathBuf::from(&self.storage_dir)
    }
}
