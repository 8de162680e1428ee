use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

// TRICKY: rules published by the config service mark "every area" by putting
// this sentinel first in `areaCode`. Only the first element is inspected.
pub const ALL_AREAS_SENTINEL: &str = "all";

/// Which area codes a rule targets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum AreaFilter {
    AllAreas,
    SpecificCodes(Vec<String>),
}

impl Default for AreaFilter {
    fn default() -> Self {
        AreaFilter::SpecificCodes(Vec::new())
    }
}

impl From<Vec<String>> for AreaFilter {
    fn from(codes: Vec<String>) -> Self {
        match codes.first() {
            Some(first) if first == ALL_AREAS_SENTINEL => AreaFilter::AllAreas,
            _ => AreaFilter::SpecificCodes(codes),
        }
    }
}

impl From<AreaFilter> for Vec<String> {
    fn from(filter: AreaFilter) -> Self {
        match filter {
            AreaFilter::AllAreas => vec![ALL_AREAS_SENTINEL.to_string()],
            AreaFilter::SpecificCodes(codes) => codes,
        }
    }
}

impl AreaFilter {
    pub fn matches(&self, area_code: &str) -> bool {
        match self {
            AreaFilter::AllAreas => true,
            AreaFilter::SpecificCodes(codes) => {
                codes.iter().any(|code| area_code.starts_with(code.as_str()))
            }
        }
    }
}

/// The rule object served by the gray-release config endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrayRule {
    pub is_open: bool,
    #[serde(rename = "areaCode")]
    pub area: AreaFilter,
    pub phone_prefix: String,
    pub white_list: HashSet<String>,
    pub all: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_test: Option<bool>,
}

impl GrayRule {
    /// The rule every failure path degrades to.
    pub fn closed() -> Self {
        Self::default()
    }

    pub fn is_test(&self) -> bool {
        self.is_test.unwrap_or(false)
    }
}

/// Attributes of the logged-in user. Only the area code and the phone number
/// take part in rule evaluation; everything else is carried along untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_phone: Option<String>,
    #[serde(flatten)]
    pub identity: Map<String, Value>,
}

impl UserAttributes {
    pub fn new(area_code: Option<&str>, mobile_phone: Option<&str>) -> Self {
        Self {
            area_code: area_code.map(str::to_string),
            mobile_phone: mobile_phone.map(str::to_string),
            identity: Map::new(),
        }
    }

    pub fn area_code(&self) -> &str {
        self.area_code.as_deref().unwrap_or("")
    }

    pub fn mobile_phone(&self) -> &str {
        self.mobile_phone.as_deref().unwrap_or("")
    }
}
