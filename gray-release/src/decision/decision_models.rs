use serde::{Deserialize, Serialize};

use crate::rules::rule_models::GrayRule;

/// The persisted record: the last fetched rule plus the verdict computed from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DecisionRecord {
    #[serde(flatten)]
    pub rule: GrayRule,
    #[serde(rename = "isGrayVersion", default)]
    pub is_gray_version: bool,
}

impl DecisionRecord {
    pub fn new(rule: GrayRule, is_gray_version: bool) -> Self {
        Self {
            rule,
            is_gray_version,
        }
    }
}
