use crate::rules::{
    rule_match_reason::GrayMatchReason,
    rule_models::{AreaFilter, GrayRule, UserAttributes},
};

/// Returns whether `user` belongs to the canary audience of `rule`.
pub fn evaluate(rule: &GrayRule, user: &UserAttributes) -> bool {
    match_reason(rule, user).is_match()
}

/// Evaluates the rule clauses in order; the first one that applies wins.
pub fn match_reason(rule: &GrayRule, user: &UserAttributes) -> GrayMatchReason {
    if !rule.is_open {
        return GrayMatchReason::RuleClosed;
    }

    if rule.all {
        return GrayMatchReason::AllUsers;
    }

    if rule.area == AreaFilter::AllAreas {
        return GrayMatchReason::AllAreas;
    }

    if rule.area.matches(user.area_code()) {
        return GrayMatchReason::AreaCodeMatch;
    }

    if !rule.phone_prefix.is_empty() && user.mobile_phone().starts_with(&rule.phone_prefix) {
        return GrayMatchReason::PhonePrefixMatch;
    }

    if rule.white_list.contains(user.mobile_phone()) {
        return GrayMatchReason::WhiteListMatch;
    }

    GrayMatchReason::NoMatch
}
