use strum::{Display, EnumString};

/// Why a rule did or did not select a user, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum GrayMatchReason {
    #[strum(serialize = "rule_closed")]
    RuleClosed,
    #[strum(serialize = "all_users")]
    AllUsers,
    #[strum(serialize = "all_areas")]
    AllAreas,
    #[strum(serialize = "area_code_match")]
    AreaCodeMatch,
    #[strum(serialize = "phone_prefix_match")]
    PhonePrefixMatch,
    #[strum(serialize = "white_list_match")]
    WhiteListMatch,
    #[strum(serialize = "no_match")]
    NoMatch,
}

impl GrayMatchReason {
    pub fn is_match(&self) -> bool {
        !matches!(self, GrayMatchReason::RuleClosed | GrayMatchReason::NoMatch)
    }
}
