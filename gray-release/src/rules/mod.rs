pub mod rule_fetcher;
pub mod rule_match_reason;
pub mod rule_matching;
pub mod rule_models;
pub mod rule_source;

#[cfg(test)]
mod test_rule_matching;
