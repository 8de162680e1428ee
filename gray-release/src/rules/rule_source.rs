use std::sync::Arc;
use tracing::instrument;

use crate::{
    api::errors::GrayReleaseError,
    decision::decision_store::DecisionStore,
    metrics::{
        consts::{RULE_FETCH_COUNTER, RULE_TEST_OVERRIDE_COUNTER},
        utils::{inc, label},
    },
    rules::{
        rule_fetcher::{RuleFetcher, RuleResponse},
        rule_models::GrayRule,
    },
};

/// Resolves the rule currently in force. Never fails: every error path yields
/// a closed rule so the feature degrades to "off".
#[derive(Clone)]
pub struct RuleSource {
    fetcher: Arc<dyn RuleFetcher + Send + Sync>,
    store: DecisionStore,
}

impl RuleSource {
    pub fn new(fetcher: Arc<dyn RuleFetcher + Send + Sync>, store: DecisionStore) -> Self {
        Self { fetcher, store }
    }

    /// The rule on record, without touching the network.
    pub fn cached_rule(&self) -> GrayRule {
        self.store
            .try_load()
            .map(|record| record.rule)
            .unwrap_or_else(GrayRule::closed)
    }

    /// Resolves the rule and caches a freshly fetched one, keeping the
    /// previous verdict on record.
    #[instrument(skip_all)]
    pub async fn fetch_rule(&self) -> GrayRule {
        let resolved = self.resolve_rule().await;
        if let ResolvedRule::Fetched(rule) = &resolved {
            if let Err(e) = self.store.save_rule(rule) {
                tracing::warn!("failed to cache fetched gray rule: {}", e);
            }
        }
        resolved.into_rule()
    }

    /// Like [`RuleSource::fetch_rule`] but leaves the store untouched, for
    /// callers that persist the rule themselves once they know it is still
    /// wanted.
    pub async fn resolve_rule(&self) -> ResolvedRule {
        if let Some(record) = self.store.try_load() {
            if record.rule.is_test() {
                tracing::debug!("using test gray rule from storage, skipping fetch");
                inc(RULE_TEST_OVERRIDE_COUNTER, &[], 1);
                return ResolvedRule::TestOverride(record.rule);
            }
        }

        match self.fetcher.fetch().await.and_then(parse_rule_response) {
            Ok(rule) => {
                inc(RULE_FETCH_COUNTER, &[label("outcome", "success")], 1);
                ResolvedRule::Fetched(rule)
            }
            Err(e) => {
                tracing::warn!(
                    error_code = e.error_code(),
                    "failed to fetch gray rule, treating gray release as closed: {}",
                    e
                );
                inc(RULE_FETCH_COUNTER, &[label("outcome", e.error_code())], 1);
                ResolvedRule::Unavailable
            }
        }
    }
}

/// Where a resolved rule came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedRule {
    TestOverride(GrayRule),
    Fetched(GrayRule),
    Unavailable,
}

impl ResolvedRule {
    pub fn into_rule(self) -> GrayRule {
        match self {
            ResolvedRule::TestOverride(rule) | ResolvedRule::Fetched(rule) => rule,
            ResolvedRule::Unavailable => GrayRule::closed(),
        }
    }
}

fn parse_rule_response(response: RuleResponse) -> Result<GrayRule, GrayReleaseError> {
    if !response.is_success() {
        return Err(GrayReleaseError::UnexpectedStatus(response.status_code));
    }
    Ok(serde_json::from_str(&response.body)?)
}
