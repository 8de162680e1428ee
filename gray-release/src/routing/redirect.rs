use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::instrument;

use crate::{
    api::errors::GrayReleaseError,
    metrics::{
        consts::{DECISION_COUNTER, REDIRECT_COUNTER, SUPERSEDED_REFRESH_COUNTER},
        utils::{inc, label},
    },
    routing::{
        navigation::{NavigationPort, NavigationRequest, PageStack},
        path_normalizer::{to_url, PATH_SEPARATOR},
        session::ReleaseSession,
    },
    rules::{
        rule_matching::match_reason,
        rule_models::{GrayRule, UserAttributes},
        rule_source::RuleSource,
    },
};

/// Recomputes the decision when the user identity changes and moves the user
/// to the other bundle when the decision flipped on a page that has one.
pub struct RedirectTrigger {
    session: Arc<ReleaseSession>,
    rule_source: RuleSource,
    pages: Arc<dyn PageStack + Send + Sync>,
    navigator: Arc<dyn NavigationPort + Send + Sync>,
    // bumped by every identity change; an async refresh that finds a newer
    // value after its fetch drops its result
    generation: AtomicU64,
}

impl RedirectTrigger {
    pub fn new(
        session: Arc<ReleaseSession>,
        rule_source: RuleSource,
        pages: Arc<dyn PageStack + Send + Sync>,
        navigator: Arc<dyn NavigationPort + Send + Sync>,
    ) -> Self {
        Self {
            session,
            rule_source,
            pages,
            navigator,
            generation: AtomicU64::new(0),
        }
    }

    /// Evaluates the cached rule. Returns whether a redirect was issued.
    pub fn on_identity_change(&self, user: &UserAttributes) -> Result<bool, GrayReleaseError> {
        if !self.session.is_enabled() {
            return Ok(false);
        }
        self.generation.fetch_add(1, Ordering::SeqCst);

        let rule = self.rule_source.cached_rule();
        self.apply(&rule, user)
    }

    /// Refreshes the rule from the network first. Returns whether a redirect
    /// was issued.
    #[instrument(skip_all)]
    pub async fn on_identity_change_async(
        &self,
        user: &UserAttributes,
    ) -> Result<bool, GrayReleaseError> {
        if !self.session.is_enabled() {
            return Ok(false);
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        // not cached yet: a superseded refresh must leave the store alone
        let rule = self.rule_source.resolve_rule().await.into_rule();

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::info!("identity changed again while fetching gray rule, dropping result");
            inc(SUPERSEDED_REFRESH_COUNTER, &[], 1);
            return Ok(false);
        }

        self.apply(&rule, user)
    }

    fn apply(&self, rule: &GrayRule, user: &UserAttributes) -> Result<bool, GrayReleaseError> {
        let reason = match_reason(rule, user);
        let is_target_user = reason.is_match();
        let previous = self.session.store().load().is_gray_version;

        inc(DECISION_COUNTER, &[label("is_gray", is_target_user)], 1);
        tracing::debug!(%reason, is_target_user, previous, "computed gray release decision");

        // persist before any redirect so the next navigation sees the new value
        if let Err(e) = self.session.store().save(rule, is_target_user) {
            tracing::error!("failed to persist gray release decision, skipping redirect: {}", e);
            return Ok(false);
        }

        let Some(page) = self.pages.current_page() else {
            return Ok(false);
        };
        let route = page.route.trim_start_matches(PATH_SEPARATOR);
        let path = self.session.prefix().strip(route);

        if !self.session.canary_pages().is_eligible(path) {
            return Ok(false);
        }

        if is_target_user == previous {
            return Ok(false);
        }

        let query = page.query_string();
        let url = to_url(
            &self.session.bundle_path(path, is_target_user),
            Some(query.as_str()),
        );
        tracing::info!(
            %reason,
            is_target_user,
            url = %url,
            "gray release decision changed, redirecting"
        );

        self.navigator
            .redirect_to(NavigationRequest::skipping_rewrite(url))
            .map_err(GrayReleaseError::Navigation)?;
        inc(REDIRECT_COUNTER, &[label("is_gray", is_target_user)], 1);

        Ok(true)
    }
}
