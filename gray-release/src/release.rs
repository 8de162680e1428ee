use std::sync::Arc;

use crate::{
    api::errors::GrayReleaseError,
    config::Config,
    decision::decision_store::DecisionStore,
    routing::{
        canary_pages::CanaryPageSet,
        interceptor::GrayNavigator,
        navigation::{NavigationPort, PageStack},
        path_normalizer::CanaryPrefix,
        redirect::RedirectTrigger,
        session::ReleaseSession,
    },
    rules::{
        rule_fetcher::RuleFetcher,
        rule_models::{GrayRule, UserAttributes},
        rule_source::RuleSource,
    },
    storage::KeyValueStore,
};

pub type SharedNavigator = Arc<dyn NavigationPort + Send + Sync>;

/// Host capabilities the gray release is built on.
#[derive(Clone)]
pub struct HostBindings {
    pub storage: Arc<dyn KeyValueStore + Send + Sync>,
    pub rule_fetcher: Arc<dyn RuleFetcher + Send + Sync>,
    pub page_stack: Arc<dyn PageStack + Send + Sync>,
    pub navigator: SharedNavigator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSettings {
    pub storage_key: String,
    pub canary_prefix: String,
}

impl Default for ReleaseSettings {
    fn default() -> Self {
        Self {
            storage_key: "grayReleaseInfo".to_string(),
            canary_prefix: "gray".to_string(),
        }
    }
}

impl From<&Config> for ReleaseSettings {
    fn from(config: &Config) -> Self {
        Self {
            storage_key: config.storage_key.clone(),
            canary_prefix: config.canary_prefix.clone(),
        }
    }
}

/// Entry point for the application: owns the session state and hands out the
/// intercepting navigator.
pub struct GrayRelease {
    session: Arc<ReleaseSession>,
    trigger: RedirectTrigger,
    host: HostBindings,
}

impl GrayRelease {
    /// Turns the feature on. Any stored decision is dropped; `rule`, when
    /// given, becomes the cached rule (a test rule here bypasses the network).
    ///
    /// Calling this again builds a fresh instance and resets state.
    pub fn enable(
        settings: &ReleaseSettings,
        host: HostBindings,
        rule: Option<GrayRule>,
        canary_pages: CanaryPageSet,
    ) -> Self {
        let release = Self::build(true, settings, host, canary_pages);
        let store = release.session.store();

        if let Err(e) = store.clear() {
            tracing::warn!("could not clear stale gray release record: {}", e);
        }
        if let Some(rule) = rule {
            if let Err(e) = store.save(&rule, false) {
                tracing::warn!("could not store initial gray rule: {}", e);
            }
        }

        tracing::info!(
            canary_pages = release.session.canary_pages().len(),
            prefix = release.session.prefix().segment(),
            "gray release enabled"
        );
        release
    }

    /// The feature stays off: navigation is passed through and identity
    /// changes neither touch storage nor the network.
    pub fn disabled(settings: &ReleaseSettings, host: HostBindings) -> Self {
        Self::build(false, settings, host, CanaryPageSet::default())
    }

    pub fn from_config(
        config: &Config,
        host: HostBindings,
        canary_pages: CanaryPageSet,
    ) -> Self {
        let settings = ReleaseSettings::from(config);
        if *config.enabled {
            Self::enable(&settings, host, None, canary_pages)
        } else {
            Self::disabled(&settings, host)
        }
    }

    fn build(
        enabled: bool,
        settings: &ReleaseSettings,
        host: HostBindings,
        canary_pages: CanaryPageSet,
    ) -> Self {
        let store = DecisionStore::new(host.storage.clone(), settings.storage_key.clone());
        let session = Arc::new(ReleaseSession::new(
            enabled,
            canary_pages,
            CanaryPrefix::new(&settings.canary_prefix),
            store.clone(),
        ));
        let trigger = RedirectTrigger::new(
            session.clone(),
            RuleSource::new(host.rule_fetcher.clone(), store),
            host.page_stack.clone(),
            host.navigator.clone(),
        );

        Self {
            session,
            trigger,
            host,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.session.is_enabled()
    }

    /// The navigator the application should use for every page change.
    pub fn navigator(&self) -> GrayNavigator<SharedNavigator> {
        GrayNavigator::new(
            self.host.navigator.clone(),
            self.session.clone(),
            self.host.page_stack.clone(),
        )
    }

    /// Re-evaluates the cached rule after login or logout.
    pub fn on_identity_change(&self, user: &UserAttributes) -> Result<bool, GrayReleaseError> {
        self.trigger.on_identity_change(user)
    }

    /// Fetches the current rule, then re-evaluates.
    pub async fn on_identity_change_async(
        &self,
        user: &UserAttributes,
    ) -> Result<bool, GrayReleaseError> {
        self.trigger.on_identity_change_async(user).await
    }

    pub fn is_currently_gray_target(&self) -> bool {
        self.session.is_gray_target()
    }
}
