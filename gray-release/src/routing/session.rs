use crate::{
    decision::decision_store::DecisionStore,
    routing::{canary_pages::CanaryPageSet, path_normalizer::CanaryPrefix},
};

/// State shared by the navigation interceptor and the redirect trigger.
///
/// The toggle and the canary page set are fixed at construction; the decision
/// lives in the store and is re-read on every use.
pub struct ReleaseSession {
    enabled: bool,
    canary_pages: CanaryPageSet,
    prefix: CanaryPrefix,
    store: DecisionStore,
}

impl ReleaseSession {
    pub fn new(
        enabled: bool,
        canary_pages: CanaryPageSet,
        prefix: CanaryPrefix,
        store: DecisionStore,
    ) -> Self {
        Self {
            enabled,
            canary_pages,
            prefix,
            store,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn canary_pages(&self) -> &CanaryPageSet {
        &self.canary_pages
    }

    pub fn prefix(&self) -> &CanaryPrefix {
        &self.prefix
    }

    pub fn store(&self) -> &DecisionStore {
        &self.store
    }

    pub fn is_gray_target(&self) -> bool {
        self.enabled && self.store.is_gray_version()
    }

    /// Maps a prefix-stripped page path onto the bundle the user belongs to.
    pub fn bundle_path(&self, path: &str, is_gray: bool) -> String {
        if is_gray && self.canary_pages.is_eligible(path) {
            self.prefix.apply(path)
        } else {
            path.to_string()
        }
    }
}
