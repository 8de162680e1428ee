use std::sync::Arc;

use crate::{
    metrics::{
        consts::NAVIGATION_REWRITE_COUNTER,
        utils::{inc, label},
    },
    routing::{
        navigation::{NavigationKind, NavigationPort, NavigationRequest, PageStack},
        path_normalizer::{resolve, split_query, to_url, PATH_SEPARATOR},
        session::ReleaseSession,
    },
};

/// Decorates a host navigator so every outgoing url points into the bundle
/// matching the persisted decision.
pub struct GrayNavigator<N> {
    inner: N,
    session: Arc<ReleaseSession>,
    pages: Arc<dyn PageStack + Send + Sync>,
}

impl<N: NavigationPort> GrayNavigator<N> {
    pub fn new(
        inner: N,
        session: Arc<ReleaseSession>,
        pages: Arc<dyn PageStack + Send + Sync>,
    ) -> Self {
        Self {
            inner,
            session,
            pages,
        }
    }

    /// Returns the request the host primitive will actually receive.
    pub fn rewrite(&self, kind: NavigationKind, request: NavigationRequest) -> NavigationRequest {
        if request.skip_rewrite || !self.session.is_enabled() {
            return request;
        }

        let current_route = self
            .pages
            .current_page()
            .map(|page| page.route)
            .unwrap_or_default();
        // hosts may report routes with or without the leading separator
        let current_path = current_route.trim_start_matches(PATH_SEPARATOR);
        let (target, query) = split_query(&request.url);
        let resolved = resolve(current_path, target);
        let path = self.session.prefix().strip(&resolved);

        let is_gray = self.session.canary_pages().is_eligible(path)
            && self.session.store().is_gray_version();
        let url = to_url(&self.session.bundle_path(path, is_gray), query);

        tracing::debug!(
            kind = %kind,
            from = %request.url,
            to = %url,
            "rewrote navigation target"
        );
        inc(
            NAVIGATION_REWRITE_COUNTER,
            &[label("kind", kind), label("prefixed", is_gray)],
            1,
        );

        NavigationRequest { url, ..request }
    }
}

impl<N: NavigationPort> NavigationPort for GrayNavigator<N> {
    fn navigate_to(&self, request: NavigationRequest) -> anyhow::Result<()> {
        let request = self.rewrite(NavigationKind::Navigate, request);
        self.inner.navigate_to(request)
    }

    fn redirect_to(&self, request: NavigationRequest) -> anyhow::Result<()> {
        let request = self.rewrite(NavigationKind::Redirect, request);
        self.inner.redirect_to(request)
    }

    fn relaunch(&self, request: NavigationRequest) -> anyhow::Result<()> {
        let request = self.rewrite(NavigationKind::Relaunch, request);
        self.inner.relaunch(request)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        decision::decision_store::DecisionStore,
        routing::{
            canary_pages::CanaryPageSet, navigation::PageInfo, path_normalizer::CanaryPrefix,
        },
        rules::rule_models::GrayRule,
        storage::MemoryStore,
        utils::test_utils::{RecordingNavigator, StaticPageStack},
    };

    struct Fixture {
        navigator: GrayNavigator<Arc<RecordingNavigator>>,
        recorder: Arc<RecordingNavigator>,
        store: DecisionStore,
    }

    fn fixture(enabled: bool, current_route: &str) -> Fixture {
        let store = DecisionStore::new(Arc::new(MemoryStore::new()), "grayReleaseInfo");
        let session = Arc::new(ReleaseSession::new(
            enabled,
            CanaryPageSet::new(["pages/order", "pages/pay"]),
            CanaryPrefix::new("gray"),
            store.clone(),
        ));
        let pages = Arc::new(StaticPageStack::new(vec![
            PageInfo::new("pages/home/index"),
            PageInfo::new(current_route),
        ]));
        let recorder = Arc::new(RecordingNavigator::new());

        Fixture {
            navigator: GrayNavigator::new(recorder.clone(), session, pages),
            recorder,
            store,
        }
    }

    #[test]
    fn test_gray_user_is_sent_to_canary_bundle() {
        let f = fixture(true, "pages/order/list");
        f.store.save(&GrayRule::closed(), true).unwrap();

        f.navigator
            .navigate_to(NavigationRequest::new("detail?id=7"))
            .unwrap();

        assert_eq!(
            f.recorder.calls(),
            vec![(
                NavigationKind::Navigate,
                NavigationRequest::new("/gray/pages/order/detail?id=7")
            )]
        );
    }

    #[test]
    fn test_opt_out_is_passed_through_exactly() {
        let f = fixture(true, "pages/order/list");
        f.store.save(&GrayRule::closed(), true).unwrap();

        let request = NavigationRequest::skipping_rewrite("/pages/order/detail?id=7");
        f.navigator.redirect_to(request.clone()).unwrap();

        assert_eq!(f.recorder.calls(), vec![(NavigationKind::Redirect, request)]);
    }

    #[test]
    fn test_production_user_loses_canary_prefix() {
        let f = fixture(true, "gray/pages/order/list");
        f.store.save(&GrayRule::closed(), false).unwrap();

        f.navigator
            .redirect_to(NavigationRequest::new("/gray/pages/pay/index"))
            .unwrap();
        f.navigator
            .navigate_to(NavigationRequest::new("detail"))
            .unwrap();

        let urls: Vec<_> = f.recorder.calls().into_iter().map(|(_, r)| r.url).collect();
        assert_eq!(urls, vec!["/pages/pay/index", "/pages/order/detail"]);
    }

    #[test]
    fn test_ineligible_pages_stay_in_production_bundle() {
        let f = fixture(true, "gray/pages/order/list");
        f.store.save(&GrayRule::closed(), true).unwrap();

        f.navigator
            .relaunch(NavigationRequest::new("/gray/pages/home/index"))
            .unwrap();

        assert_eq!(
            f.recorder.calls(),
            vec![(
                NavigationKind::Relaunch,
                NavigationRequest::new("/pages/home/index")
            )]
        );
    }

    #[test]
    fn test_existing_prefix_is_not_doubled() {
        let f = fixture(true, "gray/pages/order/list");
        f.store.save(&GrayRule::closed(), true).unwrap();

        f.navigator
            .navigate_to(NavigationRequest::new("../pay/index"))
            .unwrap();

        assert_eq!(f.recorder.calls()[0].1.url, "/gray/pages/pay/index");
    }

    #[test]
    fn test_slash_led_current_routes_are_normalized() {
        for route in ["/pages/order/list", "/gray/pages/order/list"] {
            let f = fixture(true, route);
            f.store.save(&GrayRule::closed(), true).unwrap();

            f.navigator
                .navigate_to(NavigationRequest::new("detail"))
                .unwrap();

            assert_eq!(f.recorder.calls()[0].1.url, "/gray/pages/order/detail", "{route}");
        }
    }

    #[test]
    fn test_other_parameters_are_preserved() {
        let f = fixture(true, "pages/order/list");
        f.store.save(&GrayRule::closed(), true).unwrap();

        let request = NavigationRequest::new("/pages/pay/index?amount=10")
            .with_option("animationType", json!("slide-in-right"))
            .with_option("animationDuration", json!(200));
        f.navigator.navigate_to(request).unwrap();

        let (_, delegated) = f.recorder.calls().remove(0);
        assert_eq!(delegated.url, "/gray/pages/pay/index?amount=10");
        assert!(!delegated.skip_rewrite);
        assert_eq!(delegated.options.get("animationType"), Some(&json!("slide-in-right")));
        assert_eq!(delegated.options.get("animationDuration"), Some(&json!(200)));
    }

    #[test]
    fn test_missing_decision_means_production() {
        let f = fixture(true, "pages/order/list");

        f.navigator
            .navigate_to(NavigationRequest::new("detail"))
            .unwrap();

        assert_eq!(f.recorder.calls()[0].1.url, "/pages/order/detail");
    }

    #[test]
    fn test_disabled_feature_delegates_unchanged() {
        let f = fixture(false, "pages/order/list");
        f.store.save(&GrayRule::closed(), true).unwrap();

        f.navigator
            .navigate_to(NavigationRequest::new("detail"))
            .unwrap();

        assert_eq!(f.recorder.calls()[0].1.url, "detail");
    }

    #[test]
    fn test_host_errors_pass_through() {
        let f = fixture(true, "pages/order/list");
        f.recorder.fail_next("webview count limit exceed");

        let err = f
            .navigator
            .navigate_to(NavigationRequest::new("detail"))
            .unwrap_err();

        assert_eq!(err.to_string(), "webview count limit exceed");
    }
}
