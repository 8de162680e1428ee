use std::process::ExitCode;
use std::sync::Arc;

use envconfig::Envconfig;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use gray_release::config::Config;
use gray_release::routing::canary_pages::CanaryPageSet;
use gray_release::routing::navigation::{NavigationPort, NavigationRequest, PageInfo, PageStack};
use gray_release::routing::path_normalizer::split_query;
use gray_release::rules::rule_fetcher::HttpRuleFetcher;
use gray_release::rules::rule_models::UserAttributes;
use gray_release::storage::FileStore;
use gray_release::{GrayRelease, GrayReleaseError, HostBindings};

/// Prints navigations instead of performing them.
struct LoggingNavigator;

impl NavigationPort for LoggingNavigator {
    fn navigate_to(&self, request: NavigationRequest) -> anyhow::Result<()> {
        tracing::info!(url = %request.url, "navigate_to");
        Ok(())
    }

    fn redirect_to(&self, request: NavigationRequest) -> anyhow::Result<()> {
        tracing::info!(url = %request.url, "redirect_to");
        Ok(())
    }

    fn relaunch(&self, request: NavigationRequest) -> anyhow::Result<()> {
        tracing::info!(url = %request.url, "relaunch");
        Ok(())
    }
}

/// A single-page stack built from `CURRENT_PAGE`, e.g. `pages/order/index?id=3`.
struct FixedPageStack(Vec<PageInfo>);

impl FixedPageStack {
    fn from_url(url: Option<&str>) -> Self {
        let Some(url) = url else {
            return FixedPageStack(Vec::new());
        };
        let (route, query) = split_query(url);
        let mut page = PageInfo::new(route);
        for pair in query.unwrap_or("").split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            page = page.with_query(key, value);
        }
        FixedPageStack(vec![page])
    }
}

impl PageStack for FixedPageStack {
    fn current_pages(&self) -> Vec<PageInfo> {
        self.0.clone()
    }
}

async fn run(config: Config) -> Result<(), GrayReleaseError> {
    let canary_pages = CanaryPageSet::from_json_file(&config.canary_pages_path)?;
    let storage = Arc::new(FileStore::new(config.storage_dir())?);
    let fetcher = Arc::new(HttpRuleFetcher::new(
        config.rule_endpoint.clone(),
        config.rule_request_timeout(),
    )?);

    let host = HostBindings {
        storage,
        rule_fetcher: fetcher,
        page_stack: Arc::new(FixedPageStack::from_url(config.current_page.as_deref())),
        navigator: Arc::new(LoggingNavigator),
    };
    let release = GrayRelease::from_config(&config, host, canary_pages);

    let user = UserAttributes::new(
        config.user_area_code.as_deref(),
        config.user_mobile_phone.as_deref(),
    );
    let redirected = release.on_identity_change_async(&user).await?;

    tracing::info!(
        enabled = release.is_enabled(),
        is_gray_target = release.is_currently_gray_target(),
        redirected,
        "gray release dry run finished"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::init_from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let log_layer = {
        let base_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_level(true);

        if *config.debug {
            base_layer
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
                .with_ansi(true)
                .with_filter(EnvFilter::from_default_env())
                .boxed()
        } else {
            base_layer
                .json()
                .with_filter(EnvFilter::from_default_env())
                .boxed()
        }
    };

    tracing_subscriber::registry().with(log_layer).init();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error_code = e.error_code(), "gray release dry run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
