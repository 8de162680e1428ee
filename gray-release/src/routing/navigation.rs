use serde_json::{Map, Value};
use std::sync::Arc;
use strum::Display;

/// The three navigation primitives of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum NavigationKind {
    /// Pushes a page onto the stack.
    #[strum(serialize = "navigate_to")]
    Navigate,
    /// Replaces the current page.
    #[strum(serialize = "redirect_to")]
    Redirect,
    /// Closes every page and opens the target.
    #[strum(serialize = "relaunch")]
    Relaunch,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationRequest {
    /// Target url, relative or absolute, with an optional query string.
    pub url: String,
    /// Set on navigations the gray release issues itself; the interceptor
    /// passes these through untouched.
    pub skip_rewrite: bool,
    /// Any other call parameters, forwarded verbatim.
    pub options: Map<String, Value>,
}

impl NavigationRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn skipping_rewrite(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            skip_rewrite: true,
            ..Self::default()
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }
}

/// Navigation capability injected wherever the application needs to move
/// between pages. Errors belong to the host and are passed through as-is.
pub trait NavigationPort {
    fn navigate_to(&self, request: NavigationRequest) -> anyhow::Result<()>;
    fn redirect_to(&self, request: NavigationRequest) -> anyhow::Result<()>;
    fn relaunch(&self, request: NavigationRequest) -> anyhow::Result<()>;

    fn dispatch(&self, kind: NavigationKind, request: NavigationRequest) -> anyhow::Result<()> {
        match kind {
            NavigationKind::Navigate => self.navigate_to(request),
            NavigationKind::Redirect => self.redirect_to(request),
            NavigationKind::Relaunch => self.relaunch(request),
        }
    }
}

impl<T: NavigationPort + ?Sized> NavigationPort for Arc<T> {
    fn navigate_to(&self, request: NavigationRequest) -> anyhow::Result<()> {
        (**self).navigate_to(request)
    }

    fn redirect_to(&self, request: NavigationRequest) -> anyhow::Result<()> {
        (**self).redirect_to(request)
    }

    fn relaunch(&self, request: NavigationRequest) -> anyhow::Result<()> {
        (**self).relaunch(request)
    }
}

/// One entry of the host's page stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub route: String,
    pub query: Vec<(String, String)>,
}

impl PageInfo {
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// `k=v` pairs joined with `&`, in their original order and unescaped.
    pub fn query_string(&self) -> String {
        self.query
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Read-only view of the host's navigation stack.
pub trait PageStack {
    fn current_pages(&self) -> Vec<PageInfo>;

    /// The page on top of the stack.
    fn current_page(&self) -> Option<PageInfo> {
        self.current_pages().pop()
    }
}
