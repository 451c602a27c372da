use serde::{Deserialize, Serialize};
use tack_core::{local, provide_local};

use crate::join;

/// The route that matched the current subtree, as reported by the router.
///
/// `path` is the pattern that matched (e.g. `/users/:id`); `url` is the
/// concrete part of the location it matched (e.g. `/users/42`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMatch {
    pub path: String,
    pub url: String,
    #[serde(default)]
    pub is_exact: bool,
}

impl RouteMatch {
    pub fn new(path: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            url: url.into(),
            is_exact: false,
        }
    }

    /// The application root, used when no route has been provided.
    pub fn root() -> Self {
        Self {
            path: "/".into(),
            url: "/".into(),
            is_exact: true,
        }
    }

    pub fn exact(mut self, is_exact: bool) -> Self {
        self.is_exact = is_exact;
        self
    }
}

impl Default for RouteMatch {
    fn default() -> Self {
        Self::root()
    }
}

/// Make `route` the matched route for everything `f` composes.
pub fn with_route_match<R>(route: RouteMatch, f: impl FnOnce() -> R) -> R {
    log::trace!("route context: {}", route.path);
    provide_local(route, f)
}

/// The innermost matched route, or [`RouteMatch::root`].
pub fn route_match() -> RouteMatch {
    local::<RouteMatch>().unwrap_or_default()
}

/// Builds paths relative to a fixed root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlBuilder {
    root: String,
}

impl UrlBuilder {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    /// Root taken from the current route's matched pattern.
    pub fn from_route() -> Self {
        Self::new(route_match().path)
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn url(&self, fragment: &str) -> String {
        join(&self.root, fragment)
    }

    /// A builder rooted one level deeper.
    pub fn nested(&self, fragment: &str) -> UrlBuilder {
        UrlBuilder::new(self.url(fragment))
    }
}

/// A closure that joins fragments onto the current route's matched path.
///
/// The route is captured when this is called, so the closure stays valid in
/// event handlers that run after the pass returns.
pub fn url_builder() -> impl Fn(&str) -> String + Clone + 'static {
    let builder = UrlBuilder::from_route();
    move |fragment: &str| builder.url(fragment)
}
