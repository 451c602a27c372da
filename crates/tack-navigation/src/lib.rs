//! Route-relative URLs.
//!
//! The router (outside this crate) reports which route matched a subtree via
//! [`with_route_match`]. Components inside it build links relative to that
//! match without knowing where they are mounted:
//!
//! ```rust
//! use tack_navigation::*;
//!
//! with_route_match(RouteMatch::new("/teams/:team/", "/teams/core/"), || {
//!     let url = url_builder();
//!     assert_eq!(url("/members"), "/teams/:team/members");
//! });
//! ```

mod path;
mod route;

pub use path::{SEPARATOR, join};
pub use route::{RouteMatch, UrlBuilder, route_match, url_builder, with_route_match};
