//! Resource-pipeline middleware for hyper-based dev servers.
//!
//! Serves one or more files from disk as a single HTTP response, optionally
//! passing their contents through a chain of transform stages first. Meant
//! for local development setups that want to concatenate and lightly
//! process static assets without a full build step.
//!
//! # Example
//! ```
//! use resource_pipeline::{Middleware, MiddlewareConfig, Target};
//!
//! let middleware = Middleware::new(
//!     MiddlewareConfig::default(),
//!     vec![
//!         // Concatenate two scripts into one cached bundle
//!         Target::new("/bundle.js")
//!             .files(["src/a.js", "src/b.js"])
//!             .cache(true),
//!         // Everything else under / is served as-is from the root
//!         Target::new(regex::Regex::new(r"^/").unwrap()),
//!     ],
//! );
//! # let _ = middleware;
//! ```
//!
//! Dispatching a request yields either a finished response or the original
//! request handed back for the next handler:
//! `middleware.dispatch(req).await` returns [`Dispatched::Response`] or
//! [`Dispatched::Forward`].

pub mod cache;
pub mod config;
pub mod logger;
pub mod middleware;
pub mod mime;
pub mod paths;
pub mod pipeline;
pub mod response;
pub mod target;

pub use middleware::{Dispatched, Middleware, MiddlewareConfig};
pub use pipeline::{
    map_contents, DiskProvider, FileProvider, FileStream, FileUnit, RequestContext, Stage,
};
pub use target::{CacheMode, Target, UrlMatcher};
