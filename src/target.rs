//! Target configuration module
//!
//! One target maps a URL pattern to a file set and a processing pipeline.
//! Both transform-configuration styles (a whole-stream pipeline function,
//! or individual stages appended in order) normalize into one ordered stage
//! list at construction, so the runner never branches on the style used.

use regex::Regex;
use std::fmt;
use std::sync::Arc;

use crate::pipeline::{FileStream, RequestContext, Stage};

/// A URL pattern: an exact path string, or a regular expression.
#[derive(Debug, Clone)]
pub enum UrlMatcher {
    Exact(String),
    Pattern(Regex),
}

impl UrlMatcher {
    /// Test a normalized request path against this pattern.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(url) => url == path,
            Self::Pattern(re) => re.is_match(path),
        }
    }

    /// Exact patterns ending in `/` match the directory's index file, the
    /// same normalization applied to the request path.
    pub(crate) fn normalized(&self, index_file: &str) -> Self {
        match self {
            Self::Exact(url) if url.ends_with('/') => Self::Exact(format!("{url}{index_file}")),
            other => other.clone(),
        }
    }
}

impl fmt::Display for UrlMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(url) => f.write_str(url),
            Self::Pattern(re) => f.write_str(re.as_str()),
        }
    }
}

impl From<&str> for UrlMatcher {
    fn from(url: &str) -> Self {
        Self::Exact(url.to_string())
    }
}

impl From<String> for UrlMatcher {
    fn from(url: String) -> Self {
        Self::Exact(url)
    }
}

impl From<Regex> for UrlMatcher {
    fn from(re: Regex) -> Self {
        Self::Pattern(re)
    }
}

/// How a target's computed response is cached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// Recompute on every request.
    #[default]
    Off,
    /// Cache under the stringified (index-normalized) URL pattern.
    FromUrl,
    /// Cache under an explicit key.
    Key(String),
}

/// One configured rule: URL pattern, file set, transform stages, and the
/// response/caching options. Built once at middleware construction and
/// immutable thereafter.
pub struct Target {
    pub(crate) matcher: UrlMatcher,
    pub(crate) files: Option<Vec<String>>,
    pub(crate) stages: Vec<Stage>,
    pub(crate) legacy_stages: bool,
    pub(crate) mime_type: Option<String>,
    pub(crate) cache: CacheMode,
}

impl Target {
    /// Create a target matching `url`, serving the request path itself
    /// (minus the leading `/`) until `files` names an explicit set.
    pub fn new(url: impl Into<UrlMatcher>) -> Self {
        Self {
            matcher: url.into(),
            files: None,
            stages: Vec::new(),
            legacy_stages: false,
            mime_type: None,
            cache: CacheMode::Off,
        }
    }

    /// Explicit ordered file references, relative to the middleware root
    /// or absolute.
    #[must_use]
    pub fn files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = Some(files.into_iter().map(Into::into).collect());
        self
    }

    /// Supply the whole transform as one request-aware function over the
    /// raw source stream. Replaces any stages added so far.
    #[must_use]
    pub fn pipeline<F>(mut self, f: F) -> Self
    where
        F: Fn(FileStream, &RequestContext) -> FileStream + Send + Sync + 'static,
    {
        self.stages.clear();
        self.legacy_stages = false;
        self.stages.push(Arc::new(f));
        self
    }

    /// Append one transform stage. Stages run in declaration order.
    ///
    /// Retained for configurations ported from the per-stage style; prefer
    /// [`Target::pipeline`]. Using this emits a deprecation warning when
    /// the middleware is constructed.
    #[must_use]
    pub fn stage<F>(mut self, f: F) -> Self
    where
        F: Fn(FileStream) -> FileStream + Send + Sync + 'static,
    {
        self.legacy_stages = true;
        self.stages.push(Arc::new(move |stream, _ctx| f(stream)));
        self
    }

    /// Override the response MIME type. The value is emitted verbatim and
    /// bypasses charset derivation.
    #[must_use]
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Cache the computed response under the stringified URL pattern.
    #[must_use]
    pub fn cache(mut self, enabled: bool) -> Self {
        self.cache = if enabled {
            CacheMode::FromUrl
        } else {
            CacheMode::Off
        };
        self
    }

    /// Cache the computed response under an explicit key.
    #[must_use]
    pub fn cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache = CacheMode::Key(key.into());
        self
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("matcher", &self.matcher)
            .field("files", &self.files)
            .field("stages", &self.stages.len())
            .field("mime_type", &self.mime_type)
            .field("cache", &self.cache)
            .finish()
    }
}
