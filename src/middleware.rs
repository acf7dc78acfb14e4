//! Middleware dispatch module
//!
//! The top-level entry point: matches a request against the configured
//! targets in declaration order and, on a match, drives path resolution,
//! the transform pipeline, caching, and response building. Requests no
//! target handles are forwarded untouched to the caller's next handler.
//!
//! NOTE: NOT SAFE against malicious paths. When a target names no explicit
//! files, the request path itself is resolved against the root directory
//! without traversal checks. Intended for local development only.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response};
use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::{CacheEntry, ResponseCache};
use crate::logger;
use crate::mime;
use crate::paths;
use crate::pipeline::{self, DiskProvider, FileProvider, RequestContext};
use crate::response;
use crate::target::{CacheMode, Target};

/// Global middleware options.
#[derive(Debug, Clone)]
pub struct MiddlewareConfig {
    /// Base directory prepended to relative file references.
    pub root: PathBuf,
    /// File name appended when a matched path ends in `/`.
    pub index_file: String,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            index_file: "index.html".to_string(),
        }
    }
}

/// Outcome of one dispatch: either a response was produced, or the request
/// is handed back untouched for the next handler in the chain.
pub enum Dispatched<B> {
    Response(Response<Full<Bytes>>),
    Forward(Request<B>),
}

impl<B> Dispatched<B> {
    pub fn into_response(self) -> Option<Response<Full<Bytes>>> {
        match self {
            Self::Response(resp) => Some(resp),
            Self::Forward(_) => None,
        }
    }

    pub const fn is_forward(&self) -> bool {
        matches!(self, Self::Forward(_))
    }
}

/// The resource-pipeline middleware: an ordered target list, a root
/// directory, and a per-instance response cache.
pub struct Middleware {
    root: PathBuf,
    index_file: String,
    targets: Vec<Target>,
    cache: ResponseCache,
    provider: Arc<dyn FileProvider>,
}

impl Middleware {
    /// Construct the middleware from global options and an ordered target
    /// list.
    pub fn new(config: MiddlewareConfig, targets: Vec<Target>) -> Self {
        if targets.iter().any(|t| t.legacy_stages) {
            logger::log_deprecated_stages();
        }
        Self {
            root: config.root,
            index_file: config.index_file,
            targets,
            cache: ResponseCache::new(),
            provider: Arc::new(DiskProvider),
        }
    }

    /// Construct with default options (root `.`, index file `index.html`).
    pub fn with_targets(targets: Vec<Target>) -> Self {
        Self::new(MiddlewareConfig::default(), targets)
    }

    /// Replace the file provider. Mainly useful for serving from something
    /// other than the local disk, and for tests.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn FileProvider>) -> Self {
        self.provider = provider;
        self
    }

    /// Remove one cached entry, forcing the next matching request to
    /// recompute. Clearing an unknown key is a no-op.
    pub fn clear(&self, key: &str) {
        self.cache.clear(key);
    }

    /// Dispatch one request.
    ///
    /// The first target (in declaration order) whose pattern matches the
    /// normalized request path serves it; exactly one of response or
    /// forward happens per call.
    pub async fn dispatch<B>(&self, req: Request<B>) -> Dispatched<B> {
        // 1. Normalize the path: the query string is ignored, a trailing
        //    slash means the directory's index file.
        let mut url_path = req.uri().path().to_string();
        if url_path.ends_with('/') {
            url_path.push_str(&self.index_file);
        }

        for target in &self.targets {
            let matcher = target.matcher.normalized(&self.index_file);
            if !matcher.matches(&url_path) {
                continue;
            }

            // 2. Resolve the effective cache key and try the cache.
            let cache_key = match &target.cache {
                CacheMode::Off => None,
                CacheMode::FromUrl => Some(matcher.to_string()),
                CacheMode::Key(key) => Some(key.clone()),
            };

            if let Some(key) = cache_key.as_deref() {
                if let Some(entry) = self.cache.get(key) {
                    logger::log_cache_hit(key);
                    return Dispatched::Response(response::build_resource_response(
                        &entry.mime_type,
                        entry.charset.as_deref(),
                        entry.content,
                    ));
                }
            }

            // 3. Resolve file paths: the configured set, or the request
            //    path itself minus the leading slash.
            let refs: Vec<String> = match &target.files {
                Some(files) => files.clone(),
                None => vec![url_path.trim_start_matches('/').to_string()],
            };
            let resolved = paths::resolve(&self.root, &refs);

            // 4. Run the pipeline.
            let ctx = RequestContext::new(&req);
            let stream = pipeline::source(Arc::clone(&self.provider), resolved.clone());
            let stream = pipeline::apply_stages(stream, &target.stages, &ctx);

            let Some(content) = pipeline::collect(stream).await else {
                logger::log_empty_target(&matcher.to_string(), &resolved);
                return Dispatched::Forward(req);
            };

            // 5. Determine the content type. An explicit override is used
            //    verbatim, with no charset derivation.
            let (mime_type, charset) = match &target.mime_type {
                Some(explicit) => (explicit.clone(), None),
                None => {
                    let mime_type = mime::lookup(&url_path);
                    (
                        mime_type.to_string(),
                        mime::charset_for(mime_type).map(str::to_string),
                    )
                }
            };

            // 6. Populate the cache and respond.
            if let Some(key) = cache_key {
                self.cache.put(
                    key,
                    CacheEntry {
                        mime_type: mime_type.clone(),
                        charset: charset.clone(),
                        content: content.clone(),
                    },
                );
            }

            return Dispatched::Response(response::build_resource_response(
                &mime_type,
                charset.as_deref(),
                content,
            ));
        }

        // No target matched.
        Dispatched::Forward(req)
    }
}
