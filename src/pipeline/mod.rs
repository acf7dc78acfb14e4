//! Content pipeline module
//!
//! Streams source files through an ordered chain of transform stages and
//! concatenates whatever comes out the far end. Each stage consumes the
//! previous stage's stream of file units and produces a new one; a stage
//! may add, drop, split, or rewrite units. Finiteness of the stream is
//! what triggers concatenation and the zero-files check.

mod provider;

pub use provider::{DiskProvider, FileProvider};

use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream, StreamExt};
use hyper::header::HeaderMap;
use hyper::{Method, Request, Uri};
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

/// One file flowing through the pipeline: its path plus in-memory content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUnit {
    pub path: PathBuf,
    pub contents: Bytes,
}

/// A lazy, ordered, finite sequence of file units.
pub type FileStream = Pin<Box<dyn Stream<Item = FileUnit> + Send + 'static>>;

/// One transform stage. Stage N sees the output of stage N-1, and may
/// consult the request that triggered the pipeline.
pub type Stage = Arc<dyn Fn(FileStream, &RequestContext) -> FileStream + Send + Sync>;

/// Request data handed to transform stages.
///
/// A clone of the request line and headers, so stages never borrow the
/// request body flowing through the server.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

impl RequestContext {
    pub fn new<B>(req: &Request<B>) -> Self {
        Self {
            method: req.method().clone(),
            uri: req.uri().clone(),
            headers: req.headers().clone(),
        }
    }
}

/// Produce the raw source stream: each path is read in order through the
/// file provider, and paths that do not exist are simply absent from the
/// stream (not an error).
pub fn source(provider: Arc<dyn FileProvider>, paths: Vec<PathBuf>) -> FileStream {
    Box::pin(stream::iter(paths).filter_map(move |path| {
        let provider = Arc::clone(&provider);
        async move { provider.fetch(&path).await }
    }))
}

/// Chain the transform stages over a stream, in declaration order.
pub fn apply_stages(mut stream: FileStream, stages: &[Stage], ctx: &RequestContext) -> FileStream {
    for stage in stages {
        stream = stage(stream, ctx);
    }
    stream
}

/// Drain the stream, concatenating unit contents in arrival order.
///
/// Returns `None` when zero units arrive; that is the signal that the
/// target's file set resolved to nothing.
pub async fn collect(mut stream: FileStream) -> Option<Bytes> {
    let mut num_files = 0usize;
    let mut content = BytesMut::new();
    while let Some(unit) = stream.next().await {
        num_files += 1;
        content.extend_from_slice(&unit.contents);
    }
    (num_files > 0).then(|| content.freeze())
}

/// Build a stage that rewrites each unit's contents in place.
///
/// Convenience for the common per-file transformation that neither splits
/// nor drops units.
pub fn map_contents<F>(f: F) -> Stage
where
    F: Fn(Bytes) -> Bytes + Clone + Send + Sync + 'static,
{
    Arc::new(move |stream, _ctx| {
        let f = f.clone();
        Box::pin(stream.map(move |unit| FileUnit {
            contents: f(unit.contents),
            ..unit
        }))
    })
}
