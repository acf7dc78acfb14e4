//! End-to-end dispatch behavior: matching, resolution, pipeline output,
//! content types, and caching.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use http_body_util::{BodyExt, Full};
use hyper::{Request, Response};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use resource_pipeline::{
    map_contents, FileProvider, FileUnit, Middleware, MiddlewareConfig, Target,
};

/// In-memory provider that records every fetch, so tests can assert on
/// provider call counts and on the exact paths the middleware resolved.
struct RecordingProvider {
    files: HashMap<PathBuf, Bytes>,
    calls: AtomicUsize,
    fetched: Mutex<Vec<PathBuf>>,
}

impl RecordingProvider {
    fn new(files: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            files: files
                .iter()
                .map(|(p, c)| (PathBuf::from(p), Bytes::copy_from_slice(c.as_bytes())))
                .collect(),
            calls: AtomicUsize::new(0),
            fetched: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fetched_paths(&self) -> Vec<PathBuf> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileProvider for RecordingProvider {
    async fn fetch(&self, path: &Path) -> Option<FileUnit> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.fetched.lock().unwrap().push(path.to_path_buf());
        self.files.get(path).map(|contents| FileUnit {
            path: path.to_path_buf(),
            contents: contents.clone(),
        })
    }
}

fn get(path: &str) -> Request<()> {
    Request::builder().uri(path).body(()).unwrap()
}

async fn body_bytes(resp: Response<Full<Bytes>>) -> Bytes {
    resp.into_body().collect().await.unwrap().to_bytes()
}

#[tokio::test]
async fn no_matching_target_forwards() {
    let provider = RecordingProvider::new(&[("index.html", "hi")]);
    let middleware = Middleware::with_targets(vec![Target::new("/app.js")])
        .with_provider(Arc::clone(&provider) as Arc<dyn FileProvider>);

    let outcome = middleware.dispatch(get("/style.css")).await;
    assert!(outcome.is_forward());
    // The pipeline never ran
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn empty_file_set_forwards() {
    let provider = RecordingProvider::new(&[]);
    let middleware = Middleware::with_targets(vec![
        Target::new("/bundle.js").files(["missing-a.js", "missing-b.js"])
    ])
    .with_provider(provider);

    let outcome = middleware.dispatch(get("/bundle.js")).await;
    assert!(outcome.is_forward());
}

#[tokio::test]
async fn concatenates_files_in_declared_order() {
    let provider = RecordingProvider::new(&[("a.html", "A"), ("b.html", "B")]);
    let middleware =
        Middleware::with_targets(vec![Target::new("/").files(["a.html", "b.html"])])
            .with_provider(provider);

    let resp = middleware.dispatch(get("/")).await.into_response().unwrap();
    assert_eq!(body_bytes(resp).await, Bytes::from_static(b"AB"));
}

#[tokio::test]
async fn serves_from_disk_relative_to_root() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.html"), "A").unwrap();
    std::fs::write(dir.path().join("b.html"), "B").unwrap();

    let config = MiddlewareConfig {
        root: dir.path().to_path_buf(),
        ..MiddlewareConfig::default()
    };
    let middleware = Middleware::new(
        config,
        vec![Target::new("/").files(["a.html", "b.html"])],
    );

    let resp = middleware.dispatch(get("/")).await.into_response().unwrap();
    assert!(resp
        .headers()
        .get("Content-Type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    assert_eq!(body_bytes(resp).await, Bytes::from_static(b"AB"));
}

#[tokio::test]
async fn request_path_becomes_file_reference() {
    let provider = RecordingProvider::new(&[("x/index.html", "index")]);
    let middleware =
        Middleware::with_targets(vec![Target::new("/x/")]).with_provider(Arc::clone(&provider) as Arc<dyn FileProvider>);

    let resp = middleware.dispatch(get("/x/")).await.into_response().unwrap();
    assert_eq!(body_bytes(resp).await, Bytes::from_static(b"index"));
    // Trailing slash picked up the index file, minus the leading slash
    assert_eq!(provider.fetched_paths(), vec![PathBuf::from("x/index.html")]);
}

#[tokio::test]
async fn explicit_mime_type_overrides_lookup() {
    let provider = RecordingProvider::new(&[("page.html", "<p>")]);
    let middleware = Middleware::with_targets(vec![Target::new("/page.html")
        .files(["page.html"])
        .mime_type("application/x-custom")])
    .with_provider(provider);

    let resp = middleware
        .dispatch(get("/page.html"))
        .await
        .into_response()
        .unwrap();
    // Verbatim, with no derived charset
    assert_eq!(
        resp.headers().get("Content-Type").unwrap(),
        "application/x-custom"
    );
}

#[tokio::test]
async fn cached_target_computes_once() {
    let provider = RecordingProvider::new(&[("a.js", "A"), ("b.js", "B")]);
    let middleware = Middleware::with_targets(vec![Target::new("/bundle.js")
        .files(["a.js", "b.js"])
        .cache(true)])
    .with_provider(Arc::clone(&provider) as Arc<dyn FileProvider>);

    let first = middleware
        .dispatch(get("/bundle.js"))
        .await
        .into_response()
        .unwrap();
    let calls_after_first = provider.call_count();
    assert_eq!(calls_after_first, 2);

    let second = middleware
        .dispatch(get("/bundle.js"))
        .await
        .into_response()
        .unwrap();
    // Served from cache: byte-identical, provider untouched
    assert_eq!(provider.call_count(), calls_after_first);

    let first_type = first.headers().get("Content-Type").unwrap().clone();
    let second_type = second.headers().get("Content-Type").unwrap().clone();
    assert_eq!(first_type, second_type);
    assert_eq!(body_bytes(first).await, body_bytes(second).await);
}

#[tokio::test]
async fn clear_forces_recomputation() {
    let provider = RecordingProvider::new(&[("a.js", "A")]);
    let middleware =
        Middleware::with_targets(vec![Target::new("/a.js").files(["a.js"]).cache(true)])
            .with_provider(Arc::clone(&provider) as Arc<dyn FileProvider>);

    middleware.dispatch(get("/a.js")).await;
    middleware.dispatch(get("/a.js")).await;
    assert_eq!(provider.call_count(), 1);

    // The FromUrl cache key is the stringified pattern
    middleware.clear("/a.js");
    middleware.dispatch(get("/a.js")).await;
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn custom_cache_key_is_used_verbatim() {
    let provider = RecordingProvider::new(&[("a.js", "A")]);
    let middleware = Middleware::with_targets(vec![Target::new("/a.js")
        .files(["a.js"])
        .cache_key("bundle")])
    .with_provider(Arc::clone(&provider) as Arc<dyn FileProvider>);

    middleware.dispatch(get("/a.js")).await;
    middleware.dispatch(get("/a.js")).await;
    assert_eq!(provider.call_count(), 1);

    // Clearing the pattern string must not touch the custom key
    middleware.clear("/a.js");
    middleware.dispatch(get("/a.js")).await;
    assert_eq!(provider.call_count(), 1);

    middleware.clear("bundle");
    middleware.dispatch(get("/a.js")).await;
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn pipeline_transforms_content() {
    let provider = RecordingProvider::new(&[("greeting.txt", "hello")]);
    let upper = map_contents(|contents| {
        Bytes::from(contents.iter().map(u8::to_ascii_uppercase).collect::<Vec<_>>())
    });
    let middleware = Middleware::with_targets(vec![Target::new("/greeting.txt")
        .files(["greeting.txt"])
        .pipeline(move |stream, ctx| upper(stream, ctx))])
    .with_provider(provider);

    let resp = middleware
        .dispatch(get("/greeting.txt"))
        .await
        .into_response()
        .unwrap();
    assert_eq!(body_bytes(resp).await, Bytes::from_static(b"HELLO"));
}

#[tokio::test]
async fn legacy_stages_apply_in_declaration_order() {
    let provider = RecordingProvider::new(&[("a.txt", "x")]);
    let middleware = Middleware::with_targets(vec![Target::new("/a.txt")
        .files(["a.txt"])
        .stage(|stream| {
            Box::pin(stream.map(|unit| FileUnit {
                contents: append(&unit.contents, b"1"),
                ..unit
            }))
        })
        .stage(|stream| {
            Box::pin(stream.map(|unit| FileUnit {
                contents: append(&unit.contents, b"2"),
                ..unit
            }))
        })])
    .with_provider(provider);

    let resp = middleware
        .dispatch(get("/a.txt"))
        .await
        .into_response()
        .unwrap();
    assert_eq!(body_bytes(resp).await, Bytes::from_static(b"x12"));
}

#[tokio::test]
async fn stage_dropping_every_unit_forwards() {
    let provider = RecordingProvider::new(&[("a.txt", "x")]);
    let middleware = Middleware::with_targets(vec![Target::new("/a.txt")
        .files(["a.txt"])
        .stage(|stream| Box::pin(stream.filter(|_| async { false })))])
    .with_provider(provider);

    let outcome = middleware.dispatch(get("/a.txt")).await;
    assert!(outcome.is_forward());
}

#[tokio::test]
async fn regex_target_matches_many_paths() {
    let provider = RecordingProvider::new(&[("js/app.js", "app"), ("js/lib.js", "lib")]);
    let middleware = Middleware::with_targets(vec![Target::new(
        regex::Regex::new(r"^/js/.*\.js$").unwrap(),
    )])
    .with_provider(provider);

    let resp = middleware
        .dispatch(get("/js/app.js"))
        .await
        .into_response()
        .unwrap();
    assert_eq!(body_bytes(resp).await, Bytes::from_static(b"app"));

    let resp = middleware
        .dispatch(get("/js/lib.js"))
        .await
        .into_response()
        .unwrap();
    assert_eq!(body_bytes(resp).await, Bytes::from_static(b"lib"));
}

fn append(contents: &Bytes, suffix: &[u8]) -> Bytes {
    let mut out = BytesMut::from(&contents[..]);
    out.extend_from_slice(suffix);
    out.freeze()
}
