//! Logger module
//!
//! Plain stdout/stderr logging helpers with local timestamps. Warnings and
//! errors go to stderr, everything else to stdout.

use chrono::Local;
use hyper::{Method, Uri};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn log_server_start(addr: &SocketAddr, root: &Path, target_count: usize) {
    println!("======================================");
    println!("Resource pipeline server started");
    println!("Listening on: http://{addr}");
    println!("Root directory: {}", root.display());
    println!("Configured targets: {target_count}");
    println!("======================================\n");
}

pub fn log_request(method: &Method, uri: &Uri) {
    println!("[{}] [Request] {method} {uri}", timestamp());
}

pub fn log_response(status: u16, size: usize) {
    println!("[{}] [Response] {status} ({size} bytes)", timestamp());
}

pub fn log_cache_hit(key: &str) {
    println!("[{}] [Cache] Hit for key \"{key}\"", timestamp());
}

/// A target matched the request but its file set resolved to nothing.
pub fn log_empty_target(pattern: &str, files: &[PathBuf]) {
    let attempted: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
    eprintln!(
        "[{}] [WARN] Matched URL \"{pattern}\" but found no files matching [{}]",
        timestamp(),
        attempted.join(", ")
    );
}

pub fn log_deprecated_stages() {
    log_warning("Per-stage transform configuration is deprecated, use Target::pipeline");
}

pub fn log_warning(message: &str) {
    eprintln!("[{}] [WARN] {message}", timestamp());
}

pub fn log_error(message: &str) {
    eprintln!("[{}] [ERROR] {message}", timestamp());
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    eprintln!("[{}] [ERROR] Failed to serve connection: {err:?}", timestamp());
}
