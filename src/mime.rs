//! MIME type detection module
//!
//! Derives the response Content-Type from the request path's extension,
//! and a character set from the MIME type.

use std::path::Path;

/// Look up the MIME type for a request path from its file extension.
///
/// # Examples
/// ```
/// use resource_pipeline::mime::lookup;
/// assert_eq!(lookup("/js/app.js"), "application/javascript");
/// assert_eq!(lookup("/index.html"), "text/html");
/// assert_eq!(lookup("/download"), "application/octet-stream");
/// ```
pub fn lookup(path: &str) -> &'static str {
    let extension = Path::new(path).extension().and_then(|e| e.to_str());
    match extension {
        // Text
        Some("html" | "htm") => "text/html",
        Some("css") => "text/css",
        Some("txt" | "md") => "text/plain",
        Some("xml") => "application/xml",

        // JavaScript/WASM
        Some("js" | "mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("wasm") => "application/wasm",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",

        // Archives
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("gz" | "gzip") => "application/gzip",
        Some("tar") => "application/x-tar",

        // Default
        _ => "application/octet-stream",
    }
}

/// Character set for a MIME type, `None` for binary types.
pub fn charset_for(mime_type: &str) -> Option<&'static str> {
    if mime_type.starts_with("text/")
        || matches!(
            mime_type,
            "application/json" | "application/javascript" | "application/xml" | "image/svg+xml"
        )
    {
        Some("UTF-8")
    } else {
        None
    }
}

/// Assemble the Content-Type header value: the MIME type alone, or
/// `mime; charset=<charset>` when a charset is present.
pub fn content_type_value(mime_type: &str, charset: Option<&str>) -> String {
    match charset {
        Some(charset) => format!("{mime_type}; charset={charset}"),
        None => mime_type.to_string(),
    }
}
