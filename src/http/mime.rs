//! Content-type lookup by file extension.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Content type used when the extension is missing or unknown.
pub const DEFAULT_MIME_TYPE: &str = "text/plain";

/// Extension (with leading dot) to content type. Built once, never mutated.
static MIME_TABLE: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (".css", "text/css"),
        (".gif", "image/gif"),
        (".htm", "text/html"),
        (".html", "text/html"),
        (".jpeg", "image/jpeg"),
        (".jpg", "image/jpeg"),
        (".ico", "image/x-icon"),
        (".js", "application/javascript"),
        (".pdf", "application/pdf"),
        (".mp4", "video/mp4"),
        (".png", "image/png"),
        (".svg", "image/svg+xml"),
        (".xml", "text/xml"),
    ])
});

/// Resolves the content type of `path` from the text after its last `.`.
///
/// The lookup is case-sensitive. Paths without a dot, or with an extension
/// not in the table, get [`DEFAULT_MIME_TYPE`].
///
/// ```
/// # use tinyserve::http::mime::resolve;
/// assert_eq!(resolve("a.pdf"), "application/pdf");
/// assert_eq!(resolve("a.unknownext"), "text/plain");
/// assert_eq!(resolve("noext"), "text/plain");
/// ```
pub fn resolve(path: &str) -> &'static str {
    path.rfind('.')
        .and_then(|idx| MIME_TABLE.get(&path[idx..]))
        .copied()
        .unwrap_or(DEFAULT_MIME_TYPE)
}
