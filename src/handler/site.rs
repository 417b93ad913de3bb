use std::path::{Path, PathBuf};

use mime::Mime;
use percent_encoding::percent_decode_str;

use crate::internationalization::strip_locale_prefix;

const INDEX_FILE: &str = "index.html";
pub const NOT_FOUND_FILE: &str = "404.html";

/// Files under the site root that may answer `request_path`, most specific
/// first. Both locales share the same files.
///
/// The path is percent-decoded first. Returns `None` for paths that are not
/// UTF-8 once decoded, try to leave the site root or reach hidden files.
pub fn candidates(request_path: &str) -> Option<Vec<PathBuf>> {
    let decoded = percent_decode_str(request_path).decode_utf8().ok()?;
    let path = strip_locale_prefix(&decoded);
    let mut relative = PathBuf::new();
    for segment in path.split('/').filter(|segment| !segment.is_empty()) {
        if segment.starts_with('.') || segment.contains('\\') {
            return None;
        }
        relative.push(segment);
    }

    if path.ends_with('/') {
        return Some(vec![relative.join(INDEX_FILE)]);
    }
    if relative.extension().is_some() {
        return Some(vec![relative]);
    }
    Some(vec![
        relative.with_extension("html"),
        relative.join(INDEX_FILE),
        relative,
    ])
}

/// First candidate of `request_path` that exists as a file under `root`.
pub async fn find(root: &Path, request_path: &str) -> Option<PathBuf> {
    for candidate in candidates(request_path)? {
        let path = root.join(candidate);
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => return Some(path),
            _ => continue,
        }
    }
    None
}

pub fn is_html(path: &Path) -> bool {
    content_type(path) == mime::TEXT_HTML_UTF_8
}

pub fn content_type(path: &Path) -> Mime {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("html" | "htm") => mime::TEXT_HTML_UTF_8,
        Some("css") => mime::TEXT_CSS_UTF_8,
        Some("js" | "mjs") => mime::APPLICATION_JAVASCRIPT_UTF_8,
        Some("json") => mime::APPLICATION_JSON,
        Some("txt") => mime::TEXT_PLAIN_UTF_8,
        Some("xml") => mime::TEXT_XML,
        Some("svg") => mime::IMAGE_SVG,
        Some("png") => mime::IMAGE_PNG,
        Some("jpg" | "jpeg") => mime::IMAGE_JPEG,
        Some("gif") => mime::IMAGE_GIF,
        Some("woff") => mime::FONT_WOFF,
        Some("woff2") => mime::FONT_WOFF2,
        Some("webp") => "image/webp".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        Some("ico") => "image/x-icon".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        Some("webmanifest") => "application/manifest+json"
            .parse()
            .unwrap_or(mime::APPLICATION_JSON),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn paths(candidates: &[&str]) -> Option<Vec<PathBuf>> {
        Some(candidates.iter().map(PathBuf::from).collect())
    }

    #[rstest]
    #[case("/", paths(&["index.html"]))]
    #[case("/nl", paths(&["index.html"]))]
    #[case("/nl/", paths(&["index.html"]))]
    #[case("/docs/", paths(&["docs/index.html"]))]
    #[case("/nl/docs/", paths(&["docs/index.html"]))]
    #[case("/style.css", paths(&["style.css"]))]
    #[case("/nl/pricing", paths(&["pricing.html", "pricing/index.html", "pricing"]))]
    #[case("/pricing", paths(&["pricing.html", "pricing/index.html", "pricing"]))]
    #[case("/../secret", None)]
    #[case("/.git/config", None)]
    #[case("/a\\..\\b", None)]
    #[case("/caf%C3%A9", paths(&["café.html", "café/index.html", "café"]))]
    #[case("/nl/docs%2Fintro.html", paths(&["docs/intro.html"]))]
    #[case("/%2E%2E/secret", None)]
    #[case("/%FF", None)]
    fn maps_request_paths(#[case] request_path: &str, #[case] expected: Option<Vec<PathBuf>>) {
        assert_eq!(candidates(request_path), expected);
    }

    #[rstest]
    #[case("index.html", true)]
    #[case("about.HTM", true)]
    #[case("i18n.json", false)]
    fn recognizes_pages(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(is_html(Path::new(path)), expected);
    }

    #[rstest]
    #[case("a/index.html", mime::TEXT_HTML_UTF_8)]
    #[case("i18n.json", mime::APPLICATION_JSON)]
    #[case("app.JS", mime::APPLICATION_JAVASCRIPT_UTF_8)]
    #[case("CNAME", mime::APPLICATION_OCTET_STREAM)]
    fn derives_content_type(#[case] path: &str, #[case] expected: Mime) {
        assert_eq!(content_type(Path::new(path)), expected);
    }
}
