mod extract;
mod site;

use std::{path::PathBuf, sync::Arc};

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing, Router,
};
use axum_extra::{headers, TypedHeader};
use url::Url;

use crate::{
    api::translations::fetch_translations,
    document::PageTree,
    internationalization::DetectedLanguage,
    localize::{LocalizedPage, PageLocation},
};

use self::extract::Language;

/// What every page view needs to know about the site it belongs to.
#[derive(Debug)]
pub struct SiteState {
    pub site_root: PathBuf,
    /// Origin of absolute URLs, without a trailing slash.
    pub origin: String,
    pub translations_url: Url,
}

impl SiteState {
    pub fn new(site_root: PathBuf, public_url: &Url, translations_url: Url) -> Self {
        Self {
            site_root,
            origin: public_url.as_str().trim_end_matches('/').to_string(),
            translations_url,
        }
    }
}

pub fn create_router(state: Arc<SiteState>) -> Router {
    Router::new()
        .route("/healthz", routing::get(get_healthz))
        .route("/", routing::get(get_page))
        .route("/{*path}", routing::get(get_page))
        .with_state(state)
}

async fn get_healthz() -> &'static str {
    "ok"
}

async fn get_page(
    State(state): State<Arc<SiteState>>,
    Language(language): Language,
    uri: Uri,
) -> Response {
    let request_path = uri.path();
    if let Some(file) = site::find(&state.site_root, request_path).await {
        return serve_file(&state, &language, request_path, &file, StatusCode::OK).await;
    }

    tracing::debug!(request_path, "page not found");
    let not_found = state.site_root.join(site::NOT_FOUND_FILE);
    if tokio::fs::metadata(&not_found)
        .await
        .is_ok_and(|metadata| metadata.is_file())
    {
        serve_file(&state, &language, request_path, &not_found, StatusCode::NOT_FOUND).await
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn serve_file(
    state: &SiteState,
    language: &DetectedLanguage,
    request_path: &str,
    file: &std::path::Path,
    status: StatusCode,
) -> Response {
    let bytes = match tokio::fs::read(file).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!(?error, path = %file.display(), "failed to read site file");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if !site::is_html(file) {
        return (
            status,
            TypedHeader(headers::ContentType::from(site::content_type(file))),
            bytes,
        )
            .into_response();
    }

    let html = String::from_utf8_lossy(&bytes);
    let body = render_page(state, language, request_path, &html).await;
    (
        status,
        TypedHeader(headers::ContentType::from(mime::TEXT_HTML_UTF_8)),
        body,
    )
        .into_response()
}

/// Localizes one page view. Translations are only fetched for languages
/// other than the default; every failure leaves the page in the default
/// language.
async fn render_page(
    state: &SiteState,
    language: &DetectedLanguage,
    request_path: &str,
    html: &str,
) -> String {
    let location = PageLocation {
        origin: &state.origin,
        path: request_path,
    };
    let mut page = LocalizedPage::prepare(PageTree::parse(html), language, location);

    if !language.is_default() {
        if let Some(file) = fetch_translations(&state.translations_url).await {
            page.translate(&file, language);
        }
    }
    tracing::debug!(
        request_path,
        language = language.code(),
        translated = page.context().dictionary().is_some(),
        "rendered page"
    );

    page.finish().to_html()
}
