use std::time::Duration;

use eyre::WrapErr;
use http::HeaderMap;
use once_cell::sync::Lazy;
use url::Url;

use crate::internationalization::TranslationFile;

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    let mut headers = HeaderMap::new();
    headers.insert(
        "user-agent",
        concat!("site-localizer/", env!("CARGO_PKG_VERSION"))
            .parse()
            .expect("failed to parse header value"),
    );
    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(5))
        .build()
        .expect("failed to build HTTP client")
});

/// Fetches the translation file.
///
/// Any failure is logged and reported as `None`; the page is then served in
/// the default language.
pub async fn fetch_translations(url: &Url) -> Option<TranslationFile> {
    match try_fetch_translations(url).await {
        Ok(file) => Some(file),
        Err(error) => {
            tracing::debug!(?error, %url, "translations unavailable");
            None
        }
    }
}

async fn try_fetch_translations(url: &Url) -> eyre::Result<TranslationFile> {
    let resp = HTTP_CLIENT
        .get(url.clone())
        .send()
        .await
        .wrap_err_with(|| format!("failed to request to `{url}`"))?;
    let resp_status = resp.status();
    if !resp_status.is_success() {
        return Err(eyre::eyre!("error response received: `{resp_status}`"));
    }
    let resp_text = resp
        .text()
        .await
        .wrap_err_with(|| format!("failed to read response from `{url}`"))?;
    serde_json::from_str::<TranslationFile>(&resp_text)
        .wrap_err_with(|| format!("failed to parse response `{resp_text}`"))
}
