use std::path::PathBuf;

use eyre::Context;
use serde::Deserialize;
use url::Url;

fn default_public_url() -> Url {
    Url::parse("https://inkledger.app").expect("failed to parse default public URL")
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_site_root() -> PathBuf {
    PathBuf::from("public")
}

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Origin used for absolute canonical and alternate URLs.
    #[serde(default = "default_public_url")]
    pub public_url: Url,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_site_root")]
    pub site_root: PathBuf,

    pub translations_url: Option<Url>,
}

impl Config {
    pub fn try_from_env() -> eyre::Result<Self> {
        envy::from_env().context("failed to read config from environment variables")
    }

    /// Where `/i18n.json` is fetched from, defaulting to the public site.
    pub fn translations_url(&self) -> eyre::Result<Url> {
        match &self.translations_url {
            Some(url) => Ok(url.clone()),
            None => self
                .public_url
                .join("/i18n.json")
                .context("failed to generate translations URL"),
        }
    }
}
