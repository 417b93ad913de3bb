mod dictionary;
mod path;

pub use self::{
    dictionary::{integral_number, Dictionary, LocalizationContext, TranslationFile},
    path::{build_locale_path, prefix_locale_path, strip_locale_prefix},
};

pub const DEFAULT_LANGUAGE: &str = "en";
pub const ALTERNATE_LANGUAGE: &str = "nl";

const LANGUAGE_QUERY_KEY: &str = "lang";

/// One of the two locales the site is published in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Locale {
    Default,
    Alternate,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Self::Default => DEFAULT_LANGUAGE,
            Self::Alternate => ALTERNATE_LANGUAGE,
        }
    }
}

/// Language detected for a single page view.
///
/// The raw code is kept as given: a `?lang=` value outside the known pair is
/// written to the document as-is and only behaves like the default locale
/// when links and metadata are rewritten.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetectedLanguage {
    code: String,
}

impl DetectedLanguage {
    /// Detects the language from a request path and its raw query string.
    ///
    /// A non-empty `lang` query parameter wins (lowercased), then the `/nl`
    /// path prefix, then the default language.
    pub fn detect(path: &str, query: Option<&str>) -> Self {
        let param = query.and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == LANGUAGE_QUERY_KEY)
                .map(|(_, value)| value.into_owned())
        });
        if let Some(param) = param.filter(|param| !param.is_empty()) {
            return Self {
                code: param.to_lowercase(),
            };
        }

        let path = if path.is_empty() { "/" } else { path };
        let code = if path == path::ALTERNATE_ROOT || path.starts_with(path::ALTERNATE_PREFIX) {
            ALTERNATE_LANGUAGE
        } else {
            DEFAULT_LANGUAGE
        };
        Self {
            code: code.to_string(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn locale(&self) -> Locale {
        if self.code == ALTERNATE_LANGUAGE {
            Locale::Alternate
        } else {
            Locale::Default
        }
    }

    /// Whether translations are skipped entirely for this page view.
    pub fn is_default(&self) -> bool {
        self.code == DEFAULT_LANGUAGE
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("/", Some("lang=NL"), "nl", Locale::Alternate)]
    #[case("/pricing", Some("lang=nl"), "nl", Locale::Alternate)]
    #[case("/nl/pricing", Some("lang=en"), "en", Locale::Default)]
    #[case("/nl/foo", None, "nl", Locale::Alternate)]
    #[case("/nl", None, "nl", Locale::Alternate)]
    #[case("/nl/", None, "nl", Locale::Alternate)]
    #[case("/other", None, "en", Locale::Default)]
    #[case("/nlx", None, "en", Locale::Default)]
    #[case("", None, "en", Locale::Default)]
    fn detects_language(
        #[case] path: &str,
        #[case] query: Option<&str>,
        #[case] code: &str,
        #[case] locale: Locale,
    ) {
        let language = DetectedLanguage::detect(path, query);
        assert_eq!(language.code(), code);
        assert_eq!(language.locale(), locale);
    }

    #[test]
    fn empty_query_value_falls_back_to_path() {
        let language = DetectedLanguage::detect("/nl/about", Some("lang="));
        assert_eq!(language.code(), "nl");
    }

    #[test]
    fn first_query_value_wins() {
        let language = DetectedLanguage::detect("/", Some("utm=x&lang=NL&lang=en"));
        assert_eq!(language.code(), "nl");
    }

    #[test]
    fn unknown_query_value_is_kept_but_acts_as_default() {
        let language = DetectedLanguage::detect("/nl/about", Some("lang=FR"));
        assert_eq!(language.code(), "fr");
        assert_eq!(language.locale(), Locale::Default);
        assert!(!language.is_default());
    }
}
