//! Turns the markers found on a page into a list of patches.
//!
//! Everything here is independent of how the page is stored: a document
//! binding reports [`PageMarkers`] for its elements and applies the
//! [`Patch`]es it gets back.

use serde_json::Value;

use crate::internationalization::{
    build_locale_path, integral_number, prefix_locale_path, DetectedLanguage, Locale,
    LocalizationContext, TranslationFile,
};

pub const SCHEMA_DESCRIPTION_KEY: &str = "index.meta.schema_description";

/// Element carrying the translatable key and its modifiers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslationMarker<H> {
    pub target: H,
    /// `data-i18n`
    pub key: String,
    /// `data-i18n-attr`
    pub attribute: Option<String>,
    /// `data-i18n-html`
    pub allow_html: bool,
}

/// Element whose `href` follows the active locale (`data-localize-href`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkMarker<H> {
    pub target: H,
    pub path: String,
}

/// The `#schemaData` structured-data block and its current text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaMarker<H> {
    pub target: H,
    pub text: String,
}

/// Everything the localization pass reads from a page, in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageMarkers<H> {
    pub root: Option<H>,
    pub head: Option<H>,
    /// `data-i18n-page` on `<body>`
    pub page: Option<String>,
    pub canonical: Option<H>,
    pub og_url: Option<H>,
    pub hreflang_default: Option<H>,
    pub hreflang_alternate: Option<H>,
    pub links: Vec<LinkMarker<H>>,
    pub translations: Vec<TranslationMarker<H>>,
    pub schema: Option<SchemaMarker<H>>,
}

impl<H> Default for PageMarkers<H> {
    fn default() -> Self {
        Self {
            root: None,
            head: None,
            page: None,
            canonical: None,
            og_url: None,
            hreflang_default: None,
            hreflang_alternate: None,
            links: Vec::new(),
            translations: Vec::new(),
            schema: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Patch<H> {
    SetAttribute { target: H, name: String, value: String },
    SetText { target: H, text: String },
    /// The markup is trusted and inserted as-is.
    SetInnerHtml { target: H, html: String },
    AppendScript { target: H, source: String },
}

/// A page that can report its markers and take patches.
pub trait PageDocument {
    type Handle: Copy;

    fn markers(&self) -> PageMarkers<Self::Handle>;

    fn apply(&mut self, patch: Patch<Self::Handle>);
}

/// Where a page view is published: the site origin and the request path.
#[derive(Clone, Copy, Debug)]
pub struct PageLocation<'a> {
    pub origin: &'a str,
    pub path: &'a str,
}

impl PageLocation<'_> {
    fn absolute_url(&self, locale: Locale) -> String {
        format!(
            "{}{}",
            self.origin.trim_end_matches('/'),
            build_locale_path(self.path, locale)
        )
    }
}

fn set_attribute<H>(target: H, name: &str, value: String) -> Patch<H> {
    Patch::SetAttribute {
        target,
        name: name.to_string(),
        value,
    }
}

/// Sets `<html lang>` to the detected code.
pub fn language_patch<H: Copy>(
    markers: &PageMarkers<H>,
    language: &DetectedLanguage,
) -> Option<Patch<H>> {
    markers
        .root
        .map(|root| set_attribute(root, "lang", language.code().to_string()))
}

/// Points the canonical, `og:url` and both `hreflang` alternates at the
/// absolute URLs of this page.
pub fn metadata_patches<H: Copy>(
    markers: &PageMarkers<H>,
    location: PageLocation<'_>,
    locale: Locale,
) -> Vec<Patch<H>> {
    let current = location.absolute_url(locale);
    let mut patches = Vec::new();
    if let Some(canonical) = markers.canonical {
        patches.push(set_attribute(canonical, "href", current.clone()));
    }
    if let Some(og_url) = markers.og_url {
        patches.push(set_attribute(og_url, "content", current));
    }
    if let Some(link) = markers.hreflang_default {
        patches.push(set_attribute(link, "href", location.absolute_url(Locale::Default)));
    }
    if let Some(link) = markers.hreflang_alternate {
        patches.push(set_attribute(link, "href", location.absolute_url(Locale::Alternate)));
    }
    patches
}

/// Rewrites `href` of every `data-localize-href` element for `locale`.
pub fn link_patches<H: Copy>(markers: &PageMarkers<H>, locale: Locale) -> Vec<Patch<H>> {
    markers
        .links
        .iter()
        .filter(|link| !link.path.is_empty())
        .map(|link| set_attribute(link.target, "href", prefix_locale_path(&link.path, locale)))
        .collect()
}

/// Fills every `data-i18n` element that has a translation.
///
/// An explicit target attribute wins over HTML injection, which wins over
/// plain text. An element naming an attribute that cannot exist is skipped.
pub fn translation_patches<H: Copy>(
    markers: &PageMarkers<H>,
    context: &LocalizationContext,
) -> Vec<Patch<H>> {
    markers
        .translations
        .iter()
        .filter(|marker| !marker.key.is_empty())
        .filter_map(|marker| {
            let value = context.t(&marker.key, None)?.to_string();
            let patch = match marker.attribute.as_deref().filter(|name| !name.is_empty()) {
                Some(name) if !is_attribute_name(name) => {
                    tracing::debug!(name, key = %marker.key, "skipping invalid attribute name");
                    return None;
                }
                Some(name) => set_attribute(marker.target, name, value),
                None if marker.allow_html => Patch::SetInnerHtml {
                    target: marker.target,
                    html: value,
                },
                None => Patch::SetText {
                    target: marker.target,
                    text: value,
                },
            };
            Some(patch)
        })
        .collect()
}

fn is_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name.chars().any(|c| {
            c.is_whitespace()
                || c.is_control()
                || matches!(c, '"' | '\'' | '<' | '>' | '/' | '=')
        })
}

/// Replaces `description` in the structured-data block.
///
/// A block that does not parse is left alone. The rewritten JSON is escaped
/// so it cannot close its `<script>`.
pub fn schema_patch<H: Copy>(
    markers: &PageMarkers<H>,
    context: &LocalizationContext,
) -> Option<Patch<H>> {
    let schema = markers.schema.as_ref()?;
    let description = context.get(SCHEMA_DESCRIPTION_KEY)?;

    let mut json = match serde_json::from_str::<Value>(&schema.text) {
        Ok(json) => json,
        Err(error) => {
            tracing::debug!(?error, "ignoring malformed structured data");
            return None;
        }
    };
    match &mut json {
        Value::Object(fields) => {
            fields.insert(
                "description".to_string(),
                Value::String(description.to_string()),
            );
        }
        Value::Array(_) => {}
        _ => return None,
    }
    normalize_numbers(&mut json);
    let text = serde_json::to_string_pretty(&json).ok()?;
    Some(Patch::SetText {
        target: schema.target,
        text: escape_script(&text),
    })
}

fn normalize_numbers(value: &mut Value) {
    match value {
        Value::Number(number) => {
            if let Some(integer) = integral_number(number) {
                *number = integer;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_numbers),
        Value::Object(fields) => fields.values_mut().for_each(normalize_numbers),
        _ => {}
    }
}

/// Script publishing the dictionary and lookup at `window.__i18n` and
/// `window.t` for scripts that read them.
pub fn compat_script(context: &LocalizationContext) -> String {
    match context.dictionary() {
        Some(dictionary) => {
            let json = serde_json::to_string(dictionary).unwrap_or_else(|_| "{}".to_string());
            format!(
                "window.__i18n = {};\nwindow.t = function (key, fallback) {{ return window.__i18n[key] || fallback || null; }};",
                escape_script(&json)
            )
        }
        None => "window.t = window.t || function (key, fallback) { return fallback || null; };"
            .to_string(),
    }
}

fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/")
        .replace("<!--", "\\u003c!--")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

/// One page view going through localization.
///
/// [`LocalizedPage::prepare`] does all the work that needs no translations;
/// [`LocalizedPage::translate`] applies the fetched dictionary, if any.
pub struct LocalizedPage<D: PageDocument> {
    document: D,
    markers: PageMarkers<D::Handle>,
    context: LocalizationContext,
}

impl<D: PageDocument> LocalizedPage<D> {
    pub fn prepare(
        mut document: D,
        language: &DetectedLanguage,
        location: PageLocation<'_>,
    ) -> Self {
        let markers = document.markers();
        let locale = language.locale();

        let patches = language_patch(&markers, language)
            .into_iter()
            .chain(metadata_patches(&markers, location, locale))
            .chain(link_patches(&markers, locale));
        for patch in patches {
            document.apply(patch);
        }

        Self {
            document,
            markers,
            context: LocalizationContext::default(),
        }
    }

    /// Section of the translation file this page draws from.
    pub fn page(&self) -> Option<&str> {
        self.markers.page.as_deref()
    }

    /// Merges `file` for `language` and applies the result.
    ///
    /// Does nothing when the file has no entry for the language.
    pub fn translate(&mut self, file: &TranslationFile, language: &DetectedLanguage) {
        let Some(dictionary) = file.merge(language.code(), self.page()) else {
            tracing::debug!(language = language.code(), "no translations for language");
            return;
        };
        self.context = LocalizationContext::new(Some(dictionary));

        let patches = translation_patches(&self.markers, &self.context)
            .into_iter()
            .chain(schema_patch(&self.markers, &self.context));
        for patch in patches {
            self.document.apply(patch);
        }
    }

    pub fn context(&self) -> &LocalizationContext {
        &self.context
    }

    /// Appends the compatibility script and hands back the document.
    pub fn finish(mut self) -> D {
        if let Some(target) = self.markers.head.or(self.markers.root) {
            self.document.apply(Patch::AppendScript {
                target,
                source: compat_script(&self.context),
            });
        }
        self.document
    }
}
