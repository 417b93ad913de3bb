use serde::Deserialize;
use serde_json::{Map, Number, Value};

const COMMON_SECTION: &str = "common";

/// Translations applied to one page view, keyed by translation key, in the
/// order keys were first seen. Every value is a [`Value::String`].
///
/// Falsy source values (`""`, `0`, `false`, `null`) are stored as empty
/// strings: they still override earlier sections but never get applied.
pub type Dictionary = Map<String, Value>;

/// Contents of `/i18n.json`: language code to sections, each section a flat
/// key to string mapping.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct TranslationFile(Map<String, Value>);

impl TranslationFile {
    /// Merges the `common` section of `language` with the section named after
    /// `page`, page entries winning on collision.
    ///
    /// Returns `None` when the file has no usable entry for `language`.
    pub fn merge(&self, language: &str, page: Option<&str>) -> Option<Dictionary> {
        let entry = self.0.get(language).filter(|entry| is_truthy(entry))?;

        let mut dictionary = Dictionary::new();
        let Value::Object(sections) = entry else {
            return Some(dictionary);
        };
        overlay(&mut dictionary, sections.get(COMMON_SECTION));
        if let Some(page) = page.filter(|page| !page.is_empty()) {
            overlay(&mut dictionary, sections.get(page));
        }
        Some(dictionary)
    }
}

fn overlay(dictionary: &mut Dictionary, section: Option<&Value>) {
    let Some(Value::Object(entries)) = section else {
        return;
    };
    for (key, value) in entries {
        if let Some(text) = translation_text(value) {
            dictionary.insert(key.clone(), Value::String(text));
        }
    }
}

fn translation_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(_) | Value::Bool(_) | Value::Null if !is_truthy(value) => Some(String::new()),
        Value::Number(number) => Some(
            integral_number(number)
                .unwrap_or_else(|| number.clone())
                .to_string(),
        ),
        Value::Bool(_) => Some("true".to_string()),
        _ => None,
    }
}

/// Integer form of a float with no fractional part, so `7.0` prints as `7`
/// the way JavaScript prints numbers.
pub fn integral_number(number: &Number) -> Option<Number> {
    if number.is_i64() || number.is_u64() {
        return None;
    }
    let float = number.as_f64()?;
    let exact = float.fract() == 0.0 && float.abs() < 2f64.powi(53);
    exact.then(|| Number::from(float as i64))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(value) => *value,
        Value::Number(number) => number.as_f64().is_some_and(|number| number != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Localization state of one page view: the merged dictionary, if any, and
/// the lookup used by everything that needs translated strings.
#[derive(Clone, Debug, Default)]
pub struct LocalizationContext {
    dictionary: Option<Dictionary>,
}

impl LocalizationContext {
    pub fn new(dictionary: Option<Dictionary>) -> Self {
        Self { dictionary }
    }

    pub fn dictionary(&self) -> Option<&Dictionary> {
        self.dictionary.as_ref()
    }

    /// Returns the translation for `key` unless it is missing or empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.dictionary
            .as_ref()?
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Looks `key` up, falling back to `fallback`, then to nothing.
    pub fn t<'a>(&'a self, key: &str, fallback: Option<&'a str>) -> Option<&'a str> {
        self.get(key)
            .or_else(|| fallback.filter(|fallback| !fallback.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn file(value: Value) -> TranslationFile {
        serde_json::from_value(value).unwrap()
    }

    fn dictionary(entries: &[(&str, &str)]) -> Dictionary {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), json!(value)))
            .collect()
    }

    #[test]
    fn page_section_overrides_common() {
        let file = file(json!({
            "nl": {
                "common": { "a": "1", "b": "2" },
                "pricing": { "b": "3", "c": "4" }
            }
        }));

        let merged = file.merge("nl", Some("pricing")).unwrap();

        assert_eq!(merged, dictionary(&[("a", "1"), ("b", "3"), ("c", "4")]));
    }

    #[test]
    fn keys_keep_first_seen_order() {
        let file = file(json!({
            "nl": {
                "common": { "zeta": "1", "alpha": "2", "mid": "3" },
                "pricing": { "alpha": "4", "beta": "5" }
            }
        }));

        let merged = file.merge("nl", Some("pricing")).unwrap();

        let keys: Vec<_> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid", "beta"]);
        assert_eq!(merged["alpha"], "4");
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("unknown"))]
    fn without_page_section_only_common_applies(#[case] page: Option<&str>) {
        let file = file(json!({
            "nl": { "common": { "a": "1" }, "pricing": { "a": "2" } }
        }));

        assert_eq!(file.merge("nl", page).unwrap(), dictionary(&[("a", "1")]));
    }

    #[rstest]
    #[case(json!({ "en": { "common": { "a": "1" } } }))]
    #[case(json!({ "nl": null }))]
    #[case(json!({ "nl": "" }))]
    #[case(json!({ "nl": false }))]
    fn missing_language_entry_yields_nothing(#[case] value: Value) {
        assert!(file(value).merge("nl", None).is_none());
    }

    #[test]
    fn language_entry_without_sections_yields_empty_dictionary() {
        let file = file(json!({ "nl": {} }));

        assert_eq!(file.merge("nl", Some("index")), Some(Dictionary::new()));
    }

    #[test]
    fn non_object_top_level_is_rejected() {
        assert!(serde_json::from_value::<TranslationFile>(json!(null)).is_err());
        assert!(serde_json::from_value::<TranslationFile>(json!(["nl"])).is_err());
    }

    #[test]
    fn scalar_values_follow_truthiness() {
        let file = file(json!({
            "nl": {
                "common": { "a": "x", "b": "x", "c": "x", "d": "x", "e": "x" },
                "page": { "a": "", "b": 0, "c": null, "d": 7, "e": true, "f": ["ignored"] }
            }
        }));

        let merged = file.merge("nl", Some("page")).unwrap();

        assert_eq!(
            merged,
            dictionary(&[("a", ""), ("b", ""), ("c", ""), ("d", "7"), ("e", "true")])
        );
    }

    #[test]
    fn whole_floats_print_without_fraction() {
        let file: TranslationFile =
            serde_json::from_str(r#"{ "nl": { "common": { "n": 7.0, "m": 2.5, "z": 0.0, "big": 1e300 } } }"#)
                .unwrap();

        let merged = file.merge("nl", None).unwrap();

        assert_eq!(merged["n"], "7");
        assert_eq!(merged["m"], "2.5");
        assert_eq!(merged["z"], "");
        assert_eq!(merged["big"], "1e300");
    }

    #[rstest]
    #[case("7.0", Some(7))]
    #[case("-3.0", Some(-3))]
    #[case("7", None)]
    #[case("7.5", None)]
    fn integral_floats_become_integers(#[case] text: &str, #[case] expected: Option<i64>) {
        let number: Number = serde_json::from_str(text).unwrap();

        assert_eq!(integral_number(&number), expected.map(Number::from));
    }

    #[test]
    fn lookup_prefers_value_then_fallback() {
        let context = LocalizationContext::new(Some(dictionary(&[("hello", "Hallo"), ("empty", "")])));

        assert_eq!(context.t("hello", Some("Hello")), Some("Hallo"));
        assert_eq!(context.t("empty", Some("Empty")), Some("Empty"));
        assert_eq!(context.t("missing", Some("Missing")), Some("Missing"));
        assert_eq!(context.t("missing", Some("")), None);
        assert_eq!(context.t("missing", None), None);
    }

    #[test]
    fn untranslated_context_returns_fallback_or_nothing() {
        let context = LocalizationContext::default();

        assert_eq!(context.t("hello", Some("Hello")), Some("Hello"));
        assert_eq!(context.t("hello", None), None);
        assert!(context.dictionary().is_none());
    }
}
