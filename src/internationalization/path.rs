use super::Locale;

pub(super) const ALTERNATE_ROOT: &str = "/nl";
pub(super) const ALTERNATE_PREFIX: &str = "/nl/";

/// Removes the alternate locale prefix from a site path.
pub fn strip_locale_prefix(path: &str) -> &str {
    if path.is_empty() || path == ALTERNATE_ROOT || path == ALTERNATE_PREFIX {
        return "/";
    }
    match path.strip_prefix(ALTERNATE_ROOT) {
        Some(rest) if path.starts_with(ALTERNATE_PREFIX) => rest,
        _ => path,
    }
}

/// Builds the path of `path` as published in `locale`.
pub fn build_locale_path(path: &str, locale: Locale) -> String {
    let clean = strip_locale_prefix(path);
    match locale {
        Locale::Default => clean.to_string(),
        Locale::Alternate => prefix_locale_path(clean, locale),
    }
}

/// Prefixes an already clean link target for `locale` without stripping it
/// first, so author-supplied targets are taken literally.
pub fn prefix_locale_path(target: &str, locale: Locale) -> String {
    match locale {
        Locale::Default => target.to_string(),
        Locale::Alternate if target == "/" => ALTERNATE_ROOT.to_string(),
        Locale::Alternate => format!("{ALTERNATE_ROOT}{target}"),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("", "/")]
    #[case("/", "/")]
    #[case("/nl", "/")]
    #[case("/nl/", "/")]
    #[case("/nl/pricing", "/pricing")]
    #[case("/nl/docs/start/", "/docs/start/")]
    #[case("/pricing", "/pricing")]
    #[case("/nlx/pricing", "/nlx/pricing")]
    #[case("/en/pricing", "/en/pricing")]
    fn strips_prefix(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(strip_locale_prefix(path), expected);
    }

    #[rstest]
    #[case("/", "/nl", "/")]
    #[case("", "/nl", "/")]
    #[case("/nl", "/nl", "/")]
    #[case("/pricing", "/nl/pricing", "/pricing")]
    #[case("/nl/pricing", "/nl/pricing", "/pricing")]
    fn builds_locale_paths(#[case] path: &str, #[case] alternate: &str, #[case] default: &str) {
        assert_eq!(build_locale_path(path, Locale::Alternate), alternate);
        assert_eq!(build_locale_path(path, Locale::Default), default);
    }

    #[rstest]
    #[case("/")]
    #[case("/pricing")]
    #[case("/nl/pricing")]
    #[case("/docs/nl/")]
    #[case("/nlx")]
    fn alternate_round_trip_keeps_clean_path(#[case] path: &str) {
        let built = build_locale_path(path, Locale::Alternate);
        assert_eq!(strip_locale_prefix(&built), strip_locale_prefix(path));
    }

    #[rstest]
    #[case("/", Locale::Alternate, "/nl")]
    #[case("/about", Locale::Alternate, "/nl/about")]
    #[case("/about", Locale::Default, "/about")]
    #[case("/", Locale::Default, "/")]
    fn prefixes_link_targets(#[case] target: &str, #[case] locale: Locale, #[case] expected: &str) {
        assert_eq!(prefix_locale_path(target, locale), expected);
    }
}
