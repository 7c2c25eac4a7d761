use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

use crate::extract::static_selector;
use crate::formats::PageMetadata;

const DEFAULT_TYPE: &str = "website";
const DEFAULT_LOCALE: &str = "en_US";
const DEFAULT_FAVICON: &str = "/favicon.ico";
const DEFAULT_CHARSET: &str = "utf-8";
const DEFAULT_LANGUAGE: &str = "en";

struct MetadataSelectors {
    title: Selector,
    description: Selector,
    og_description: Selector,
    keywords: Selector,
    author: Selector,
    og_image: Selector,
    twitter_image: Selector,
    og_site_name: Selector,
    og_type: Selector,
    og_locale: Selector,
    icon: Selector,
    shortcut_icon: Selector,
    canonical: Selector,
    robots: Selector,
    viewport: Selector,
    charset: Selector,
    html: Selector,
    generator: Selector,
    theme_color: Selector,
}

static SELECTORS: LazyLock<MetadataSelectors> = LazyLock::new(|| MetadataSelectors {
    title: static_selector("title"),
    description: static_selector(r#"meta[name="description"]"#),
    og_description: static_selector(r#"meta[property="og:description"]"#),
    keywords: static_selector(r#"meta[name="keywords"]"#),
    author: static_selector(r#"meta[name="author"]"#),
    og_image: static_selector(r#"meta[property="og:image"]"#),
    twitter_image: static_selector(r#"meta[name="twitter:image"]"#),
    og_site_name: static_selector(r#"meta[property="og:site_name"]"#),
    og_type: static_selector(r#"meta[property="og:type"]"#),
    og_locale: static_selector(r#"meta[property="og:locale"]"#),
    icon: static_selector(r#"link[rel="icon"]"#),
    shortcut_icon: static_selector(r#"link[rel="shortcut icon"]"#),
    canonical: static_selector(r#"link[rel="canonical"]"#),
    robots: static_selector(r#"meta[name="robots"]"#),
    viewport: static_selector(r#"meta[name="viewport"]"#),
    charset: static_selector("meta[charset]"),
    html: static_selector("html"),
    generator: static_selector(r#"meta[name="generator"]"#),
    theme_color: static_selector(r#"meta[name="theme-color"]"#),
});

/// Reads head-level page metadata. Image and favicon references are made
/// absolute against `target_url`.
pub fn extract_page_metadata(html: &str, target_url: &Url, extracted_at: String) -> PageMetadata {
    let document = Html::parse_document(html);
    let s = &*SELECTORS;

    let title = document
        .select(&s.title)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_owned())
        .unwrap_or_default();
    let description = attr_of(&document, &s.description, "content")
        .or_else(|| attr_of(&document, &s.og_description, "content"))
        .unwrap_or_default();
    let image = attr_of(&document, &s.og_image, "content")
        .or_else(|| attr_of(&document, &s.twitter_image, "content"))
        .map(|image| absolutize(target_url, &image))
        .unwrap_or_default();
    let favicon = attr_of(&document, &s.icon, "href")
        .or_else(|| attr_of(&document, &s.shortcut_icon, "href"))
        .unwrap_or_else(|| DEFAULT_FAVICON.to_owned());

    PageMetadata {
        url: target_url.to_string(),
        title,
        description,
        keywords: attr_of(&document, &s.keywords, "content").unwrap_or_default(),
        author: attr_of(&document, &s.author, "content").unwrap_or_default(),
        image,
        site_name: attr_of(&document, &s.og_site_name, "content").unwrap_or_default(),
        page_type: attr_of(&document, &s.og_type, "content")
            .unwrap_or_else(|| DEFAULT_TYPE.to_owned()),
        locale: attr_of(&document, &s.og_locale, "content")
            .unwrap_or_else(|| DEFAULT_LOCALE.to_owned()),
        favicon: absolutize(target_url, &favicon),
        canonical: attr_of(&document, &s.canonical, "href")
            .unwrap_or_else(|| target_url.to_string()),
        robots: attr_of(&document, &s.robots, "content").unwrap_or_default(),
        viewport: attr_of(&document, &s.viewport, "content").unwrap_or_default(),
        charset: attr_of(&document, &s.charset, "charset")
            .unwrap_or_else(|| DEFAULT_CHARSET.to_owned()),
        language: attr_of(&document, &s.html, "lang")
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_owned()),
        generator: attr_of(&document, &s.generator, "content").unwrap_or_default(),
        theme: attr_of(&document, &s.theme_color, "content").unwrap_or_default(),
        extracted_at,
    }
}

/// Metadata for a response that is not HTML: defaults only.
pub fn default_page_metadata(target_url: &Url, extracted_at: String) -> PageMetadata {
    extract_page_metadata("", target_url, extracted_at)
}

/// Attribute of the first match, treating an empty value as missing.
fn attr_of(document: &Html, selector: &Selector, attr: &str) -> Option<String> {
    document
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Absolute references come back unchanged from `join`.
fn absolutize(base: &Url, reference: &str) -> String {
    base.join(reference)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| reference.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const AT: &str = "2026-01-01T00:00:00+00:00";

    fn target() -> Url {
        Url::parse("https://ex.com/blog/post").unwrap()
    }

    #[test]
    fn reads_common_tags() {
        let html = r##"<!doctype html>
<html lang="fr">
<head>
  <meta charset="iso-8859-1">
  <title> A Post </title>
  <meta name="description" content="About things">
  <meta name="keywords" content="a,b">
  <meta name="author" content="Sam">
  <meta property="og:image" content="/img/cover.png">
  <meta property="og:site_name" content="Ex Blog">
  <meta property="og:type" content="article">
  <meta property="og:locale" content="fr_FR">
  <link rel="icon" href="icons/fav.png">
  <link rel="canonical" href="https://ex.com/blog/post-canonical">
  <meta name="robots" content="index,follow">
  <meta name="viewport" content="width=device-width">
  <meta name="generator" content="Hugo">
  <meta name="theme-color" content="#112233">
</head><body></body></html>"##;
        let meta = extract_page_metadata(html, &target(), AT.to_owned());

        assert_eq!(meta.url, "https://ex.com/blog/post");
        assert_eq!(meta.title, "A Post");
        assert_eq!(meta.description, "About things");
        assert_eq!(meta.keywords, "a,b");
        assert_eq!(meta.author, "Sam");
        assert_eq!(meta.image, "https://ex.com/img/cover.png");
        assert_eq!(meta.site_name, "Ex Blog");
        assert_eq!(meta.page_type, "article");
        assert_eq!(meta.locale, "fr_FR");
        assert_eq!(meta.favicon, "https://ex.com/blog/icons/fav.png");
        assert_eq!(meta.canonical, "https://ex.com/blog/post-canonical");
        assert_eq!(meta.robots, "index,follow");
        assert_eq!(meta.viewport, "width=device-width");
        assert_eq!(meta.charset, "iso-8859-1");
        assert_eq!(meta.language, "fr");
        assert_eq!(meta.generator, "Hugo");
        assert_eq!(meta.theme, "#112233");
        assert_eq!(meta.extracted_at, AT);
    }

    #[test]
    fn falls_back_to_open_graph_and_twitter() {
        let html = r#"<html><head>
  <meta name="description" content="">
  <meta property="og:description" content="OG description">
  <meta name="twitter:image" content="https://cdn.ex.com/t.png">
  <link rel="shortcut icon" href="/s.ico">
</head></html>"#;
        let meta = extract_page_metadata(html, &target(), AT.to_owned());
        assert_eq!(meta.description, "OG description");
        assert_eq!(meta.image, "https://cdn.ex.com/t.png");
        assert_eq!(meta.favicon, "https://ex.com/s.ico");
    }

    #[test]
    fn http_prefixed_relative_paths_are_resolved() {
        let html = r#"<html><head>
  <link rel="icon" href="httpdocs/icon.png">
  <meta property="og:image" content="https://cdn.ex.com/cover.png">
</head></html>"#;
        let meta = extract_page_metadata(html, &target(), AT.to_owned());
        assert_eq!(meta.favicon, "https://ex.com/blog/httpdocs/icon.png");
        assert_eq!(meta.image, "https://cdn.ex.com/cover.png");
    }

    #[test]
    fn defaults_when_tags_are_missing() {
        let meta = default_page_metadata(&target(), AT.to_owned());
        assert_eq!(meta.title, "");
        assert_eq!(meta.page_type, "website");
        assert_eq!(meta.locale, "en_US");
        assert_eq!(meta.favicon, "https://ex.com/favicon.ico");
        assert_eq!(meta.canonical, "https://ex.com/blog/post");
        assert_eq!(meta.charset, "utf-8");
        assert_eq!(meta.language, "en");
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let meta = default_page_metadata(&target(), AT.to_owned());
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["type"], "website");
        assert_eq!(json["siteName"], "");
        assert_eq!(json["extractedAt"], AT);
    }
}
