use std::cell::Cell;

use anyhow::Context as _;
use lol_html::html_content::ContentType;
use lol_html::{RewriteStrSettings, element, rewrite_str};
use url::Url;

use crate::config::RewriteConfig;

const STRIPPED_ELEMENTS: &str = "script, noscript, iframe, embed, object";
const REBASED_ELEMENTS: &str = "a, img, link, script";
const REBASED_ATTRIBUTES: [&str; 2] = ["href", "src"];
const VIEWPORT_META: &str = r#"meta[name="viewport"]"#;

/// Rewrites an upstream HTML document for a small-screen viewer.
///
/// Executable and embedded elements are removed with their content, a
/// viewport directive and the mobile stylesheet are appended to the first
/// `<head>`, and asset/link URLs are made absolute against `base_url`.
/// Documents without a `<head>` get no injection.
///
/// The stylesheet is appended on every call; feeding an already rewritten
/// document back in adds a second block.
pub fn rewrite_for_mobile(
    html: &str,
    base_url: &Url,
    config: &RewriteConfig,
) -> anyhow::Result<String> {
    let stripped = strip_and_rebase(html, base_url).context("strip unsafe elements")?;
    let has_viewport = has_viewport_meta(&stripped).context("scan for viewport meta")?;
    inject_head(&stripped, has_viewport, config).context("inject mobile head")
}

fn strip_and_rebase(html: &str, base_url: &Url) -> anyhow::Result<String> {
    let output = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!(STRIPPED_ELEMENTS, |el| {
                    el.remove();
                    Ok(())
                }),
                element!(REBASED_ELEMENTS, |el| {
                    for attr in REBASED_ATTRIBUTES {
                        let Some(value) = el.get_attribute(attr) else {
                            continue;
                        };
                        if let Some(absolute) = resolve_against(base_url, &value) {
                            el.set_attribute(attr, &absolute)?;
                        }
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    )?;
    Ok(output)
}

fn resolve_against(base_url: &Url, value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    match base_url.join(value) {
        Ok(joined) => Some(joined.to_string()),
        Err(err) => {
            tracing::debug!(value, ?err, "keeping unresolvable url attribute");
            None
        }
    }
}

fn has_viewport_meta(html: &str) -> anyhow::Result<bool> {
    let found = Cell::new(false);
    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!(VIEWPORT_META, |_el| {
                found.set(true);
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )?;
    Ok(found.get())
}

fn inject_head(html: &str, has_viewport: bool, config: &RewriteConfig) -> anyhow::Result<String> {
    let mut injection = String::new();
    if !has_viewport {
        injection.push_str(&format!(
            r#"<meta name="viewport" content="{}">"#,
            config.viewport_content
        ));
    }
    injection.push_str("<style>");
    injection.push_str(&config.mobile_css);
    injection.push_str("</style>");

    let injected = Cell::new(false);
    let output = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("head", |el| {
                if !injected.replace(true) {
                    el.append(&injection, ContentType::Html);
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )?;
    if !injected.get() {
        tracing::debug!("document has no <head>; skipping viewport and stylesheet");
    }
    Ok(output)
}
