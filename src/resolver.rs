/*============================================================
  Synavera Project: Syn-App
  Module: synapp_core::resolver
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Fetch the vendor product page and extract a direct
    installer URL through a prioritised chain of extractors.

  Security / Safety Notes:
    The page body is treated as untrusted text; only URLs are
    extracted and nothing from it is executed or logged.

  Dependencies:
    regex for markup matching, url for relative href joins.

  Operational Scope:
    First stage after the GPU gate; an unresolvable page ends
    the run as a no-op.

  Revision History:
    2025-11-09 COD  Implemented tiered link extraction.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Ordered, independently testable fallbacks
    - Markup drift degrades to absence, never to a crash
============================================================*/

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::descriptor::installer_filename;
use crate::error::Result;
use crate::logger::Logger;
use crate::transport::Transport;

/// Inputs every extractor sees besides the page body.
pub struct PageContext<'a> {
    pub page_url: &'a str,
    pub name_tokens: &'a [String],
}

/// One extraction strategy: page body in, absolute URL out.
pub type Extractor = fn(&str, &PageContext<'_>) -> Option<String>;

/// Extractors in strict priority order; the first hit wins.
pub const EXTRACTORS: [(&str, Extractor); 3] = [
    ("cdn", versioned_cdn_url),
    ("primary-anchor", primary_anchor_href),
    ("any-anchor", any_anchor_href),
];

/// Resolves the installer download URL from a product page.
pub struct LinkResolver<'a> {
    transport: &'a dyn Transport,
    name_tokens: &'a [String],
    logger: &'a Logger,
}

impl<'a> LinkResolver<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        name_tokens: &'a [String],
        logger: &'a Logger,
    ) -> Self {
        Self {
            transport,
            name_tokens,
            logger,
        }
    }

    /// Fetch `page_url` and return the first extracted download URL.
    pub async fn resolve(&self, page_url: &str) -> Result<Option<String>> {
        let body = self.transport.get_text(page_url).await?;
        self.logger.debug(
            "LINK",
            format!("Fetched {} ({} bytes)", page_url, body.len()),
        );

        let context = PageContext {
            page_url,
            name_tokens: self.name_tokens,
        };
        match extract_link(&body, &context) {
            Some((tier, url)) => {
                self.logger
                    .info("LINK", format!("Resolved {url} via {tier} extractor"));
                Ok(Some(url))
            }
            None => Ok(None),
        }
    }
}

/// Run the extractor chain over `body`, returning the winning tier and URL.
pub fn extract_link(body: &str, context: &PageContext<'_>) -> Option<(&'static str, String)> {
    EXTRACTORS
        .iter()
        .find_map(|(tier, extractor)| extractor(body, context).map(|url| (*tier, url)))
}

/// Tier (a): `https://.../<a.b.c.d>/<Name>_v<a.b.c.d>.exe` anywhere in the
/// page, with the same version in the directory and the filename.
pub fn versioned_cdn_url(body: &str, _context: &PageContext<'_>) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(
            r#"https?://[^\s"'<>]+/(\d+\.\d+\.\d+\.\d+)/[^\s"'<>/]+_v(\d+\.\d+\.\d+\.\d+)\.exe"#,
        )
        .expect("cdn pattern is valid")
    });
    pattern
        .captures_iter(body)
        .find(|caps| caps.get(1).map(|m| m.as_str()) == caps.get(2).map(|m| m.as_str()))
        .and_then(|caps| caps.get(0))
        .map(|m| m.as_str().to_string())
}

/// Tier (b): a call-to-action anchor whose href names the product and
/// ends in `.exe`.
pub fn primary_anchor_href(body: &str, context: &PageContext<'_>) -> Option<String> {
    anchors(body)
        .filter(|anchor| anchor.is_call_to_action())
        .filter_map(|anchor| anchor.href)
        .filter(|href| ends_with_exe(href) && names_product(href, context.name_tokens))
        .find_map(|href| absolutize(context.page_url, &href))
}

/// Tier (c): any anchor whose href names the product and carries an
/// `.exe` installer name in its path or query.
pub fn any_anchor_href(body: &str, context: &PageContext<'_>) -> Option<String> {
    anchors(body)
        .filter_map(|anchor| anchor.href)
        .filter(|href| names_product(href, context.name_tokens))
        .filter_map(|href| absolutize(context.page_url, &href))
        .find(|url| installer_filename(url).is_some())
}

struct Anchor {
    href: Option<String>,
    class: String,
    text: String,
}

impl Anchor {
    fn is_call_to_action(&self) -> bool {
        let class = self.class.to_lowercase();
        ["btn", "cta", "primary"]
            .iter()
            .any(|marker| class.contains(marker))
            || self.text.to_lowercase().contains("download")
    }
}

fn anchors(body: &str) -> impl Iterator<Item = Anchor> + '_ {
    static ANCHOR: OnceLock<Regex> = OnceLock::new();
    let anchor = ANCHOR
        .get_or_init(|| Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a>").expect("anchor pattern is valid"));

    anchor.captures_iter(body).map(|caps| {
        let attrs = caps.get(1).map_or("", |m| m.as_str());
        let inner = caps.get(2).map_or("", |m| m.as_str());
        Anchor {
            href: attribute(attrs, href_pattern()).map(|value| value.replace("&amp;", "&")),
            class: attribute(attrs, class_pattern()).unwrap_or_default(),
            text: strip_tags(inner),
        }
    })
}

fn href_pattern() -> &'static Regex {
    static HREF: OnceLock<Regex> = OnceLock::new();
    HREF.get_or_init(|| {
        Regex::new(r#"(?i)(?:^|\s)href\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("href pattern is valid")
    })
}

fn class_pattern() -> &'static Regex {
    static CLASS: OnceLock<Regex> = OnceLock::new();
    CLASS.get_or_init(|| {
        Regex::new(r#"(?i)(?:^|\s)class\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("class pattern is valid")
    })
}

/// Value of the attribute matched by `pattern`; names must start the
/// attribute, so `data-href` never stands in for `href`.
fn attribute(attrs: &str, pattern: &Regex) -> Option<String> {
    let caps = pattern.captures(attrs)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().trim().to_string())
}

fn strip_tags(fragment: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let tag = TAG.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));
    tag.replace_all(fragment, " ").trim().to_string()
}

fn ends_with_exe(href: &str) -> bool {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    path.to_lowercase().ends_with(".exe")
}

fn names_product(href: &str, tokens: &[String]) -> bool {
    let lowered = href.to_lowercase();
    tokens
        .iter()
        .all(|token| lowered.contains(&token.to_lowercase()))
}

fn absolutize(page_url: &str, href: &str) -> Option<String> {
    match Url::parse(href) {
        Ok(url) => Some(url.to_string()),
        Err(_) => Url::parse(page_url)
            .ok()?
            .join(href)
            .ok()
            .map(|url| url.to_string()),
    }
}
