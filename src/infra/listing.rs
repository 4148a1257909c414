//! Asynchronous client that turns a marketplace listing page into
//! [`ListingAttributes`].
//!
//! - Sends a browser-like user agent; marketplaces reject bare clients.
//! - Never retries. The caller decides what to do with a failed fetch.

use std::{str::FromStr, sync::OnceLock, time::Duration};

use regex::Regex;
use reqwest::{Client, Url};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{InstallmentPhrase, ListingAttributes};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
pub const TITLE_NOT_FOUND: &str = "Title not found";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("listing page returned status {0}")]
    Status(u16),
}

#[derive(Clone)]
pub struct ListingFetcher {
    http: Client,
    phrase: InstallmentPhrase,
}

impl ListingFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            phrase: InstallmentPhrase::default(),
        })
    }

    pub fn with_phrase(mut self, phrase: InstallmentPhrase) -> Self {
        self.phrase = phrase;
        self
    }

    pub async fn fetch(&self, url: &str) -> Result<ListingAttributes, FetchError> {
        let url = Url::parse(url.trim())?;
        debug!(%url, "fetching listing page");

        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "listing page request failed");
            return Err(FetchError::Status(status.as_u16()));
        }

        let html = response.text().await?;
        Ok(parse_listing_html_with(&html, url.as_str(), &self.phrase))
    }
}

/// Extracts listing attributes from raw page HTML using the default
/// installment phrases.
pub fn parse_listing_html(html: &str, source_url: &str) -> ListingAttributes {
    parse_listing_html_with(html, source_url, &InstallmentPhrase::default())
}

pub fn parse_listing_html_with(
    html: &str,
    source_url: &str,
    phrase: &InstallmentPhrase,
) -> ListingAttributes {
    let patterns = patterns();

    let title = patterns
        .title
        .captures(html)
        .map(|caps| clean_text(&caps[1]))
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| TITLE_NOT_FOUND.to_string());

    let photo_url = patterns
        .photo
        .captures(html)
        .map(|caps| decode_entities(&caps[1]));

    let price = parse_price(
        patterns.fraction.captures(html).map(|caps| caps[1].to_string()),
        patterns.cents.captures(html).map(|caps| caps[1].to_string()),
    );
    if price.is_none() {
        debug!(source_url, "no price found on listing page");
    }

    let text = patterns.tags.replace_all(html, " ");
    let listing_type_signal = phrase.detect(&decode_entities(&text));

    ListingAttributes {
        title,
        price,
        listing_type_signal,
        photo_url,
        source_url: source_url.to_string(),
    }
}

fn parse_price(fraction: Option<String>, cents: Option<String>) -> Option<Decimal> {
    let whole = fraction?.trim().replace('.', "");
    if whole.is_empty() {
        return None;
    }
    let cents = cents
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "00".to_string());
    Decimal::from_str(&format!("{whole}.{cents}")).ok()
}

struct Patterns {
    title: Regex,
    photo: Regex,
    fraction: Regex,
    cents: Regex,
    tags: Regex,
    whitespace: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        title: compile(r#"(?is)<h1\b[^>]*class="[^"]*\bui-pdp-title\b[^"]*"[^>]*>(.*?)</h1>"#),
        photo: compile(
            r#"(?is)<figure\b[^>]*class="[^"]*\bui-pdp-gallery__figure\b[^"]*"[^>]*>.*?<img\b[^>]*?\ssrc="([^"]+)""#,
        ),
        fraction: compile(
            r#"(?is)<span\b[^>]*class="[^"]*\bandes-money-amount__fraction\b[^"]*"[^>]*>([^<]*)<"#,
        ),
        cents: compile(
            r#"(?is)<span\b[^>]*class="[^"]*\bandes-money-amount__cents\b[^"]*"[^>]*>([^<]*)<"#,
        ),
        tags: compile(r"(?s)<[^>]*>"),
        whitespace: compile(r"\s+"),
    })
}

fn compile(pattern: &str) -> Regex {
    // Patterns are literals; a failure here is a programming error caught by tests.
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid listing pattern {pattern}: {err}"))
}

fn clean_text(fragment: &str) -> String {
    let patterns = patterns();
    let stripped = patterns.tags.replace_all(fragment, " ");
    let decoded = decode_entities(&stripped);
    patterns
        .whitespace
        .replace_all(decoded.trim(), " ")
        .into_owned()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
