// src/fetch/rss.rs
//! Feed-backed fetch source. Per-site HTML scraping lives outside this crate;
//! an RSS/Atom-style feed with a keyword placeholder is the one transport we
//! speak natively.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::fetch::FetchSource;
use crate::posting::Posting;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    author: Option<String>,
}

/// Collapse feed markup into plain text: entity decode, strip tags, squeeze
/// whitespace.
fn clean(s: &str) -> String {
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("ws regex"));

    let decoded = html_escape::decode_html_entities(s).to_string();
    let stripped = re_tags.replace_all(&decoded, "");
    re_ws.replace_all(&stripped, " ").trim().to_string()
}

/// A feed URL template may contain `{keyword}`, substituted (percent-encoded)
/// on every fetch call.
pub struct RssSource {
    name: String,
    url_template: String,
    client: reqwest::Client,
}

impl RssSource {
    pub fn new(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
            client: reqwest::Client::new(),
        }
    }

    fn url_for(&self, keyword: &str) -> String {
        let encoded = utf8_percent_encode(keyword, NON_ALPHANUMERIC).to_string();
        self.url_template.replace("{keyword}", &encoded)
    }

    fn postings_from_xml(&self, xml: &str) -> Result<Vec<Posting>> {
        let rss: Rss = from_str(xml).with_context(|| format!("parsing {} feed xml", self.name))?;
        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let title = clean(it.title.as_deref().unwrap_or_default());
            if title.is_empty() {
                continue;
            }
            out.push(Posting {
                title,
                company: clean(it.author.as_deref().unwrap_or_default()),
                link: it.link.unwrap_or_default(),
                detail: clean(it.description.as_deref().unwrap_or_default()),
                source: self.name.clone(),
            });
        }
        counter!("fetch_postings_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl FetchSource for RssSource {
    async fn fetch(&self, keyword: &str) -> Result<Vec<Posting>> {
        let url = self.url_for(keyword);
        let body = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("{} http get", self.name))?
            .error_for_status()
            .with_context(|| format!("{} non-2xx", self.name))?
            .text()
            .await
            .with_context(|| format!("{} reading body", self.name))?;
        self.postings_from_xml(&body)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
