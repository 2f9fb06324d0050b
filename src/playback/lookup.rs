//! Resolving video references into titles and authors.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::error::{GiftError, Result};

const OEMBED_ENDPOINT: &str = "https://www.youtube.com/oembed";
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoInfo {
    pub title: String,
    pub author: String,
}

#[async_trait]
pub trait VideoLookup: Send + Sync {
    async fn lookup(&self, video_id: &str) -> Result<VideoInfo>;
}

#[derive(Deserialize)]
struct OEmbedResponse {
    title: String,
    author_name: String,
}

/// YouTube's public oEmbed endpoint. No API key needed.
pub struct OEmbedLookup {
    client: reqwest::Client,
}

impl OEmbedLookup {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

#[async_trait]
impl VideoLookup for OEmbedLookup {
    async fn lookup(&self, video_id: &str) -> Result<VideoInfo> {
        let resp = self
            .client
            .get(OEMBED_ENDPOINT)
            .query(&[("url", watch_url(video_id).as_str()), ("format", "json")])
            .send()
            .await?
            .error_for_status()?;
        let body: OEmbedResponse = resp.json().await?;
        Ok(VideoInfo {
            title: body.title,
            author: body.author_name,
        })
    }
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{video_id}/hqdefault.jpg")
}

/// Extracts the video id from a watch/short/embed URL or a bare id.
pub fn extract_video_id(reference: &str) -> Result<String> {
    let reference = reference.trim();
    if is_bare_id(reference) {
        return Ok(reference.to_string());
    }
    let invalid = || GiftError::InvalidReference(reference.to_string());
    let url = Url::parse(reference).map_err(|_| invalid())?;
    let host = url.host_str().ok_or_else(invalid)?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    let host = host.strip_prefix("m.").unwrap_or(host);
    let mut segments = url.path_segments().into_iter().flatten();

    let id = match host {
        "youtu.be" => segments.next().map(str::to_string),
        "youtube.com" | "music.youtube.com" => match segments.next() {
            Some("watch") => url
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned()),
            Some("embed") | Some("shorts") => segments.next().map(str::to_string),
            _ => None,
        },
        _ => None,
    };
    id.filter(|id| !id.is_empty()).ok_or_else(invalid)
}

fn is_bare_id(s: &str) -> bool {
    s.len() == 11
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
