/// JSON export source
///
/// Reads a loosely-typed export of gallery records and normalizes it into
/// strict `Item`s. This is the only place that deals with missing fields,
/// unknown media kinds or hidden records; the gallery core never does.
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, warn};

use super::ItemSource;
use crate::error::{GalleryError, Result};
use crate::state::data::{Item, MediaAsset, MediaKind};

const UNTITLED: &str = "Untitled";
const VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "mov", "webm", "m4v", "avi", "mkv"];

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Export {
    List(Vec<Record>),
    Wrapped { items: Vec<Record> },
}

#[derive(Debug, Deserialize)]
struct Record {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default, alias = "alt_text")]
    alt: Option<String>,
    #[serde(default)]
    media: Vec<RecordMedia>,
    #[serde(default, alias = "thumb")]
    thumbnail: Option<String>,
    #[serde(default, alias = "channel")]
    channels: Vec<String>,
    #[serde(default)]
    views: Option<u64>,
    #[serde(default)]
    engagements: Option<u64>,
    #[serde(default)]
    order: Option<f64>,
    #[serde(default)]
    visible: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RecordMedia {
    #[serde(default, alias = "type")]
    kind: Option<MediaKind>,
    url: String,
    #[serde(default)]
    mime: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Items read from a JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonSource {
    path: PathBuf,
}

impl JsonSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ItemSource for JsonSource {
    fn fetch_items(&self) -> Result<Vec<Item>> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| GalleryError::io(&self.path, e))?;
        parse_items(&raw)
    }

    fn describe(&self) -> String {
        format!("JSON export {}", self.path.display())
    }
}

/// Parse and normalize a JSON export
pub fn parse_items(raw: &str) -> Result<Vec<Item>> {
    let records = match serde_json::from_str::<Export>(raw)? {
        Export::List(records) | Export::Wrapped { items: records } => records,
    };

    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(records.len());

    for record in records {
        if record.visible == Some(false) {
            debug!(id = %record.id, "skipping hidden record");
            continue;
        }
        let item = normalize(record)?;
        if !seen.insert(item.id.clone()) {
            warn!(id = %item.id, "duplicate item id, keeping the first occurrence");
            continue;
        }
        items.push(item);
    }

    Ok(items)
}

fn normalize(record: Record) -> Result<Item> {
    let id = record.id.trim().to_string();
    if id.is_empty() {
        return Err(GalleryError::InvalidItem {
            id: record.id,
            reason: "empty id".to_string(),
        });
    }

    let media = record
        .media
        .into_iter()
        .filter(|m| !m.url.trim().is_empty())
        .map(|m| {
            let url = m.url.trim().to_string();
            let kind = m
                .kind
                .unwrap_or_else(|| infer_kind(&url, m.mime.as_deref(), m.name.as_deref()));
            MediaAsset::new(kind, url)
        })
        .collect();

    Ok(Item {
        id,
        title: non_blank(record.title).unwrap_or_else(|| UNTITLED.to_string()),
        link: non_blank(record.link),
        alt_text: non_blank(record.alt),
        media,
        thumbnail: non_blank(record.thumbnail),
        channels: record
            .channels
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect(),
        view_count: record.views,
        engagement_count: record.engagements,
        display_order: record.order.unwrap_or(0.0),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Guess the kind of an asset that was exported without one
pub fn infer_kind(url: &str, mime: Option<&str>, name: Option<&str>) -> MediaKind {
    if url.to_lowercase().contains("canva.com") {
        return MediaKind::EmbeddedDesign;
    }

    let is_video_mime = mime.is_some_and(|m| m.to_lowercase().starts_with("video/"));
    let path = url.split(['?', '#']).next().unwrap_or(url);
    if is_video_mime || has_video_extension(name.unwrap_or("")) || has_video_extension(path) {
        MediaKind::Video
    } else {
        MediaKind::Image
    }
}

fn has_video_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
