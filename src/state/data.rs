/// Shared data structures for the gallery
///
/// These structs represent the data model that flows from the item
/// sources (JSON export, SQLite catalog) into the gallery core and the UI.
/// Items are validated once at the source boundary; everything downstream
/// treats them as well-formed and immutable.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a single media asset
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    /// A slide deck hosted by a design tool, shown through an embed
    #[serde(alias = "canva", alias = "design")]
    EmbeddedDesign,
}

impl MediaKind {
    /// Name used in the catalog database
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::EmbeddedDesign => "embedded_design",
        }
    }

    /// Parse the catalog database name back into a kind
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            "embedded_design" | "canva" | "design" => Some(MediaKind::EmbeddedDesign),
            _ => None,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One piece of media belonging to an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
    pub kind: MediaKind,
    pub url: String,
}

impl MediaAsset {
    pub fn new(kind: MediaKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
        }
    }
}

#[cfg(test)]
impl MediaAsset {
    pub fn image(url: impl Into<String>) -> Self {
        Self::new(MediaKind::Image, url)
    }

    pub fn video(url: impl Into<String>) -> Self {
        Self::new(MediaKind::Video, url)
    }

    pub fn design(url: impl Into<String>) -> Self {
        Self::new(MediaKind::EmbeddedDesign, url)
    }
}

/// Represents a single gallery entry
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Unique across the item list for the whole session
    pub id: String,
    pub title: String,
    pub link: Option<String>,
    /// Caption shown under the lightbox
    pub alt_text: Option<String>,
    /// Ordered media; the first image is the default thumbnail and slides follow this order
    pub media: Vec<MediaAsset>,
    /// Manually chosen thumbnail url, preferred over any media
    pub thumbnail: Option<String>,
    /// Channel tags, empty means untagged
    pub channels: Vec<String>,
    pub view_count: Option<u64>,
    pub engagement_count: Option<u64>,
    /// Manual ordering key (ascending)
    pub display_order: f64,
}

impl Item {
    /// True if the item is tagged with `channel`, ignoring case
    pub fn has_channel(&self, channel: &str) -> bool {
        let wanted = channel.to_lowercase();
        self.channels.iter().any(|c| c.to_lowercase() == wanted)
    }
}

#[cfg(test)]
impl Item {
    /// Create an item with no media, channels or metrics
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            link: None,
            alt_text: None,
            media: Vec::new(),
            thumbnail: None,
            channels: Vec::new(),
            view_count: None,
            engagement_count: None,
            display_order: 0.0,
        }
    }

    pub fn with_media(mut self, media: Vec<MediaAsset>) -> Self {
        self.media = media;
        self
    }

    pub fn with_channels<S: Into<String>>(mut self, channels: impl IntoIterator<Item = S>) -> Self {
        self.channels = channels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_order(mut self, order: f64) -> Self {
        self.display_order = order;
        self
    }

    pub fn with_views(mut self, views: u64) -> Self {
        self.view_count = Some(views);
        self
    }

    pub fn with_engagements(mut self, engagements: u64) -> Self {
        self.engagement_count = Some(engagements);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_channel_ignores_case() {
        let item = Item::new("a", "A").with_channels(["Instagram", "TikTok"]);
        assert!(item.has_channel("instagram"));
        assert!(item.has_channel("TIKTOK"));
        assert!(!item.has_channel("YouTube"));
    }

    #[test]
    fn test_media_kind_names() {
        for kind in [MediaKind::Image, MediaKind::Video, MediaKind::EmbeddedDesign] {
            assert_eq!(MediaKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(MediaKind::parse("canva"), Some(MediaKind::EmbeddedDesign));
        assert_eq!(MediaKind::parse("gif"), None);
    }

    #[test]
    fn test_media_kind_deserializes_aliases() {
        let kind: MediaKind = serde_json::from_str("\"canva\"").unwrap();
        assert_eq!(kind, MediaKind::EmbeddedDesign);
        let kind: MediaKind = serde_json::from_str("\"video\"").unwrap();
        assert_eq!(kind, MediaKind::Video);
    }
}
