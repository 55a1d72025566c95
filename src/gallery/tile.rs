use crate::gallery::slides::slide_count;
use crate::state::data::{Item, MediaKind};

/// Width / height of every grid tile (4:5 portrait)
pub const TILE_ASPECT: f32 = 4.0 / 5.0;

/// What a grid tile shows as its cover
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileCover<'a> {
    /// An image url, cropped to fill the tile
    Image(&'a str),
    /// The first frame of a video, never played in the grid
    Video(&'a str),
    /// Neutral placeholder for an item that only has embedded designs first
    Design,
    Empty,
}

impl TileCover<'_> {
    pub fn badge(&self) -> Option<&'static str> {
        match self {
            TileCover::Video(_) => Some("▶ video"),
            TileCover::Design => Some("design"),
            TileCover::Image(_) | TileCover::Empty => None,
        }
    }
}

/// Resolve the cover of a tile
///
/// Explicit thumbnail, then the first image anywhere in the media, then a
/// fallback chosen by the kind of the first asset.
pub fn cover_for(item: &Item) -> TileCover<'_> {
    if let Some(thumb) = item.thumbnail.as_deref() {
        return TileCover::Image(thumb);
    }
    if let Some(image) = item.media.iter().find(|m| m.kind == MediaKind::Image) {
        return TileCover::Image(&image.url);
    }
    match item.media.first() {
        Some(first) if first.kind == MediaKind::Video => TileCover::Video(&first.url),
        Some(first) if first.kind == MediaKind::EmbeddedDesign => TileCover::Design,
        _ => TileCover::Empty,
    }
}

/// Slide counter shown on the tile, only when the lightbox has several slides
pub fn slide_counter(item: &Item) -> Option<usize> {
    let count = slide_count(item);
    (count > 1).then_some(count)
}

/// Tile height for a given width
pub fn tile_height(width: f32) -> f32 {
    width / TILE_ASPECT
}
