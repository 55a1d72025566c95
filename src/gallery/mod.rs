/// Gallery core
///
/// Pure, toolkit-independent logic:
/// - Filter/sort derivation of the visible list (filter.rs)
/// - Slide selection per item (slides.rs)
/// - Lightbox state machine (lightbox.rs)
/// - Tile cover and counter resolution for the grid (tile.rs)

pub mod filter;
pub mod lightbox;
pub mod slides;
pub mod tile;
