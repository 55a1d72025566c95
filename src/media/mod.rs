/// Media loading module
///
/// This module handles:
/// - Fetching media bytes from remote urls or local files
/// - Generating 4:5 tile thumbnails
/// - Caching thumbnails to disk
/// - Decoding video frames for covers and playback

pub mod fetch;
pub mod thumbnail;
pub mod video;

pub use fetch::MediaClient;
