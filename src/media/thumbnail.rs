use image::{imageops::FilterType, DynamicImage, ImageFormat};
use std::fs;
use std::future::Future;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::fetch::MediaClient;
use super::video;
use crate::error::{GalleryError, Result};
use crate::gallery::tile::tile_height;

/// Get the thumbnail cache directory
/// Returns ~/.cache/media-gallery/thumbnails on Linux
pub fn get_thumbnail_cache_dir() -> Result<PathBuf> {
    let mut path = dirs::cache_dir()
        .or_else(dirs::home_dir)
        .ok_or(GalleryError::NoDirectory("cache"))?;

    path.push("media-gallery");
    path.push("thumbnails");

    fs::create_dir_all(&path).map_err(|e| GalleryError::io(&path, e))?;
    Ok(path)
}

/// Cache file for the thumbnail of `url`
pub fn thumbnail_path(cache_dir: &Path, url: &str, width: u32) -> PathBuf {
    let key = blake3::hash(format!("{width}:{url}").as_bytes());
    cache_dir.join(format!("{}.jpg", key.to_hex()))
}

/// Crop and scale encoded image bytes into a 4:5 JPEG thumbnail `width` pixels wide
pub fn make_thumbnail(data: &[u8], width: u32) -> Result<Vec<u8>> {
    cover_jpeg(image::load_from_memory(data)?, width)
}

/// Thumbnail of the first frame of the video behind `url`
pub fn make_video_thumbnail(url: &str, width: u32) -> Result<Vec<u8>> {
    let frame = video::first_frame(url)?;
    cover_jpeg(DynamicImage::ImageRgba8(frame.into_image()?), width)
}

fn cover_jpeg(img: DynamicImage, width: u32) -> Result<Vec<u8>> {
    let height = tile_height(width as f32).round() as u32;

    // Fill the tile and crop the overflow, like object-fit: cover
    let thumbnail = img.resize_to_fill(width, height, FilterType::Lanczos3);

    let mut encoded = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(thumbnail.to_rgb8()).write_to(&mut encoded, ImageFormat::Jpeg)?;
    Ok(encoded.into_inner())
}

/// Load an image tile thumbnail, generating and caching it on a miss
pub async fn load_thumbnail(
    client: MediaClient,
    cache_dir: PathBuf,
    url: String,
    width: u32,
) -> Result<Vec<u8>> {
    let source = url.clone();
    cached(&cache_dir, url, width, async move {
        let data = client.fetch_bytes(&source).await?;
        tokio::task::spawn_blocking(move || make_thumbnail(&data, width)).await?
    })
    .await
}

/// Load a video tile thumbnail from its first decoded frame
pub async fn load_video_thumbnail(cache_dir: PathBuf, url: String, width: u32) -> Result<Vec<u8>> {
    let source = url.clone();
    cached(&cache_dir, url, width, async move {
        tokio::task::spawn_blocking(move || make_video_thumbnail(&source, width)).await?
    })
    .await
}

async fn cached(
    cache_dir: &Path,
    url: String,
    width: u32,
    generate: impl Future<Output = Result<Vec<u8>>>,
) -> Result<Vec<u8>> {
    let path = thumbnail_path(cache_dir, &url, width);

    if let Ok(cached) = tokio::fs::read(&path).await {
        return Ok(cached);
    }

    let thumbnail = generate.await?;

    match tokio::fs::write(&path, &thumbnail).await {
        Ok(()) => debug!(url = %url, path = %path.display(), "📸 thumbnail cached"),
        Err(e) => warn!(url = %url, error = %e, "could not cache thumbnail"),
    }

    Ok(thumbnail)
}
