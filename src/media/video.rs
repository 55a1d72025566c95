//! Video decoding with FFmpeg
//!
//! Frames are decoded on tokio's blocking pool because the FFmpeg contexts are
//! not `Send`. Tiles only need the first frame. The lightbox runs one paced
//! decoder per playback session, driven by play/pause commands and streamed
//! to the UI through an iced subscription.

use iced::futures::SinkExt;
use iced::{stream, Subscription};
use std::sync::{Arc, Once};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::debug;

use super::fetch::local_path;
use crate::error::{GalleryError, Result};

static FFMPEG_INIT: Once = Once::new();

/// How long an idle (paused) decoder sleeps between command polls
const IDLE_POLL: Duration = Duration::from_millis(10);

/// Initialize FFmpeg once per process
pub fn init_ffmpeg() -> Result<()> {
    let mut result = Ok(());

    FFMPEG_INIT.call_once(|| {
        if let Err(e) = ffmpeg_next::init() {
            result = Err(GalleryError::Video(format!("FFmpeg initialization failed: {e}")));
            return;
        }

        // SAFETY: av_log_set_level only changes the global log threshold
        unsafe {
            ffmpeg_next::ffi::av_log_set_level(ffmpeg_next::ffi::AV_LOG_ERROR);
        }
    });

    result
}

/// One decoded frame, tightly packed RGBA
#[derive(Clone)]
pub struct VideoFrame {
    pub rgba: Arc<Vec<u8>>,
    pub width: u32,
    pub height: u32,
    /// Presentation timestamp in seconds
    pub pts_secs: f64,
}

impl VideoFrame {
    pub fn into_image(self) -> Result<image::RgbaImage> {
        let (width, height) = (self.width, self.height);
        image::RgbaImage::from_raw(width, height, Arc::unwrap_or_clone(self.rgba)).ok_or_else(|| {
            GalleryError::Video(format!("frame buffer does not match {width}x{height}"))
        })
    }
}

impl std::fmt::Debug for VideoFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pts_secs", &self.pts_secs)
            .finish()
    }
}

/// Decode the first frame of a video, used as the tile cover
pub fn first_frame(url: &str) -> Result<VideoFrame> {
    let mut stream = VideoStream::open(url)?;
    stream
        .next_frame()?
        .ok_or_else(|| GalleryError::Video(format!("{url}: no decodable frame")))
}

fn video_error(context: &'static str) -> impl Fn(ffmpeg_next::Error) -> GalleryError {
    move |e| GalleryError::Video(format!("{context}: {e}"))
}

/// Where FFmpeg should read `url` from: a local path or the remote url itself
fn input_location(url: &str) -> String {
    match local_path(url) {
        Some(path) => path.to_string_lossy().into_owned(),
        None => url.to_string(),
    }
}

/// Copy `height` rows of `width` RGBA pixels out of a strided plane
fn pack_rows(data: &[u8], stride: usize, width: usize, height: usize) -> Vec<u8> {
    let row_bytes = width * 4;
    let mut packed = Vec::with_capacity(row_bytes * height);
    for row in data.chunks(stride).take(height) {
        packed.extend_from_slice(&row[..row_bytes.min(row.len())]);
    }
    packed
}

/// The best video stream of one input, with its decoder and RGBA scaler
struct VideoStream {
    input: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    index: usize,
    time_base: f64,
    drained: bool,
}

impl VideoStream {
    fn open(url: &str) -> Result<Self> {
        init_ffmpeg()?;

        let input = ffmpeg_next::format::input(&input_location(url))
            .map_err(video_error("open input"))?;
        let stream = input
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| GalleryError::Video(format!("{url}: no video stream")))?;
        let index = stream.index();
        let time_base = f64::from(stream.time_base().numerator())
            / f64::from(stream.time_base().denominator().max(1));

        let decoder = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .map_err(video_error("codec context"))?
            .decoder()
            .video()
            .map_err(video_error("video decoder"))?;

        let (width, height) = (decoder.width(), decoder.height());
        if width == 0 || height == 0 {
            return Err(GalleryError::Video(format!(
                "{url}: invalid video dimensions {width}x{height}"
            )));
        }

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGBA,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .map_err(video_error("scaler"))?;

        Ok(Self {
            input,
            decoder,
            scaler,
            index,
            time_base,
            drained: false,
        })
    }

    /// Decode the next frame, `None` at the end of the stream
    fn next_frame(&mut self) -> Result<Option<VideoFrame>> {
        let mut decoded = ffmpeg_next::frame::Video::empty();
        loop {
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                return self.convert(&decoded).map(Some);
            }
            if self.drained {
                return Ok(None);
            }
            match self.next_packet() {
                Some(packet) => {
                    if let Err(e) = self.decoder.send_packet(&packet) {
                        debug!(error = %e, "skipping undecodable packet");
                    }
                }
                None => {
                    self.decoder.send_eof().map_err(video_error("flush decoder"))?;
                    self.drained = true;
                }
            }
        }
    }

    fn next_packet(&mut self) -> Option<ffmpeg_next::Packet> {
        let index = self.index;
        self.input
            .packets()
            .find(|(stream, _)| stream.index() == index)
            .map(|(_, packet)| packet)
    }

    fn convert(&mut self, decoded: &ffmpeg_next::frame::Video) -> Result<VideoFrame> {
        let mut rgba = ffmpeg_next::frame::Video::empty();
        self.scaler
            .run(decoded, &mut rgba)
            .map_err(video_error("scale frame"))?;

        let (width, height) = (rgba.width(), rgba.height());
        let pixels = pack_rows(rgba.data(0), rgba.stride(0), width as usize, height as usize);
        let pts_secs = decoded
            .timestamp()
            .map(|pts| pts as f64 * self.time_base)
            .unwrap_or(0.0);

        Ok(VideoFrame {
            rgba: Arc::new(pixels),
            width,
            height,
            pts_secs,
        })
    }

    /// Seek back to the start so the video can be played again
    fn rewind(&mut self) -> Result<()> {
        self.input.seek(0, ..0).map_err(video_error("rewind"))?;
        self.decoder.flush();
        self.drained = false;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCommand {
    Play,
    Pause,
}

/// Sends play/pause commands to a running decoder
#[derive(Debug, Clone)]
pub struct VideoControl(mpsc::UnboundedSender<VideoCommand>);

impl VideoControl {
    pub fn new(sender: mpsc::UnboundedSender<VideoCommand>) -> Self {
        Self(sender)
    }

    pub fn send(&self, command: VideoCommand) {
        if self.0.send(command).is_err() {
            debug!(?command, "video decoder already stopped");
        }
    }
}

#[derive(Debug, Clone)]
pub enum VideoEvent {
    /// Decoder is running and accepts commands
    Started(VideoControl),
    Frame(VideoFrame),
    /// Playback reached the end; the decoder is rewound and paused
    Finished,
    Failed(String),
}

/// An event tagged with the playback session it belongs to
#[derive(Debug, Clone)]
pub struct VideoUpdate {
    pub session: u64,
    pub event: VideoEvent,
}

/// Decode `url` for one playback session
///
/// The subscription is keyed by `session`, so a new session (another slide,
/// or the same url opened again) tears the old decoder down and starts over.
pub fn playback(url: String, session: u64) -> Subscription<VideoUpdate> {
    Subscription::run_with_id(
        ("video-playback", session),
        stream::channel(16, move |mut output| async move {
            let (command_tx, command_rx) = mpsc::unbounded_channel();
            let (event_tx, mut event_rx) = mpsc::channel(2);

            let decode_url = url.clone();
            tokio::task::spawn_blocking(move || {
                if let Err(e) = decode_loop(&decode_url, command_rx, &event_tx) {
                    let _ = event_tx.blocking_send(VideoEvent::Failed(e.to_string()));
                }
            });

            let started = VideoUpdate {
                session,
                event: VideoEvent::Started(VideoControl::new(command_tx)),
            };
            if output.send(started).await.is_err() {
                return;
            }

            while let Some(event) = event_rx.recv().await {
                if output.send(VideoUpdate { session, event }).await.is_err() {
                    break;
                }
            }
            debug!(url = %url, session, "video decoder finished");
        }),
    )
}

/// Blocking decode loop: shows the first frame, then paces frames while playing
fn decode_loop(
    url: &str,
    mut commands: mpsc::UnboundedReceiver<VideoCommand>,
    events: &mpsc::Sender<VideoEvent>,
) -> Result<()> {
    let mut stream = VideoStream::open(url)?;
    debug!(url, "🎬 video decoder started");

    let mut playing = false;
    let mut show_first = true;
    // Wall clock and pts of the first frame since the last play
    let mut clock: Option<(Instant, f64)> = None;

    loop {
        match commands.try_recv() {
            Ok(VideoCommand::Play) => {
                playing = true;
                clock = None;
            }
            Ok(VideoCommand::Pause) => {
                playing = false;
                clock = None;
            }
            Err(mpsc::error::TryRecvError::Disconnected) => break,
            Err(mpsc::error::TryRecvError::Empty) => {}
        }

        if !playing && !show_first {
            std::thread::sleep(IDLE_POLL);
            continue;
        }

        let Some(frame) = stream.next_frame()? else {
            playing = false;
            clock = None;
            stream.rewind()?;
            if events.blocking_send(VideoEvent::Finished).is_err() {
                break;
            }
            continue;
        };

        if playing {
            let (start, first_pts) = *clock.get_or_insert((Instant::now(), frame.pts_secs));
            let due = start + Duration::from_secs_f64((frame.pts_secs - first_pts).max(0.0));
            let now = Instant::now();
            if due > now {
                std::thread::sleep(due - now);
            }
        }

        show_first = false;
        if events.blocking_send(VideoEvent::Frame(frame)).is_err() {
            break;
        }
    }

    debug!(url, playing, "video decoder stopped");
    Ok(())
}
