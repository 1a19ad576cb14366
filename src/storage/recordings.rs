//! Canvas recordings
//!
//! `Recorder` grabs frames from the canvas at a fixed rate for a bounded
//! duration, then encodes them into an animated GIF in the background. Only
//! one recording may be in flight: from `start` until the encode finishes, a
//! second `start` is refused.
//!
//! Finished clips go into `RecordingStore`, persisted like presets as a JSON
//! list (GIF bytes base64-encoded) under `recordings`.

use super::{read_list, write_list, KeyValueStore, StorageError};
use crate::async_ops::{Task, TaskPoll};
use base64::Engine as _;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{imageops, Delay, Frame, RgbaImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const RECORDINGS_KEY: &str = "recordings";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordingError {
    #[error("a recording is already in progress")]
    AlreadyRecording,
    #[error("no recording in progress")]
    NotRecording,
    #[error("recording captured no frames")]
    NoFrames,
    #[error("could not encode clip: {0}")]
    Encode(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<image::ImageError> for RecordingError {
    fn from(e: image::ImageError) -> Self {
        RecordingError::Encode(e.to_string())
    }
}

/// One captured frame, top row first
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub image: RgbaImage,
}

impl CapturedFrame {
    /// Build from a GL framebuffer read (bottom row first), keeping only
    /// `region` (x, y, w, h in pixels, top-left origin, clipped to the frame)
    /// and shrinking to at most `max_width` pixels wide
    pub fn from_framebuffer(
        width: u32,
        height: u32,
        rgba: Vec<u8>,
        region: Option<(u32, u32, u32, u32)>,
        max_width: u32,
    ) -> Option<Self> {
        let mut image = RgbaImage::from_raw(width, height, rgba)?;
        imageops::flip_vertical_in_place(&mut image);
        if let Some((x, y, w, h)) = region {
            let w = w.min(width.saturating_sub(x));
            let h = h.min(height.saturating_sub(y));
            if w == 0 || h == 0 {
                return None;
            }
            image = imageops::crop_imm(&image, x, y, w, h).to_image();
        }
        let (width, height) = image.dimensions();
        if width > max_width && max_width > 0 {
            let new_height = ((height as u64 * max_width as u64) / width as u64).max(1) as u32;
            image = imageops::resize(&image, max_width, new_height, imageops::FilterType::Triangle);
        }
        Some(Self { image })
    }
}

/// Encoded clip ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedClip {
    pub gif: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub frame_count: usize,
    pub fps: u32,
}

/// Encode frames as a looping GIF
pub fn encode_gif(frames: Vec<CapturedFrame>, fps: u32) -> Result<EncodedClip, RecordingError> {
    let Some(first) = frames.first() else {
        return Err(RecordingError::NoFrames);
    };
    let (width, height) = first.image.dimensions();
    let frame_count = frames.len();
    let delay = Delay::from_numer_denom_ms(1000, fps.max(1));

    let mut gif = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut gif, 10);
        encoder.set_repeat(Repeat::Infinite)?;
        encoder.encode_frames(
            frames
                .into_iter()
                // Every frame must match the first (the window may have been resized)
                .map(|f| {
                    if f.image.dimensions() == (width, height) {
                        f.image
                    } else {
                        imageops::resize(&f.image, width, height, imageops::FilterType::Triangle)
                    }
                })
                .map(|image| Frame::from_parts(image, 0, 0, delay)),
        )?;
    }

    Ok(EncodedClip {
        gif,
        width,
        height,
        frame_count,
        fps,
    })
}

enum RecorderState {
    Idle,
    Capturing {
        started: f64,
        next_frame_at: f64,
        frames: Vec<CapturedFrame>,
    },
    Encoding(Task<Result<EncodedClip, RecordingError>>),
}

pub struct Recorder {
    state: RecorderState,
    duration_secs: f64,
    fps: u32,
}

impl Recorder {
    pub fn new(duration_secs: f64, fps: u32) -> Self {
        Self {
            state: RecorderState::Idle,
            duration_secs,
            fps: fps.max(1),
        }
    }

    /// Capturing or encoding
    pub fn is_busy(&self) -> bool {
        !matches!(self.state, RecorderState::Idle)
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.state, RecorderState::Capturing { .. })
    }

    /// Seconds captured so far
    pub fn elapsed(&self, now: f64) -> f64 {
        match &self.state {
            RecorderState::Capturing { started, .. } => (now - started).min(self.duration_secs),
            _ => 0.0,
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration_secs
    }

    pub fn start(&mut self, now: f64) -> Result<(), RecordingError> {
        if self.is_busy() {
            return Err(RecordingError::AlreadyRecording);
        }
        log::info!("Recording started ({}s at {} fps)", self.duration_secs, self.fps);
        self.state = RecorderState::Capturing {
            started: now,
            next_frame_at: now,
            frames: Vec::new(),
        };
        Ok(())
    }

    /// Whether the frame being drawn now should be captured
    pub fn wants_frame(&self, now: f64) -> bool {
        matches!(self.state, RecorderState::Capturing { next_frame_at, .. } if now >= next_frame_at)
    }

    /// Add a captured frame; stops by itself once the duration is reached
    pub fn push_frame(&mut self, now: f64, frame: CapturedFrame) {
        let interval = 1.0 / self.fps as f64;
        let done = match &mut self.state {
            RecorderState::Capturing {
                started,
                next_frame_at,
                frames,
            } => {
                if now - *started < self.duration_secs {
                    frames.push(frame);
                    // Skip ahead instead of bursting after a slow frame
                    while *next_frame_at <= now {
                        *next_frame_at += interval;
                    }
                }
                now - *started >= self.duration_secs
            }
            _ => false,
        };
        if done {
            let _ = self.stop();
        }
    }

    /// End capture early and start encoding what was captured
    pub fn stop(&mut self) -> Result<(), RecordingError> {
        if !self.is_capturing() {
            return Err(RecordingError::NotRecording);
        }
        let RecorderState::Capturing { frames, .. } =
            std::mem::replace(&mut self.state, RecorderState::Idle)
        else {
            return Err(RecordingError::NotRecording);
        };
        log::info!("Recording stopped, encoding {} frames", frames.len());
        let fps = self.fps;
        self.state = RecorderState::Encoding(Task::spawn(move || encode_gif(frames, fps)));
        Ok(())
    }

    /// Poll the encode; yields the clip (or error) once and goes idle
    pub fn poll(&mut self) -> Option<Result<EncodedClip, RecordingError>> {
        let RecorderState::Encoding(task) = &mut self.state else {
            return None;
        };
        let result = match task.poll() {
            TaskPoll::Pending => return None,
            TaskPoll::Ready(result) => result,
            TaskPoll::Lost => Err(RecordingError::Encode("encoder stopped".into())),
        };
        self.state = RecorderState::Idle;
        Some(result)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub id: u64,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub frame_count: usize,
    pub fps: u32,
    /// Base64 of the GIF bytes
    pub gif: String,
}

impl Recording {
    pub fn duration_secs(&self) -> f32 {
        self.frame_count as f32 / self.fps.max(1) as f32
    }

    pub fn gif_bytes(&self) -> Result<Vec<u8>, RecordingError> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.gif)
            .map_err(|e| RecordingError::Encode(e.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct RecordingStore {
    recordings: Vec<Recording>,
}

impl RecordingStore {
    pub fn load(kv: &dyn KeyValueStore) -> Self {
        let recordings: Vec<Recording> = read_list(kv, RECORDINGS_KEY);
        log::info!("Loaded {} recordings", recordings.len());
        Self { recordings }
    }

    pub fn list(&self) -> &[Recording] {
        &self.recordings
    }

    pub fn get(&self, id: u64) -> Option<&Recording> {
        self.recordings.iter().find(|r| r.id == id)
    }

    /// Append a clip and persist the list
    pub fn add(
        &mut self,
        kv: &mut dyn KeyValueStore,
        clip: EncodedClip,
        now_ms: u64,
    ) -> Result<u64, RecordingError> {
        let id = match self.recordings.iter().map(|r| r.id).max() {
            Some(last) if now_ms <= last => last + 1,
            _ => now_ms,
        };
        self.recordings.push(Recording {
            id,
            name: format!("Recording {}", self.recordings.len() + 1),
            width: clip.width,
            height: clip.height,
            frame_count: clip.frame_count,
            fps: clip.fps,
            gif: base64::engine::general_purpose::STANDARD.encode(&clip.gif),
        });
        if let Err(e) = write_list(kv, RECORDINGS_KEY, &self.recordings) {
            self.recordings.pop();
            return Err(e.into());
        }
        Ok(id)
    }

    pub fn delete(&mut self, kv: &mut dyn KeyValueStore, id: u64) -> Result<bool, RecordingError> {
        let Some(index) = self.recordings.iter().position(|r| r.id == id) else {
            return Ok(false);
        };
        let removed = self.recordings.remove(index);
        if let Err(e) = write_list(kv, RECORDINGS_KEY, &self.recordings) {
            self.recordings.insert(index, removed);
            return Err(e.into());
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::time::{Duration, Instant};

    fn frame(width: u32, height: u32, shade: u8) -> CapturedFrame {
        CapturedFrame {
            image: RgbaImage::from_pixel(width, height, image::Rgba([shade, shade, shade, 255])),
        }
    }

    fn finish(recorder: &mut Recorder) -> Result<EncodedClip, RecordingError> {
        let start = Instant::now();
        loop {
            if let Some(result) = recorder.poll() {
                return result;
            }
            assert!(start.elapsed() < Duration::from_secs(10), "encode hung");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_framebuffer_is_flipped_and_shrunk() {
        // 2x2: bottom row red, top row blue (GL order is bottom first)
        let mut rgba = Vec::new();
        rgba.extend_from_slice(&[255, 0, 0, 255, 255, 0, 0, 255]);
        rgba.extend_from_slice(&[0, 0, 255, 255, 0, 0, 255, 255]);
        let frame = CapturedFrame::from_framebuffer(2, 2, rgba, None, 480).unwrap();
        assert_eq!(frame.image.get_pixel(0, 0).0, [0, 0, 255, 255]);

        let big = CapturedFrame::from_framebuffer(960, 540, vec![0; 960 * 540 * 4], None, 480).unwrap();
        assert_eq!(big.image.dimensions(), (480, 270));

        assert!(CapturedFrame::from_framebuffer(4, 4, vec![0; 3], None, 480).is_none());
    }

    #[test]
    fn test_framebuffer_region_is_clipped() {
        // Left column white, right column black, in both rows
        let rgba = [255, 255, 255, 255, 0, 0, 0, 255].repeat(2);
        let frame = CapturedFrame::from_framebuffer(2, 2, rgba.clone(), Some((1, 0, 5, 5)), 480).unwrap();
        assert_eq!(frame.image.dimensions(), (1, 2));
        assert_eq!(frame.image.get_pixel(0, 0).0, [0, 0, 0, 255]);

        assert!(CapturedFrame::from_framebuffer(2, 2, rgba, Some((2, 0, 1, 1)), 480).is_none());
    }

    #[test]
    fn test_encode_gif() {
        let clip = encode_gif(vec![frame(8, 6, 0), frame(8, 6, 255), frame(4, 4, 128)], 12).unwrap();
        assert_eq!(clip.frame_count, 3);
        assert_eq!((clip.width, clip.height), (8, 6));
        assert_eq!(&clip.gif[..6], b"GIF89a");
        assert_eq!(encode_gif(Vec::new(), 12), Err(RecordingError::NoFrames));
    }

    #[test]
    fn test_single_recording_in_flight() {
        let mut recorder = Recorder::new(8.0, 4);
        recorder.start(0.0).unwrap();
        assert_eq!(recorder.start(1.0), Err(RecordingError::AlreadyRecording));

        recorder.push_frame(0.0, frame(4, 4, 10));
        recorder.stop().unwrap();
        // Still busy while encoding
        assert!(recorder.is_busy());
        assert_eq!(recorder.start(2.0), Err(RecordingError::AlreadyRecording));

        let clip = finish(&mut recorder).unwrap();
        assert_eq!(clip.frame_count, 1);
        assert!(!recorder.is_busy());
        recorder.start(3.0).unwrap();
    }

    #[test]
    fn test_capture_is_bounded_by_duration() {
        let mut recorder = Recorder::new(8.0, 2);
        recorder.start(0.0).unwrap();
        let mut now = 0.0;
        while recorder.is_capturing() {
            if recorder.wants_frame(now) {
                recorder.push_frame(now, frame(2, 2, 0));
            }
            now += 0.1;
            assert!(now < 20.0);
        }
        assert!(now < 8.5);
        let clip = finish(&mut recorder).unwrap();
        // 2 fps for 8 seconds
        assert!((15..=17).contains(&clip.frame_count), "{}", clip.frame_count);
    }

    #[test]
    fn test_stop_without_start() {
        let mut recorder = Recorder::new(8.0, 12);
        assert_eq!(recorder.stop(), Err(RecordingError::NotRecording));
        assert!(recorder.poll().is_none());
    }

    #[test]
    fn test_store_add_and_delete() {
        let mut kv = MemoryStore::new();
        let mut store = RecordingStore::load(&kv);
        let clip = encode_gif(vec![frame(4, 4, 1), frame(4, 4, 2)], 2).unwrap();
        let id = store.add(&mut kv, clip.clone(), 100).unwrap();

        let reloaded = RecordingStore::load(&kv);
        let saved = reloaded.get(id).unwrap();
        assert_eq!(saved.gif_bytes().unwrap(), clip.gif);
        assert_eq!(saved.duration_secs(), 1.0);

        assert!(store.delete(&mut kv, id).unwrap());
        assert!(!store.delete(&mut kv, id).unwrap());
        assert!(RecordingStore::load(&kv).list().is_empty());
    }
}
