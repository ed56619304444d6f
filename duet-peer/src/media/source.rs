use crate::error::MediaAcquisitionError;
use crate::media::{LocalMedia, LocalTrack, TrackKind};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};
use webrtc::media::Sample;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    User,
    Environment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaConstraints {
    /// `None` means no video.
    pub video: Option<FacingMode>,
    pub audio: bool,
}

impl MediaConstraints {
    pub fn video_only(facing: FacingMode) -> Self {
        Self {
            video: Some(facing),
            audio: false,
        }
    }
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            video: Some(FacingMode::User),
            audio: true,
        }
    }
}

/// Produces local tracks. Device access lives behind this trait.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn acquire(&self, constraints: &MediaConstraints)
    -> Result<LocalMedia, MediaAcquisitionError>;
}

// Opus frame that decodes to 20ms of silence.
const OPUS_SILENCE: &[u8] = &[0xf8, 0xff, 0xfe];
const AUDIO_FRAME: Duration = Duration::from_millis(20);
const VIDEO_FRAME: Duration = Duration::from_millis(33);

static NEXT_STREAM: AtomicU64 = AtomicU64::new(1);

/// Headless tracks: silent Opus audio and blank VP8 video.
///
/// Each acquired track gets a task writing placeholder samples until the track
/// is stopped.
#[derive(Debug, Clone, Default)]
pub struct SyntheticMediaSource {
    pump: bool,
}

impl SyntheticMediaSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep writing samples into acquired tracks.
    pub fn with_pump(mut self) -> Self {
        self.pump = true;
        self
    }

    fn spawn_pump(track: LocalTrack) {
        let (payload, frame) = match track.kind() {
            TrackKind::Audio => (Bytes::from_static(OPUS_SILENCE), AUDIO_FRAME),
            TrackKind::Video => (Bytes::from(blank_vp8_frame()), VIDEO_FRAME),
        };

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(frame);
            while !track.is_stopped() {
                ticker.tick().await;
                let sample = Sample {
                    data: payload.clone(),
                    duration: frame,
                    ..Default::default()
                };
                if let Err(e) = track.write_sample(&sample).await {
                    warn!("Synthetic pump for {} stopped: {:#}", track.id(), e);
                    break;
                }
            }
            debug!("Synthetic pump for {} finished", track.id());
        });
    }
}

#[async_trait]
impl MediaSource for SyntheticMediaSource {
    async fn acquire(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<LocalMedia, MediaAcquisitionError> {
        if constraints.video.is_none() && !constraints.audio {
            return Err(MediaAcquisitionError::DeviceUnavailable(
                "no audio or video requested".to_owned(),
            ));
        }

        let stream_id = format!("synthetic-{}", NEXT_STREAM.fetch_add(1, Ordering::Relaxed));
        let mut tracks = Vec::new();
        if constraints.audio {
            tracks.push(LocalTrack::new(TrackKind::Audio, &stream_id));
        }
        if constraints.video.is_some() {
            tracks.push(LocalTrack::new(TrackKind::Video, &stream_id));
        }

        if self.pump {
            for track in &tracks {
                Self::spawn_pump(track.clone());
            }
        }

        Ok(LocalMedia::new(stream_id, tracks))
    }
}

// 1x1 VP8 keyframe header followed by an empty partition.
fn blank_vp8_frame() -> Vec<u8> {
    vec![
        0x10, 0x02, 0x00, 0x9d, 0x01, 0x2a, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00,
    ]
}
