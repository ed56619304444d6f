use crate::media::{LocalTrack, TrackKind};
use crate::media::SinkStream;

/// The local track set of one session, all in a single stream.
#[derive(Debug, Clone)]
pub struct LocalMedia {
    stream_id: String,
    tracks: Vec<LocalTrack>,
}

impl LocalMedia {
    pub fn new(stream_id: impl Into<String>, tracks: Vec<LocalTrack>) -> Self {
        Self {
            stream_id: stream_id.into(),
            tracks,
        }
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    pub fn tracks(&self) -> &[LocalTrack] {
        &self.tracks
    }

    pub fn of_kind(&self, kind: TrackKind) -> impl Iterator<Item = &LocalTrack> {
        self.tracks.iter().filter(move |t| t.kind() == kind)
    }

    pub fn first_of_kind(&self, kind: TrackKind) -> Option<&LocalTrack> {
        self.of_kind(kind).next()
    }

    pub fn push(&mut self, track: LocalTrack) {
        self.tracks.push(track);
    }

    /// Swaps the track with id `old_id` for `track`, keeping its position.
    pub fn replace(&mut self, old_id: &str, track: LocalTrack) -> Option<LocalTrack> {
        let slot = self.tracks.iter_mut().find(|t| t.id() == old_id)?;
        Some(std::mem::replace(slot, track))
    }

    /// Flips every track of `kind`. Returns the new state, or `None` if there
    /// is no such track.
    pub fn toggle(&self, kind: TrackKind) -> Option<bool> {
        let enabled = !self.first_of_kind(kind)?.is_enabled();
        for track in self.of_kind(kind) {
            track.set_enabled(enabled);
        }
        Some(enabled)
    }

    pub fn is_enabled(&self, kind: TrackKind) -> bool {
        self.of_kind(kind).any(|t| t.is_enabled())
    }

    pub fn stream(&self) -> SinkStream {
        SinkStream {
            stream_id: self.stream_id.clone(),
            track_ids: self.tracks.iter().map(|t| t.id().to_owned()).collect(),
        }
    }

    pub fn stop_all(&mut self) {
        for track in self.tracks.drain(..) {
            track.stop();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }
}
