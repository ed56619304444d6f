mod candidate_buffer;
mod connection_event_impl;
mod create_connection_impl;
mod handle;
mod handle_remote_offer_impl;
mod handle_signal_impl;
mod lifecycle_impl;
mod session_command;
mod session_event;
mod start_offer_impl;
mod state;

pub use candidate_buffer::*;
pub use handle::*;
pub use session_command::*;
pub use session_event::*;
pub use state::*;

use crate::channel::SignalingChannel;
use crate::config::SessionConfig;
use crate::error::ChannelError;
use crate::media::{LocalMedia, MediaSource, SinkSlot, TrackKind, VideoSink};
use crate::transport::{ConnectionEvent, ConnectionFactory, MediaConnection, RemoteTrack};
use duet_core::{ClientMessage, RoomCode};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};

/// One participant's side of a call.
///
/// Runs as a single actor: local commands, relay messages, connection events
/// and the negotiation deadline are multiplexed into one loop and handled one
/// at a time, so no step ever interleaves with another.
pub struct PeerSession {
    config: SessionConfig,
    channel: Box<dyn SignalingChannel>,
    channel_open: bool,
    connections: Arc<dyn ConnectionFactory>,
    media_source: Arc<dyn MediaSource>,
    local_sink: Arc<dyn VideoSink>,
    remote_sink: Arc<dyn VideoSink>,

    commands: mpsc::Receiver<SessionCommand>,
    conn_events: mpsc::UnboundedReceiver<ConnectionEvent>,
    conn_events_tx: mpsc::UnboundedSender<ConnectionEvent>,
    events: mpsc::UnboundedSender<SessionEvent>,
    snapshot: watch::Sender<SessionSnapshot>,

    state: SessionState,
    role: Option<Role>,
    room: Option<RoomCode>,
    connection: Option<Arc<dyn MediaConnection>>,
    local_media: Option<LocalMedia>,
    /// Ids of the local tracks that currently have a sender.
    senders: Vec<String>,
    remote_tracks: Vec<RemoteTrack>,
    candidates: CandidateBuffer,
    remote_description_set: bool,
    peer_connected: bool,
    tracker: NegotiationTracker,
    deadline: Option<Instant>,
    released: bool,
    finished: bool,
}

impl PeerSession {
    pub fn new(
        config: SessionConfig,
        channel: impl SignalingChannel + 'static,
        connections: Arc<dyn ConnectionFactory>,
        media_source: Arc<dyn MediaSource>,
    ) -> (Self, SessionHandle, mpsc::UnboundedReceiver<SessionEvent>) {
        let (command_tx, commands) = mpsc::channel(32);
        let (conn_events_tx, conn_events) = mpsc::unbounded_channel();
        let (events, events_rx) = mpsc::unbounded_channel();
        let (snapshot, snapshot_rx) = watch::channel(SessionSnapshot::default());

        let session = Self {
            config,
            channel: Box::new(channel),
            channel_open: true,
            connections,
            media_source,
            local_sink: Arc::new(SinkSlot::new()),
            remote_sink: Arc::new(SinkSlot::new()),
            commands,
            conn_events,
            conn_events_tx,
            events,
            snapshot,
            state: SessionState::Idle,
            role: None,
            room: None,
            connection: None,
            local_media: None,
            senders: Vec::new(),
            remote_tracks: Vec::new(),
            candidates: CandidateBuffer::default(),
            remote_description_set: false,
            peer_connected: false,
            tracker: NegotiationTracker::default(),
            deadline: None,
            released: false,
            finished: false,
        };

        (session, SessionHandle::new(command_tx, snapshot_rx), events_rx)
    }

    pub fn with_sinks(mut self, local: Arc<dyn VideoSink>, remote: Arc<dyn VideoSink>) -> Self {
        self.local_sink = local;
        self.remote_sink = remote;
        self
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(mut self) {
        info!("Session event loop started");

        while !self.finished {
            let deadline = self.deadline;

            tokio::select! {
                biased;

                cmd = self.commands.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("Session handle dropped, ending call");
                            self.end_call().await;
                        }
                    }
                }

                msg = self.channel.recv(), if self.channel_open => {
                    match msg {
                        Some(m) => self.handle_signal(m).await,
                        None => {
                            warn!("Signaling channel closed");
                            self.channel_open = false;
                        }
                    }
                }

                Some(evt) = self.conn_events.recv() => {
                    self.handle_connection_event(evt).await;
                }

                _ = expire(deadline) => self.negotiation_timed_out().await,
            }

            self.publish();
        }

        info!("Session event loop finished");
    }

    /// Replies go out after the snapshot is published, so a caller that saw
    /// its reply also sees the state it produced.
    async fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Join { room, reply } => {
                let result = self.join(room).await;
                self.publish();
                let _ = reply.send(result);
            }
            SessionCommand::ToggleMic { reply } => {
                let result = self.toggle(TrackKind::Audio);
                self.publish();
                let _ = reply.send(result);
            }
            SessionCommand::ToggleCamera { reply } => {
                let result = self.toggle(TrackKind::Video);
                self.publish();
                let _ = reply.send(result);
            }
            SessionCommand::RefreshCamera { reply } => {
                let result = self.refresh_camera().await;
                self.publish();
                let _ = reply.send(result);
            }
            SessionCommand::AttachTrack { track, reply } => {
                let result = self.attach_track(track).await;
                self.publish();
                let _ = reply.send(result);
            }
            SessionCommand::EndCall { reply } => {
                self.end_call().await;
                self.publish();
                let _ = reply.send(());
            }
        }
    }

    fn set_state(&mut self, next: SessionState) {
        if self.state == next {
            return;
        }
        info!("Session {:?} -> {:?}", self.state, next);
        self.state = next;
        self.emit(SessionEvent::StateChanged(next));
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    fn arm_deadline(&mut self) {
        self.deadline = Some(Instant::now() + self.config.negotiation_timeout);
    }

    fn clear_deadline(&mut self) {
        self.deadline = None;
    }

    async fn send_signal(&mut self, msg: ClientMessage) -> Result<(), ChannelError> {
        self.channel.send(msg).await
    }

    fn publish(&self) {
        let media = self.local_media.as_ref();
        self.snapshot.send_replace(SessionSnapshot {
            state: self.state,
            role: self.role,
            remote_description_set: self.remote_description_set,
            buffered_candidates: self.candidates.len(),
            local_tracks: media.map_or(0, |m| m.len()),
            peer_connected: self.peer_connected,
            mic_enabled: media.is_some_and(|m| m.is_enabled(TrackKind::Audio)),
            camera_enabled: media.is_some_and(|m| m.is_enabled(TrackKind::Video)),
        });
    }
}

async fn expire(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
