use std::sync::Arc;
use tokio::sync::watch;

/// A stream handed to a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkStream {
    pub stream_id: String,
    pub track_ids: Vec<String>,
}

/// Where a session shows video. Rendering itself happens elsewhere.
pub trait VideoSink: Send + Sync {
    fn attach(&self, stream: SinkStream);
    fn detach(&self);
}

/// A sink that only remembers what is bound to it.
#[derive(Clone)]
pub struct SinkSlot {
    current: Arc<watch::Sender<Option<SinkStream>>>,
}

impl SinkSlot {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            current: Arc::new(tx),
        }
    }

    pub fn current(&self) -> Option<SinkStream> {
        self.current.borrow().clone()
    }

    pub fn is_attached(&self) -> bool {
        self.current.borrow().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<SinkStream>> {
        self.current.subscribe()
    }
}

impl Default for SinkSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoSink for SinkSlot {
    fn attach(&self, stream: SinkStream) {
        self.current.send_replace(Some(stream));
    }

    fn detach(&self) {
        self.current.send_replace(None);
    }
}
