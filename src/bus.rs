use std::sync::Arc;
use tokio::sync::broadcast;

use isomap_navigation::projection::PixelPos;

/// Events produced by the camera and consumed by the view task.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraEvent {
    /// The camera centre moved.
    Moved(PixelPos),
    /// The user tapped the map at a pixel position.
    Tap(PixelPos),
    /// The camera is done; subscribers should wind down.
    Stop,
}

/// Broadcast topic with bounded capacity.
/// `T` must be `Send + Sync` because we hop across threads.
#[derive(Debug, Clone)]
pub struct Topic<T> {
    tx: broadcast::Sender<Arc<T>>,
}

impl<T: Send + Sync + 'static> Topic<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Returns the number of subscribers that received the message.
    pub fn publish(&self, msg: T) -> usize {
        self.tx.send(Arc::new(msg)).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<T>> {
        self.tx.subscribe()
    }
}
