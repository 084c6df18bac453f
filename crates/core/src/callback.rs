// Callback sink for player events
// One tagged event type instead of a listener interface with many hooks

use crate::error::PlayerError;
use crate::surface::SurfaceHandle;
use std::sync::Arc;

/// Player event types
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackEvent {
    /// Playback resumed (optimistic, before decoder confirmation)
    Resume,

    /// Render surface was rebound
    SetSurfaceTexture(SurfaceHandle),

    /// Decoder finished preparing
    Prepared,

    /// Decoder started presenting frames
    Start,

    /// Playback stopped
    Stopped,

    /// Playback paused
    Paused,

    /// Seek resolved at this position
    SeekTo { position_ms: u64 },

    /// Periodic progress report while playing
    ProgressChanged { total_ms: u64, progress_ms: u64 },

    /// Reached the end of the media
    Completion,

    /// Fatal error
    Error(PlayerError),

    /// Decoded video size changed
    VideoSizeChanged { width: u32, height: u32 },
}

/// Player callback trait
/// Implementations should be lightweight and non-blocking
pub trait PlayerCallback: Send + Sync {
    /// Called when an event occurs, on the player's thread
    fn on_event(&self, event: CallbackEvent);
}

/// Holds the optional callback sink of a player
#[derive(Default)]
pub struct CallbackManager {
    callback: Option<Arc<dyn PlayerCallback>>,
}

impl CallbackManager {
    pub fn new() -> Self {
        Self { callback: None }
    }

    pub fn set_callback(&mut self, callback: Option<Arc<dyn PlayerCallback>>) {
        self.callback = callback;
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    pub fn dispatch_event(&self, event: CallbackEvent) {
        if let Some(callback) = &self.callback {
            callback.on_event(event);
        }
    }
}

/// Simple callback implementation for testing
#[cfg(test)]
pub struct TestCallback {
    events: parking_lot::Mutex<Vec<CallbackEvent>>,
}

#[cfg(test)]
impl TestCallback {
    pub fn new() -> Self {
        Self {
            events: parking_lot::Mutex::new(Vec::new()),
        }
    }

    pub fn get_events(&self) -> Vec<CallbackEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn progress_events(&self) -> Vec<(u64, u64)> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                CallbackEvent::ProgressChanged {
                    total_ms,
                    progress_ms,
                } => Some((*total_ms, *progress_ms)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
impl PlayerCallback for TestCallback {
    fn on_event(&self, event: CallbackEvent) {
        self.events.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_without_callback_is_noop() {
        let manager = CallbackManager::new();
        assert!(!manager.has_callback());
        manager.dispatch_event(CallbackEvent::Prepared);
    }

    #[test]
    fn test_dispatch_reaches_callback() {
        let test_callback = Arc::new(TestCallback::new());
        let mut manager = CallbackManager::new();
        manager.set_callback(Some(test_callback.clone()));

        manager.dispatch_event(CallbackEvent::Prepared);
        manager.dispatch_event(CallbackEvent::SeekTo { position_ms: 5000 });

        assert_eq!(
            test_callback.get_events(),
            vec![
                CallbackEvent::Prepared,
                CallbackEvent::SeekTo { position_ms: 5000 }
            ]
        );

        manager.set_callback(None);
        manager.dispatch_event(CallbackEvent::Completion);
        assert_eq!(test_callback.get_events().len(), 2);
    }
}
