// Playback state of the video player

use std::fmt;

/// Playback state.
///
/// Exactly one value is held by [`FivePlayer`](crate::FivePlayer) at any time.
/// Kernels never set it; they only report events that the player turns into
/// transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaybackState {
    /// No media source has been handed to the kernel
    #[default]
    Idle,
    /// Media source handed to the kernel, waiting for the decoder
    Preparing,
    /// Decoder is ready to start
    Prepared,
    /// Frames are flowing
    Playing,
    /// Playback is paused
    Paused,
    /// Decoder stalled for data while playing
    BufferingPlaying,
    /// Decoder stalled for data while paused
    BufferingPaused,
    /// Playback has stopped
    Stopped,
    /// Reached the end of the media
    Complete,
    /// Decoder reported a fatal error
    Error,
}

impl PlaybackState {
    pub fn is_buffering(self) -> bool {
        matches!(
            self,
            PlaybackState::BufferingPlaying | PlaybackState::BufferingPaused
        )
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(PlaybackState::default(), PlaybackState::Idle);
    }

    #[test]
    fn test_buffering_states() {
        assert!(PlaybackState::BufferingPlaying.is_buffering());
        assert!(PlaybackState::BufferingPaused.is_buffering());
        assert!(!PlaybackState::Playing.is_buffering());
    }
}
