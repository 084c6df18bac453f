// Native decoder seam
// Platform glue (JNI to android.media.MediaPlayer, a desktop decoder, a test
// fake) implements NativeDecoder and reports back through a channel.

use crossbeam_channel::Sender;
use fiveplayer_core::{Result, SurfaceHandle};
use std::sync::Arc;

/// `MEDIA_INFO_VIDEO_RENDERING_START`
pub const MEDIA_INFO_VIDEO_RENDERING_START: i32 = 3;
/// `MEDIA_INFO_BUFFERING_START`
pub const MEDIA_INFO_BUFFERING_START: i32 = 701;
/// `MEDIA_INFO_BUFFERING_END`
pub const MEDIA_INFO_BUFFERING_END: i32 = 702;
/// `MEDIA_INFO_NOT_SEEKABLE`
pub const MEDIA_INFO_NOT_SEEKABLE: i32 = 801;

/// Raw events of the native decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeEvent {
    Prepared,
    Completion,
    BufferingUpdate(u8),
    SeekComplete,
    Error { what: i32, extra: i32 },
    RenderingStart,
    BufferingStart,
    BufferingEnd,
    NotSeekable,
    /// Any other info code
    Info { what: i32, extra: i32 },
    VideoSizeChanged { width: u32, height: u32 },
}

impl NativeEvent {
    /// Map a platform `onInfo(what, extra)` pair
    pub fn from_info(what: i32, extra: i32) -> Self {
        match what {
            MEDIA_INFO_VIDEO_RENDERING_START => NativeEvent::RenderingStart,
            MEDIA_INFO_BUFFERING_START => NativeEvent::BufferingStart,
            MEDIA_INFO_BUFFERING_END => NativeEvent::BufferingEnd,
            MEDIA_INFO_NOT_SEEKABLE => NativeEvent::NotSeekable,
            _ => NativeEvent::Info { what, extra },
        }
    }
}

/// Audio stream the decoder plays on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioStream {
    #[default]
    Music,
    VoiceCall,
    Alarm,
    Notification,
}

/// Volume entry point of a decoder, callable from another thread.
///
/// The call may block briefly on the audio subsystem.
pub trait VolumeControl: Send + Sync {
    fn set_volume(&self, left: f32, right: f32);
}

/// Native media decoder.
///
/// Commands return immediately; completion is reported later on the
/// listener channel. Only the data-source and prepare calls can fail
/// synchronously.
pub trait NativeDecoder {
    /// Channel for asynchronous decoder events
    fn set_listener(&mut self, events: Sender<NativeEvent>);

    fn set_audio_stream_type(&mut self, stream: AudioStream);

    fn set_looping(&mut self, looping: bool);

    fn set_screen_on_while_playing(&mut self, screen_on: bool);

    fn set_surface(&mut self, handle: SurfaceHandle);

    fn set_data_source(&mut self, locator: &str) -> Result<()>;

    /// Start preparing; `NativeEvent::Prepared` follows on success
    fn prepare_async(&mut self) -> Result<()>;

    fn start(&mut self);

    fn pause(&mut self);

    fn stop(&mut self);

    fn seek_to(&mut self, position_ms: u64);

    fn reset(&mut self);

    fn release(&mut self);

    fn duration(&self) -> u64;

    fn current_position(&self) -> u64;

    fn is_playing(&self) -> bool;

    /// Handle the volume worker uses instead of the decoder itself
    fn volume_control(&self) -> Arc<dyn VolumeControl>;

    /// Applying a speed may start playback as a side effect
    fn set_playback_speed(&mut self, speed: f32) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_mapping() {
        assert_eq!(NativeEvent::from_info(3, 0), NativeEvent::RenderingStart);
        assert_eq!(NativeEvent::from_info(701, 0), NativeEvent::BufferingStart);
        assert_eq!(NativeEvent::from_info(702, 0), NativeEvent::BufferingEnd);
        assert_eq!(NativeEvent::from_info(801, 0), NativeEvent::NotSeekable);
        assert_eq!(
            NativeEvent::from_info(802, 1),
            NativeEvent::Info { what: 802, extra: 1 }
        );
    }
}
