// Decoding kernel contract
// All platform-specific decoder backends implement MediaKernel

use crate::error::PlayerError;
use crate::source::MediaSource;
use crate::state::PlaybackState;
use crate::surface::{SurfaceEvent, SurfaceHandle};

/// Events a kernel reports back to the player.
///
/// Each variant maps to exactly one transition entry point on
/// [`FivePlayer`](crate::FivePlayer).
#[derive(Debug, Clone, PartialEq)]
pub enum KernelEvent {
    /// Async prepare finished
    Prepared,
    /// First frame rendered
    StartRender,
    /// Decoder stalled while playing
    BufferingPlaying,
    /// Decoder stalled while paused
    BufferingPaused,
    /// Decoder is playing (e.g. buffering ended while playing)
    Playing,
    /// Decoder is paused (e.g. buffering ended while paused)
    Paused,
    /// Decoder stopped
    Stopped,
    /// End of media reached
    Completion,
    /// Fatal decoder error; benign codes never reach the player
    Error(PlayerError),
    /// Seek resolved at a known position
    SeekTo(u64),
    /// Seek finished; the position is read back from the kernel
    SeekComplete,
    /// Network buffer fill level in percent
    BufferingUpdate(u8),
    /// Decoded video size changed
    VideoSizeChanged { width: u32, height: u32 },
    /// The decode session was moved to a new surface handle
    SurfaceRebound(SurfaceHandle),
}

/// Core decoding kernel trait.
///
/// Every command is synchronous and forwarded to the native decoder; its
/// outcome arrives later through [`MediaKernel::next_event`]. Commands never
/// fail synchronously: a native failure becomes a queued
/// [`KernelEvent::Error`].
pub trait MediaKernel {
    /// Short backend name used in logs
    fn name(&self) -> &str;

    /// Bind a media source and start an async prepare.
    ///
    /// Deferred until a surface handle exists; the stored source is retried
    /// once [`MediaKernel::surface_available`] delivers one.
    fn prepare(&mut self, source: MediaSource);

    fn start(&mut self);

    /// Seek to `position_ms`, then start
    fn start_at(&mut self, position_ms: u64);

    fn pause(&mut self);

    fn stop(&mut self);

    fn resume(&mut self);

    fn seek_to(&mut self, position_ms: u64);

    fn reset(&mut self);

    /// Free native resources. Must be safe to call more than once.
    fn release(&mut self);

    /// Total duration in milliseconds, 0 when unknown
    fn duration(&self) -> u64;

    /// Current position in milliseconds
    fn current_position(&self) -> u64;

    fn is_playing(&self) -> bool;

    /// Set channel volumes (0.0 - 1.0). May be applied off-thread.
    fn set_volume(&mut self, left: f32, right: f32);

    /// Set playback speed (1.0 = normal)
    fn set_speed(&mut self, speed: f32);

    /// Rebind the decode session to another surface
    fn set_surface(&mut self, handle: SurfaceHandle);

    /// A surface became available
    fn surface_available(&mut self, handle: SurfaceHandle, width: u32, height: u32);

    fn surface_size_changed(&mut self, _width: u32, _height: u32) {}

    /// Surface is being destroyed. Returns `true` when the surface adapter may
    /// release the handle, `false` when the kernel keeps it.
    fn surface_destroyed(&mut self) -> bool {
        true
    }

    fn surface_updated(&mut self) {}

    /// Route a surface lifecycle event to the matching hook.
    fn on_surface_event(&mut self, event: SurfaceEvent) -> bool {
        match event {
            SurfaceEvent::Available {
                handle,
                width,
                height,
            } => {
                self.surface_available(handle, width, height);
                false
            }
            SurfaceEvent::SizeChanged { width, height } => {
                self.surface_size_changed(width, height);
                false
            }
            SurfaceEvent::Destroyed => self.surface_destroyed(),
            SurfaceEvent::Updated => {
                self.surface_updated();
                false
            }
        }
    }

    /// Next pending event, translated against the player's current state.
    ///
    /// Called one event at a time so every translation sees the state left
    /// by the previous one.
    fn next_event(&mut self, state: PlaybackState) -> Option<KernelEvent>;
}
