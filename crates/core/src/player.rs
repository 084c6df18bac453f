// Player facade and playback state machine
//
// State follows what the decoder reports, not what a command asked for:
// start() only issues the command, Playing is entered on StartRender.

use crate::callback::{CallbackEvent, CallbackManager, PlayerCallback};
use crate::error::{PlayerError, Result};
use crate::kernel::{KernelEvent, MediaKernel};
use crate::source::MediaSource;
use crate::state::PlaybackState;
use crate::surface::{RenderSurface, SurfaceBinding, SurfaceEvent, SurfaceHandle};
use crate::ticker::{Clock, ProgressTicker, SystemClock, PROGRESS_INTERVAL_MS};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Player configuration
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Interval of progress reports while playing
    pub progress_interval: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            progress_interval: Duration::from_millis(PROGRESS_INTERVAL_MS),
        }
    }
}

/// Video player.
///
/// Single-threaded: commands, kernel events and progress reports all run on
/// the thread that owns the player. The host loop calls [`FivePlayer::poll`]
/// to deliver kernel events and fire the progress ticker.
pub struct FivePlayer {
    kernel: Box<dyn MediaKernel>,
    state: PlaybackState,
    source: Option<MediaSource>,
    callbacks: CallbackManager,
    render_surface: Option<Box<dyn RenderSurface>>,
    surface: SurfaceBinding,
    ticker: ProgressTicker,
    clock: Arc<dyn Clock>,
    buffered_percent: u8,
    released: bool,
}

impl FivePlayer {
    pub fn new(kernel: Box<dyn MediaKernel>) -> Self {
        Self::with_config(kernel, PlayerConfig::default())
    }

    pub fn with_config(kernel: Box<dyn MediaKernel>, config: PlayerConfig) -> Self {
        log::info!("FivePlayer::new kernel={}", kernel.name());
        Self {
            kernel,
            state: PlaybackState::Idle,
            source: None,
            callbacks: CallbackManager::new(),
            render_surface: None,
            surface: SurfaceBinding::default(),
            ticker: ProgressTicker::new(config.progress_interval),
            clock: Arc::new(SystemClock),
            buffered_percent: 0,
            released: false,
        }
    }

    /// Replace the time source of the progress ticker
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn attach_render_surface(&mut self, surface: Box<dyn RenderSurface>) {
        self.render_surface = Some(surface);
    }

    pub fn set_callback(&mut self, callback: Option<Arc<dyn PlayerCallback>>) {
        self.callbacks.set_callback(callback);
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn media_source(&self) -> Option<&MediaSource> {
        self.source.as_ref()
    }

    pub fn kernel_name(&self) -> &str {
        self.kernel.name()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Whether a progress report is pending
    pub fn is_progress_scheduled(&self) -> bool {
        self.ticker.is_scheduled()
    }

    /// When the host loop should poll again for the next progress report
    pub fn next_progress_deadline(&self) -> Option<Instant> {
        self.ticker.next_due()
    }

    /// Last network buffer fill level reported by the decoder
    pub fn buffered_percent(&self) -> u8 {
        self.buffered_percent
    }

    /// Swap the decoding backend.
    ///
    /// In-flight playback is dropped: the old kernel is released and the
    /// player returns to `Idle`. A known surface is handed to the new kernel.
    pub fn set_media_kernel(&mut self, kernel: Box<dyn MediaKernel>) -> Result<()> {
        self.ensure_not_released()?;
        log::info!(
            "set_media_kernel {} -> {}",
            self.kernel.name(),
            kernel.name()
        );
        self.kernel.release();
        self.kernel = kernel;
        self.source = None;
        self.buffered_percent = 0;
        self.transition(PlaybackState::Idle);

        if let Some(handle) = self.surface.handle {
            self.kernel
                .surface_available(handle, self.surface.width, self.surface.height);
        }
        Ok(())
    }

    /// Build a media source from `locator` and prepare it.
    ///
    /// A blank locator is ignored. Open failures are reported later through
    /// the error callback.
    pub fn set_data_source(&mut self, locator: &str) -> Result<()> {
        self.set_media_source(MediaSource::new(locator))
    }

    pub fn set_media_source(&mut self, source: MediaSource) -> Result<()> {
        self.ensure_not_released()?;
        if !source.has_locator() {
            log::warn!("set_data_source ignored: empty locator");
            return Ok(());
        }
        log::info!("set_data_source {}", source.locator());
        self.source = Some(source.clone());
        self.buffered_percent = 0;
        self.kernel.prepare(source);
        self.transition(PlaybackState::Preparing);
        Ok(())
    }

    pub fn start(&mut self) -> Result<()> {
        self.ensure_active("start")?;
        log::info!("start called");
        self.kernel.start();
        Ok(())
    }

    /// Seek to `position_ms`, then start
    pub fn start_at(&mut self, position_ms: u64) -> Result<()> {
        self.ensure_active("start")?;
        log::info!("start called at {} ms", position_ms);
        self.kernel.start_at(position_ms);
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        self.ensure_active("pause")?;
        log::info!("pause called");
        self.kernel.pause();
        self.on_paused();
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        self.ensure_active("stop")?;
        log::info!("stop called");
        self.kernel.stop();
        self.on_stopped();
        Ok(())
    }

    /// Resume playback.
    ///
    /// Unlike `start`, `Playing` is entered right away without waiting for the
    /// decoder to confirm.
    pub fn resume(&mut self) -> Result<()> {
        self.ensure_active("resume")?;
        log::info!("resume called");
        self.kernel.resume();
        self.callbacks.dispatch_event(CallbackEvent::Resume);
        self.on_playing();
        Ok(())
    }

    pub fn seek_to(&mut self, position_ms: u64) -> Result<()> {
        self.ensure_active("seek")?;
        log::info!("seek called -> {} ms", position_ms);
        self.kernel.seek_to(position_ms);
        Ok(())
    }

    pub fn reset(&mut self) -> Result<()> {
        self.ensure_not_released()?;
        log::info!("reset called");
        self.kernel.reset();
        self.source = None;
        self.buffered_percent = 0;
        self.transition(PlaybackState::Idle);
        Ok(())
    }

    /// Release the kernel and stop progress reports. Terminal; calling it
    /// again does nothing.
    pub fn release(&mut self) -> Result<()> {
        if self.released {
            log::debug!("release called on released player");
            return Ok(());
        }
        log::info!("release called");
        self.ticker.cancel();
        self.kernel.release();
        self.released = true;
        self.transition(PlaybackState::Idle);
        Ok(())
    }

    pub fn duration(&self) -> u64 {
        self.kernel.duration()
    }

    pub fn current_position(&self) -> u64 {
        self.kernel.current_position()
    }

    pub fn is_playing(&self) -> bool {
        self.kernel.is_playing()
    }

    pub fn set_volume(&mut self, left: f32, right: f32) -> Result<()> {
        self.ensure_not_released()?;
        log::info!("set_volume called -> {}/{}", left, right);
        if !(0.0..=1.0).contains(&left) || !(0.0..=1.0).contains(&right) {
            return Err(PlayerError::InvalidArgument(format!(
                "Volume out of range: {}/{}",
                left, right
            )));
        }
        self.kernel.set_volume(left, right);
        Ok(())
    }

    pub fn set_speed(&mut self, speed: f32) -> Result<()> {
        self.ensure_not_released()?;
        log::info!("set_speed called -> {}", speed);
        if speed <= 0.0 {
            return Err(PlayerError::InvalidArgument(
                "Playback speed must be > 0".to_string(),
            ));
        }
        self.kernel.set_speed(speed);
        Ok(())
    }

    /// Rebind a recreated surface on the current kernel without rebuilding it
    pub fn set_surface_texture(&mut self, handle: SurfaceHandle) -> Result<()> {
        self.ensure_not_released()?;
        self.kernel.set_surface(handle);
        self.bind_surface(handle);
        Ok(())
    }

    /// Forward a render-surface lifecycle event to the kernel.
    ///
    /// Returns the kernel's answer for `Destroyed`: whether the adapter may
    /// release the handle itself.
    pub fn on_surface_event(&mut self, event: SurfaceEvent) -> bool {
        if self.released {
            return true;
        }
        self.surface.apply(event);
        self.kernel.on_surface_event(event)
    }

    /// Deliver pending kernel events, then fire the progress ticker if due.
    pub fn poll(&mut self) {
        while !self.released {
            match self.kernel.next_event(self.state) {
                Some(event) => self.dispatch(event),
                None => break,
            }
        }
        if self.released {
            return;
        }

        let now = self.clock.now();
        if self.ticker.fire_if_due(now) {
            let total = self.kernel.duration();
            let progress = self.kernel.current_position();
            self.on_progress_changed(total, progress);
        }
    }

    /// Apply one kernel event. This is the only way kernel activity changes
    /// the player state.
    pub fn dispatch(&mut self, event: KernelEvent) {
        if self.released {
            log::debug!("dropping {:?} on released player", event);
            return;
        }
        match event {
            KernelEvent::Prepared => self.on_prepared(),
            KernelEvent::StartRender => self.on_start_render(),
            KernelEvent::BufferingPlaying => self.on_buffering_playing(),
            KernelEvent::BufferingPaused => self.on_buffering_paused(),
            KernelEvent::Playing => self.on_playing(),
            KernelEvent::Paused => self.on_paused(),
            KernelEvent::Stopped => self.on_stopped(),
            KernelEvent::Completion => self.on_completion(),
            KernelEvent::Error(err) => self.on_error(err),
            KernelEvent::SeekTo(position_ms) => self.on_seek_to(position_ms),
            KernelEvent::SeekComplete => self.on_seek_complete(),
            KernelEvent::BufferingUpdate(percent) => self.on_buffering_update(percent),
            KernelEvent::VideoSizeChanged { width, height } => {
                self.on_video_size_changed(width, height)
            }
            KernelEvent::SurfaceRebound(handle) => self.bind_surface(handle),
        }
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Set the state and keep the ticker in step: it runs only in `Playing`
    /// and restarts on every entry into `Playing`.
    fn transition(&mut self, next: PlaybackState) {
        if self.state != next {
            log::debug!("Player state changed: {:?} -> {:?}", self.state, next);
        }
        self.state = next;
        if next == PlaybackState::Playing {
            self.ticker.restart(self.clock.now());
        } else {
            self.ticker.cancel();
        }
    }

    fn on_prepared(&mut self) {
        self.transition(PlaybackState::Prepared);
        self.callbacks.dispatch_event(CallbackEvent::Prepared);
    }

    /// Outside `Prepared` (e.g. rendering resumes after a seek) the state and
    /// the ticker are left alone; only the `Start` notification goes out.
    fn on_start_render(&mut self) {
        if self.state == PlaybackState::Prepared {
            self.transition(PlaybackState::Playing);
        } else {
            log::debug!("render started in {:?}, state kept", self.state);
        }
        self.callbacks.dispatch_event(CallbackEvent::Start);
    }

    fn on_buffering_playing(&mut self) {
        self.transition(PlaybackState::BufferingPlaying);
    }

    fn on_buffering_paused(&mut self) {
        self.transition(PlaybackState::BufferingPaused);
    }

    fn on_playing(&mut self) {
        self.transition(PlaybackState::Playing);
    }

    fn on_paused(&mut self) {
        self.transition(PlaybackState::Paused);
        self.callbacks.dispatch_event(CallbackEvent::Paused);
    }

    fn on_stopped(&mut self) {
        self.transition(PlaybackState::Stopped);
        self.callbacks.dispatch_event(CallbackEvent::Stopped);
    }

    fn on_completion(&mut self) {
        self.transition(PlaybackState::Complete);
        self.callbacks.dispatch_event(CallbackEvent::Completion);
    }

    fn on_error(&mut self, err: PlayerError) {
        if !err.is_fatal() {
            log::warn!("{} ignoring non-fatal error: {}", self.kernel.name(), err);
            return;
        }
        log::error!("{} Player Exception: {}", self.kernel.name(), err);
        self.transition(PlaybackState::Error);
        self.callbacks.dispatch_event(CallbackEvent::Error(err));
    }

    fn on_seek_to(&mut self, position_ms: u64) {
        self.callbacks
            .dispatch_event(CallbackEvent::SeekTo { position_ms });
    }

    fn on_seek_complete(&mut self) {
        let position_ms = self.kernel.current_position();
        self.on_seek_to(position_ms);
    }

    fn on_buffering_update(&mut self, percent: u8) {
        self.buffered_percent = percent.min(100);
    }

    fn on_progress_changed(&mut self, total_ms: u64, progress_ms: u64) {
        self.callbacks.dispatch_event(CallbackEvent::ProgressChanged {
            total_ms,
            progress_ms,
        });
    }

    fn on_video_size_changed(&mut self, width: u32, height: u32) {
        if let Some(surface) = self.render_surface.as_mut() {
            surface.resize_video(width, height);
        }
        self.callbacks
            .dispatch_event(CallbackEvent::VideoSizeChanged { width, height });
    }

    fn bind_surface(&mut self, handle: SurfaceHandle) {
        self.surface.handle = Some(handle);
        if let Some(surface) = self.render_surface.as_mut() {
            surface.set_surface_handle(handle);
        }
        self.callbacks
            .dispatch_event(CallbackEvent::SetSurfaceTexture(handle));
    }

    // -------------------------------------------------------------------------
    // Guards
    // -------------------------------------------------------------------------

    fn ensure_not_released(&self) -> Result<()> {
        if self.released {
            Err(PlayerError::Released)
        } else {
            Ok(())
        }
    }

    /// Transport commands are inert after an error until reset or a new source
    fn ensure_active(&self, command: &str) -> Result<()> {
        self.ensure_not_released()?;
        if self.state == PlaybackState::Error {
            log::warn!("{} ignored: player is in Error", command);
            return Err(PlayerError::InvalidState(format!(
                "{} not allowed in Error state",
                command
            )));
        }
        Ok(())
    }
}

impl Drop for FivePlayer {
    fn drop(&mut self) {
        if !self.released {
            self.ticker.cancel();
            self.kernel.release();
        }
    }
}
