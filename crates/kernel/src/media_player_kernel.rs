// MediaKernel backed by a native platform decoder

use crate::config::KernelConfig;
use crate::native::{NativeDecoder, NativeEvent, VolumeControl};
use crossbeam_channel::{Receiver, Sender};
use fiveplayer_core::{
    KernelEvent, MediaKernel, MediaSource, PlaybackState, PlayerError, SurfaceHandle,
};
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;

/// Creates a fresh native decoder
pub type DecoderFactory = Box<dyn FnMut() -> Box<dyn NativeDecoder>>;

struct VolumeChange {
    control: Arc<dyn VolumeControl>,
    left: f32,
    right: f32,
}

/// Applies volume changes off the player thread
struct VolumeWorker {
    tx: Sender<VolumeChange>,
    handle: thread::JoinHandle<()>,
}

impl VolumeWorker {
    fn spawn() -> Option<Self> {
        let (tx, rx) = crossbeam_channel::unbounded::<VolumeChange>();
        let handle = thread::Builder::new()
            .name("fiveplayer-volume".into())
            .spawn(move || {
                for change in rx {
                    change.control.set_volume(change.left, change.right);
                }
            });
        match handle {
            Ok(handle) => Some(Self { tx, handle }),
            Err(e) => {
                log::error!("[kernel] failed to spawn volume worker: {}", e);
                None
            }
        }
    }

    /// Apply everything queued so far, then stop the thread
    fn finish(self) {
        drop(self.tx);
        if self.handle.join().is_err() {
            log::error!("[kernel] volume worker panicked");
        }
    }
}

/// Kernel wrapping a [`NativeDecoder`].
///
/// Owns the decoder, the last surface handle and the last media source.
/// Native callbacks are translated into [`KernelEvent`]s when the player
/// polls; failures during prepare are queued as errors, never returned.
pub struct MediaPlayerKernel {
    config: KernelConfig,
    factory: DecoderFactory,
    /// `None` once released
    decoder: Option<Box<dyn NativeDecoder>>,
    events: Receiver<NativeEvent>,
    pending: VecDeque<KernelEvent>,
    surface: Option<SurfaceHandle>,
    source: Option<MediaSource>,
    /// A data source has been handed to the current decoder
    session_bound: bool,
    volume: Option<VolumeWorker>,
    released: bool,
}

impl MediaPlayerKernel {
    pub fn new(factory: DecoderFactory) -> Self {
        Self::with_config(factory, KernelConfig::default())
    }

    pub fn with_config(mut factory: DecoderFactory, config: KernelConfig) -> Self {
        let (decoder, events) = Self::create_decoder(&mut factory);
        Self {
            config,
            factory,
            decoder: Some(decoder),
            events,
            pending: VecDeque::new(),
            surface: None,
            source: None,
            session_bound: false,
            volume: None,
            released: false,
        }
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn surface(&self) -> Option<SurfaceHandle> {
        self.surface
    }

    pub fn media_source(&self) -> Option<&MediaSource> {
        self.source.as_ref()
    }

    pub fn has_decoder(&self) -> bool {
        self.decoder.is_some()
    }

    /// Each decoder gets its own channel so events of a torn-down decoder
    /// never reach the player.
    fn create_decoder(
        factory: &mut DecoderFactory,
    ) -> (Box<dyn NativeDecoder>, Receiver<NativeEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut decoder = factory();
        decoder.set_listener(tx);
        (decoder, rx)
    }

    fn ensure_decoder(&mut self) {
        if self.decoder.is_none() {
            log::info!("[kernel] creating native decoder");
            let (decoder, events) = Self::create_decoder(&mut self.factory);
            self.decoder = Some(decoder);
            self.events = events;
        }
    }

    fn with_decoder<R>(&mut self, f: impl FnOnce(&mut dyn NativeDecoder) -> R) -> Option<R> {
        match self.decoder.as_mut() {
            Some(decoder) => Some(f(&mut **decoder)),
            None => {
                log::debug!("[kernel] no native decoder");
                None
            }
        }
    }

    fn query<R>(&self, f: impl FnOnce(&dyn NativeDecoder) -> R) -> Option<R> {
        match self.decoder.as_deref() {
            Some(decoder) => Some(f(decoder)),
            None => None,
        }
    }

    /// Drain the volume worker, then release the decoder
    fn release_decoder(&mut self) {
        if let Some(worker) = self.volume.take() {
            worker.finish();
        }
        if let Some(mut decoder) = self.decoder.take() {
            log::info!("[kernel] releasing native decoder");
            decoder.release();
        }
        self.events = crossbeam_channel::never();
        self.session_bound = false;
    }

    /// Hand the stored source to the decoder bound to `surface`
    fn open_source(&mut self, surface: SurfaceHandle) {
        let Some(source) = self.source.clone() else {
            return;
        };
        self.ensure_decoder();

        let rebind = self.session_bound;
        let config = self.config.clone();
        let result = self.with_decoder(|decoder| {
            if rebind {
                decoder.reset();
            }
            decoder.set_audio_stream_type(config.audio_stream);
            decoder.set_looping(source.is_looping());
            decoder.set_screen_on_while_playing(config.screen_on_while_playing);
            decoder.set_surface(surface);
            decoder.set_data_source(source.locator())?;
            decoder.prepare_async()
        });
        self.session_bound = true;

        let err = match result {
            Some(Ok(())) => {
                log::info!("[kernel] preparing {}", source.locator());
                return;
            }
            Some(Err(PlayerError::Prepare(msg))) => PlayerError::Prepare(msg),
            Some(Err(e)) => PlayerError::Prepare(e.to_string()),
            None => PlayerError::Prepare("native decoder unavailable".into()),
        };
        log::error!("[kernel] prepare failed for {}: {}", source.locator(), err);
        self.release_decoder();
        self.pending.push_back(KernelEvent::Error(err));
    }

    fn translate(&mut self, event: NativeEvent, state: PlaybackState) -> Option<KernelEvent> {
        match event {
            NativeEvent::Prepared => Some(KernelEvent::Prepared),
            NativeEvent::Completion => Some(KernelEvent::Completion),
            NativeEvent::BufferingUpdate(percent) => Some(KernelEvent::BufferingUpdate(percent)),
            NativeEvent::SeekComplete => Some(KernelEvent::SeekComplete),
            NativeEvent::VideoSizeChanged { width, height } => {
                Some(KernelEvent::VideoSizeChanged { width, height })
            }
            NativeEvent::RenderingStart => {
                log::info!("[kernel] rendering start");
                Some(KernelEvent::StartRender)
            }
            NativeEvent::BufferingStart => match state {
                PlaybackState::Paused | PlaybackState::BufferingPaused => {
                    log::info!("[kernel] buffering start while paused");
                    Some(KernelEvent::BufferingPaused)
                }
                _ => {
                    log::info!("[kernel] buffering start while playing");
                    Some(KernelEvent::BufferingPlaying)
                }
            },
            NativeEvent::BufferingEnd => match state {
                PlaybackState::BufferingPlaying => {
                    log::info!("[kernel] buffering end, playing");
                    Some(KernelEvent::Playing)
                }
                PlaybackState::BufferingPaused => {
                    log::info!("[kernel] buffering end, paused");
                    Some(KernelEvent::Paused)
                }
                _ => None,
            },
            NativeEvent::NotSeekable => {
                log::warn!("[kernel] media cannot seek (live stream)");
                None
            }
            NativeEvent::Info { what, extra } => {
                log::info!("[kernel] info what={} extra={}", what, extra);
                None
            }
            NativeEvent::Error { what, extra } => {
                if self.config.is_benign(what, extra) {
                    log::debug!("[kernel] ignoring decoder warning what={} extra={}", what, extra);
                    None
                } else {
                    log::error!("[kernel] decoder error what={} extra={}", what, extra);
                    self.release_decoder();
                    Some(KernelEvent::Error(PlayerError::Decoder { what, extra }))
                }
            }
        }
    }
}

impl MediaKernel for MediaPlayerKernel {
    fn name(&self) -> &str {
        "MediaPlayerKernel"
    }

    fn prepare(&mut self, source: MediaSource) {
        if self.released {
            log::warn!("[kernel] prepare ignored: kernel released");
            return;
        }
        self.source = Some(source);
        self.pending.clear();
        match self.surface {
            Some(surface) => self.open_source(surface),
            None => log::info!("[kernel] prepare deferred until a surface is available"),
        }
    }

    fn start(&mut self) {
        self.with_decoder(|decoder| decoder.start());
    }

    fn start_at(&mut self, position_ms: u64) {
        self.seek_to(position_ms);
        self.start();
    }

    fn pause(&mut self) {
        self.with_decoder(|decoder| decoder.pause());
    }

    fn stop(&mut self) {
        self.with_decoder(|decoder| decoder.stop());
    }

    fn resume(&mut self) {
        self.with_decoder(|decoder| decoder.start());
    }

    fn seek_to(&mut self, position_ms: u64) {
        self.with_decoder(|decoder| decoder.seek_to(position_ms));
    }

    fn reset(&mut self) {
        self.with_decoder(|decoder| decoder.reset());
        self.source = None;
        self.session_bound = false;
        self.pending.clear();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        log::info!("[kernel] release");
        self.release_decoder();
        self.pending.clear();
        self.source = None;
        self.released = true;
    }

    fn duration(&self) -> u64 {
        self.query(|decoder| decoder.duration()).unwrap_or(0)
    }

    fn current_position(&self) -> u64 {
        self.query(|decoder| decoder.current_position())
            .unwrap_or(0)
    }

    fn is_playing(&self) -> bool {
        self.query(|decoder| decoder.is_playing())
            .unwrap_or(false)
    }

    fn set_volume(&mut self, left: f32, right: f32) {
        if self.released {
            return;
        }
        let Some(control) = self.query(|decoder| decoder.volume_control()) else {
            log::debug!("[kernel] volume change without decoder dropped");
            return;
        };
        if self.volume.is_none() {
            self.volume = VolumeWorker::spawn();
        }
        match &self.volume {
            Some(worker) => {
                let change = VolumeChange {
                    control,
                    left,
                    right,
                };
                if worker.tx.send(change).is_err() {
                    log::warn!("[kernel] volume worker gone");
                }
            }
            None => control.set_volume(left, right),
        }
    }

    fn set_speed(&mut self, speed: f32) {
        self.with_decoder(|decoder| {
            let was_playing = decoder.is_playing();
            match decoder.set_playback_speed(speed) {
                Ok(()) => {
                    if !was_playing {
                        decoder.pause();
                    }
                }
                Err(e) => log::warn!("[kernel] set_speed {} failed: {}", speed, e),
            }
        });
    }

    fn set_surface(&mut self, handle: SurfaceHandle) {
        if self.released {
            return;
        }
        let had_surface = self.surface.replace(handle).is_some();
        if self.session_bound {
            self.with_decoder(|decoder| decoder.set_surface(handle));
        } else if self.source.is_some() {
            log::info!(
                "[kernel] surface {} arrived, retrying deferred prepare",
                if had_surface { "replaced" } else { "first" }
            );
            self.open_source(handle);
        }
    }

    fn surface_available(&mut self, handle: SurfaceHandle, _width: u32, _height: u32) {
        if self.released {
            return;
        }
        match self.surface {
            None => {
                self.surface = Some(handle);
                if self.source.is_some() && !self.session_bound {
                    log::info!("[kernel] surface available, retrying deferred prepare");
                    self.open_source(handle);
                }
            }
            Some(current) => {
                self.surface = Some(handle);
                if self.session_bound && current != handle {
                    log::info!("[kernel] rebinding decode session to new surface");
                    self.with_decoder(|decoder| decoder.set_surface(handle));
                    self.pending.push_back(KernelEvent::SurfaceRebound(handle));
                } else if !self.session_bound && self.source.is_some() {
                    self.open_source(handle);
                }
            }
        }
    }

    fn surface_destroyed(&mut self) -> bool {
        // keep the handle so a recreated view can reattach to the session
        false
    }

    fn next_event(&mut self, state: PlaybackState) -> Option<KernelEvent> {
        if self.released {
            return None;
        }
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        while let Ok(native) = self.events.try_recv() {
            if let Some(event) = self.translate(native, state) {
                return Some(event);
            }
        }
        None
    }
}

impl Drop for MediaPlayerKernel {
    fn drop(&mut self) {
        self.release();
    }
}
