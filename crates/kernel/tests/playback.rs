// End-to-end playback through FivePlayer, MediaPlayerKernel and a fake decoder

use crossbeam_channel::Sender;
use fiveplayer_core::{
    CallbackEvent, FivePlayer, ManualClock, MediaSource, PlaybackState, PlayerCallback,
    PlayerError, Result, SurfaceEvent, SurfaceHandle,
};
use fiveplayer_kernel::{
    AudioStream, MediaPlayerKernel, NativeDecoder, NativeEvent, VolumeControl,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct Decoder {
    listener: Option<Sender<NativeEvent>>,
    data_sources: Vec<String>,
    prepares: u32,
    releases: u32,
    seeks: Vec<u64>,
    starts: u32,
    position: u64,
}

struct FakeDecoder(Arc<Mutex<Decoder>>);

struct FakeVolume;

impl VolumeControl for FakeVolume {
    fn set_volume(&self, _left: f32, _right: f32) {}
}

impl NativeDecoder for FakeDecoder {
    fn set_listener(&mut self, events: Sender<NativeEvent>) {
        self.0.lock().listener = Some(events);
    }
    fn set_audio_stream_type(&mut self, _stream: AudioStream) {}
    fn set_looping(&mut self, _looping: bool) {}
    fn set_screen_on_while_playing(&mut self, _screen_on: bool) {}
    fn set_surface(&mut self, _handle: SurfaceHandle) {}
    fn set_data_source(&mut self, locator: &str) -> Result<()> {
        self.0.lock().data_sources.push(locator.to_string());
        Ok(())
    }
    fn prepare_async(&mut self) -> Result<()> {
        self.0.lock().prepares += 1;
        Ok(())
    }
    fn start(&mut self) {
        self.0.lock().starts += 1;
    }
    fn pause(&mut self) {}
    fn stop(&mut self) {}
    fn seek_to(&mut self, position_ms: u64) {
        let mut decoder = self.0.lock();
        decoder.seeks.push(position_ms);
        // keyframe granularity
        decoder.position = position_ms - position_ms % 40;
    }
    fn reset(&mut self) {}
    fn release(&mut self) {
        self.0.lock().releases += 1;
    }
    fn duration(&self) -> u64 {
        10_000
    }
    fn current_position(&self) -> u64 {
        self.0.lock().position
    }
    fn is_playing(&self) -> bool {
        false
    }
    fn volume_control(&self) -> Arc<dyn VolumeControl> {
        Arc::new(FakeVolume)
    }
    fn set_playback_speed(&mut self, _speed: f32) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<CallbackEvent>>,
}

impl PlayerCallback for Recorder {
    fn on_event(&self, event: CallbackEvent) {
        self.events.lock().push(event);
    }
}

impl Recorder {
    fn progress(&self) -> Vec<u64> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                CallbackEvent::ProgressChanged { progress_ms, .. } => Some(*progress_ms),
                _ => None,
            })
            .collect()
    }
}

struct Rig {
    player: FivePlayer,
    decoder: Arc<Mutex<Decoder>>,
    recorder: Arc<Recorder>,
    clock: ManualClock,
}

fn rig() -> Rig {
    let _ = env_logger::builder().is_test(true).try_init();
    let decoder = Arc::new(Mutex::new(Decoder::default()));
    let factory_state = decoder.clone();
    let kernel = MediaPlayerKernel::new(Box::new(move || {
        Box::new(FakeDecoder(factory_state.clone())) as Box<dyn NativeDecoder>
    }));
    let clock = ManualClock::new();
    let recorder = Arc::new(Recorder::default());
    let mut player = FivePlayer::new(Box::new(kernel)).with_clock(Arc::new(clock.clone()));
    player.set_callback(Some(recorder.clone()));
    Rig {
        player,
        decoder,
        recorder,
        clock,
    }
}

impl Rig {
    fn native(&self, event: NativeEvent) {
        let tx = self.decoder.lock().listener.clone().expect("listener");
        tx.send(event).expect("receiver alive");
    }

    fn surface(&mut self, raw: u64) {
        self.player.on_surface_event(SurfaceEvent::Available {
            handle: SurfaceHandle::new(raw),
            width: 1280,
            height: 720,
        });
    }
}

#[test]
fn test_full_playback_session() {
    let mut rig = rig();

    rig.player.set_data_source("a.mp4").unwrap();
    assert_eq!(rig.player.state(), PlaybackState::Preparing);
    assert_eq!(rig.decoder.lock().prepares, 0);

    rig.surface(1);
    assert_eq!(rig.decoder.lock().prepares, 1);
    assert_eq!(rig.decoder.lock().data_sources, vec!["a.mp4"]);

    rig.native(NativeEvent::Prepared);
    rig.player.poll();
    assert_eq!(rig.player.state(), PlaybackState::Prepared);

    rig.player.start().unwrap();
    assert_eq!(rig.decoder.lock().starts, 1);
    assert_eq!(rig.player.state(), PlaybackState::Prepared);

    rig.native(NativeEvent::RenderingStart);
    rig.player.poll();
    assert_eq!(rig.player.state(), PlaybackState::Playing);

    for step in 1..=10u64 {
        rig.decoder.lock().position = step * 200;
        rig.clock.advance(Duration::from_millis(200));
        rig.player.poll();
    }
    let progress = rig.recorder.progress();
    assert_eq!(progress.len(), 11);
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));

    rig.native(NativeEvent::Completion);
    rig.player.poll();
    assert_eq!(rig.player.state(), PlaybackState::Complete);
    assert!(!rig.player.is_progress_scheduled());

    rig.clock.advance(Duration::from_millis(1_000));
    rig.player.poll();
    assert_eq!(rig.recorder.progress().len(), 11);
    assert!(rig
        .recorder
        .events
        .lock()
        .contains(&CallbackEvent::Completion));
}

#[test]
fn test_start_at_reports_seek_position() {
    let mut rig = rig();
    rig.surface(1);
    rig.player.set_data_source("a.mp4").unwrap();
    rig.native(NativeEvent::Prepared);
    rig.player.poll();

    rig.player.start_at(5_000).unwrap();
    assert_eq!(rig.decoder.lock().seeks, vec![5_000]);
    assert_eq!(rig.decoder.lock().starts, 1);

    rig.native(NativeEvent::SeekComplete);
    rig.player.poll();
    let reported = rig
        .recorder
        .events
        .lock()
        .iter()
        .find_map(|event| match event {
            CallbackEvent::SeekTo { position_ms } => Some(*position_ms),
            _ => None,
        })
        .expect("seek reported");
    assert!(reported.abs_diff(5_000) < 40);
}

#[test]
fn test_benign_decoder_error_keeps_playing() {
    let mut rig = rig();
    rig.surface(1);
    rig.player.set_data_source("a.mp4").unwrap();
    rig.native(NativeEvent::Prepared);
    rig.native(NativeEvent::RenderingStart);
    rig.player.poll();

    rig.native(NativeEvent::Error { what: 38, extra: -38 });
    rig.player.poll();
    assert_eq!(rig.player.state(), PlaybackState::Playing);
    assert_eq!(rig.decoder.lock().releases, 0);
}

#[test]
fn test_fatal_decoder_error_then_new_source() {
    let mut rig = rig();
    rig.surface(1);
    rig.player.set_data_source("a.mp4").unwrap();
    rig.native(NativeEvent::Prepared);
    rig.native(NativeEvent::RenderingStart);
    rig.player.poll();

    rig.native(NativeEvent::Error { what: 1, extra: -1004 });
    rig.player.poll();
    assert_eq!(rig.player.state(), PlaybackState::Error);
    assert!(!rig.player.is_progress_scheduled());
    assert_eq!(rig.decoder.lock().releases, 1);
    assert!(rig
        .recorder
        .events
        .lock()
        .contains(&CallbackEvent::Error(PlayerError::Decoder {
            what: 1,
            extra: -1004
        })));
    assert!(rig.player.start().is_err());

    rig.player.set_data_source("b.mp4").unwrap();
    assert_eq!(rig.player.state(), PlaybackState::Preparing);
    assert_eq!(rig.decoder.lock().prepares, 2);
}

#[test]
fn test_release_with_prepare_outstanding() {
    let mut rig = rig();
    rig.surface(1);
    rig.player
        .set_media_source(MediaSource::with_title("Live", "https://example.com/live.m3u8"))
        .unwrap();
    let tx = rig.decoder.lock().listener.clone().expect("listener");

    rig.player.release().unwrap();
    rig.player.release().unwrap();
    let _ = tx.send(NativeEvent::Prepared);
    rig.player.poll();

    assert_eq!(rig.player.state(), PlaybackState::Idle);
    assert_eq!(rig.decoder.lock().releases, 1);
    assert!(!rig
        .recorder
        .events
        .lock()
        .contains(&CallbackEvent::Prepared));
}
