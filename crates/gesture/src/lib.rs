// Gesture controller: turns drag deltas into seek / volume / brightness changes
//
// Gesture recognition itself belongs to the platform; this crate receives the
// already-recognized down / scroll / up callbacks.

use fiveplayer_core::{FivePlayer, PlayerError, Result};

/// What the current drag adjusts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureMotion {
    Progress,
    Volume,
    Brightness,
}

/// Values for the gesture overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureFeedback {
    Progress {
        position_ms: u64,
        duration_ms: u64,
        percent: u8,
    },
    Volume {
        percent: f32,
        muted: bool,
    },
    Brightness {
        percent: f32,
    },
}

/// Tuning of the gesture steps
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Seconds moved per horizontal scroll event
    pub progress_step_secs: u64,
    /// Brightness units (0-255) per vertical scroll event
    pub brightness_step: u32,
    /// Stream volume units per vertical scroll event
    pub volume_step: f32,
    /// Forward seeking stops this many seconds before the end
    pub end_margin_secs: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            progress_step_secs: 3,
            brightness_step: 3,
            volume_step: 0.1,
            end_margin_secs: 10,
        }
    }
}

/// Player-facing side of the gesture controller
pub trait GestureTarget {
    fn current_position(&self) -> u64;

    fn duration(&self) -> u64;

    fn seek_to(&mut self, position_ms: u64) -> Result<()>;

    fn show_gesture_change_view(&mut self, _motion: GestureMotion, _feedback: GestureFeedback) {}

    fn hide_gesture_change_view(&mut self) {}
}

impl GestureTarget for FivePlayer {
    fn current_position(&self) -> u64 {
        FivePlayer::current_position(self)
    }

    fn duration(&self) -> u64 {
        FivePlayer::duration(self)
    }

    fn seek_to(&mut self, position_ms: u64) -> Result<()> {
        FivePlayer::seek_to(self, position_ms)
    }
}

/// System volume and brightness access.
///
/// Every call is best effort: failures are logged and dropped by the
/// controller.
pub trait SystemSettings {
    fn max_volume(&self) -> u32;

    fn stream_volume(&self) -> Result<u32>;

    fn set_stream_volume(&mut self, volume: u32) -> Result<()>;

    /// Screen brightness, 0-255
    fn brightness(&self) -> Result<u32>;

    fn set_brightness(&mut self, brightness: u32) -> Result<()>;

    fn is_brightness_manual(&self) -> Result<bool>;

    fn set_brightness_manual(&mut self) -> Result<()>;
}

const MAX_BRIGHTNESS: u32 = 255;

/// Decides the motion from the first scroll after a touch and applies the
/// following scrolls to it until the finger is lifted.
pub struct GestureController<S: SystemSettings> {
    config: GestureConfig,
    settings: S,
    motion: Option<GestureMotion>,
    first_scroll: bool,
    view_width: u32,
    view_height: u32,
    progress_secs: u64,
    volume: f32,
}

impl<S: SystemSettings> GestureController<S> {
    pub fn new(settings: S) -> Self {
        Self::with_config(settings, GestureConfig::default())
    }

    pub fn with_config(settings: S, config: GestureConfig) -> Self {
        let volume = settings.stream_volume().unwrap_or(0) as f32;
        Self {
            config,
            settings,
            motion: None,
            first_scroll: false,
            view_width: 0,
            view_height: 0,
            progress_secs: 0,
            volume,
        }
    }

    pub fn motion(&self) -> Option<GestureMotion> {
        self.motion
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    /// Finger down: snapshot the view size and the stream volume
    pub fn on_down(&mut self, view_width: u32, view_height: u32) -> bool {
        self.view_width = view_width;
        self.view_height = view_height;
        match self.settings.stream_volume() {
            Ok(volume) => self.volume = volume as f32,
            Err(e) => log::debug!("stream volume unavailable: {}", e),
        }
        self.motion = None;
        self.first_scroll = true;
        true
    }

    /// A scroll step. `distance_x` / `distance_y` are previous minus current
    /// coordinates, so a positive `distance_x` is a drag to the left.
    pub fn on_scroll(
        &mut self,
        target: &mut impl GestureTarget,
        start_x: f32,
        distance_x: f32,
        distance_y: f32,
    ) -> Option<GestureFeedback> {
        if self.first_scroll {
            self.first_scroll = false;
            self.motion = self.decide_motion(target, start_x, distance_x, distance_y);
            log::debug!("gesture motion {:?}", self.motion);
        }

        let feedback = match self.motion? {
            GestureMotion::Progress => self.adjust_progress(target, distance_x, distance_y),
            GestureMotion::Volume => self.adjust_volume(distance_x, distance_y),
            GestureMotion::Brightness => self.adjust_brightness(distance_y),
        }?;

        if let Some(motion) = self.motion {
            target.show_gesture_change_view(motion, feedback);
        }
        Some(feedback)
    }

    /// Finger up: a progress drag commits its seek
    pub fn on_up(&mut self, target: &mut impl GestureTarget) -> Result<()> {
        let motion = self.motion.take();
        self.first_scroll = false;
        target.hide_gesture_change_view();
        if motion == Some(GestureMotion::Progress) {
            let position_ms = self.progress_secs * 1000;
            log::info!("gesture seek -> {} ms", position_ms);
            return target.seek_to(position_ms);
        }
        Ok(())
    }

    pub fn on_single_tap_up(&mut self, target: &mut impl GestureTarget) {
        target.hide_gesture_change_view();
    }

    fn decide_motion(
        &mut self,
        target: &impl GestureTarget,
        start_x: f32,
        distance_x: f32,
        distance_y: f32,
    ) -> Option<GestureMotion> {
        let width = self.view_width as f32;
        if distance_x.abs() >= distance_y.abs() {
            self.progress_secs = target.current_position() / 1000;
            Some(GestureMotion::Progress)
        } else if start_x > width * 3.0 / 5.0 {
            Some(GestureMotion::Volume)
        } else if start_x < width * 2.0 / 5.0 {
            self.ensure_manual_brightness();
            Some(GestureMotion::Brightness)
        } else {
            None
        }
    }

    fn ensure_manual_brightness(&mut self) {
        match self.settings.is_brightness_manual() {
            Ok(true) => {}
            Ok(false) => {
                if let Err(e) = self.settings.set_brightness_manual() {
                    log::debug!("cannot switch brightness to manual: {}", e);
                }
            }
            Err(e) => log::debug!("brightness mode unavailable: {}", e),
        }
    }

    fn adjust_progress(
        &mut self,
        target: &impl GestureTarget,
        distance_x: f32,
        distance_y: f32,
    ) -> Option<GestureFeedback> {
        if distance_x.abs() <= distance_y.abs() {
            return None;
        }
        let duration_ms = target.duration();
        let duration_secs = duration_ms / 1000;
        let step = self.config.progress_step_secs;

        if distance_x >= 1.0 {
            self.progress_secs = self.progress_secs.saturating_sub(step);
        } else if distance_x <= -1.0 {
            if self.progress_secs + step < duration_secs {
                self.progress_secs += step;
            } else {
                self.progress_secs = duration_secs.saturating_sub(self.config.end_margin_secs);
            }
        }

        let position_ms = self.progress_secs * 1000;
        let percent = if duration_ms == 0 {
            0
        } else {
            (position_ms * 100 / duration_ms).min(100) as u8
        };
        Some(GestureFeedback::Progress {
            position_ms,
            duration_ms,
            percent,
        })
    }

    fn adjust_volume(&mut self, distance_x: f32, distance_y: f32) -> Option<GestureFeedback> {
        if distance_y.abs() <= distance_x.abs() {
            return None;
        }
        let max = self.settings.max_volume() as f32;
        if distance_y >= 1.0 && self.volume < max {
            self.volume += self.config.volume_step;
        } else if distance_y <= -1.0 && self.volume > 0.0 {
            self.volume -= self.config.volume_step;
        }
        self.volume = self.volume.clamp(0.0, max);

        if let Err(e) = self.settings.set_stream_volume(self.volume as u32) {
            log::debug!("cannot set stream volume: {}", e);
        }
        let percent = if max > 0.0 { self.volume * 100.0 / max } else { 0.0 };
        log::info!("volume= {}%", percent);
        Some(GestureFeedback::Volume {
            percent,
            muted: self.volume <= 0.0,
        })
    }

    fn adjust_brightness(&mut self, distance_y: f32) -> Option<GestureFeedback> {
        let current = match self.settings.brightness() {
            Ok(value) => value,
            Err(e) => {
                log::debug!("brightness unavailable: {}", e);
                return None;
            }
        };
        let step = self.config.brightness_step;
        let brightness = if distance_y >= 1.0 {
            current.saturating_add(step)
        } else if distance_y <= -1.0 {
            current.saturating_sub(step)
        } else {
            current
        }
        .min(MAX_BRIGHTNESS);

        if let Err(e) = self.settings.set_brightness(brightness) {
            log::debug!("cannot set brightness: {}", e);
        }
        Some(GestureFeedback::Brightness {
            percent: brightness as f32 * 100.0 / MAX_BRIGHTNESS as f32,
        })
    }
}

/// Settings backend that rejects every write, for platforms without access
/// to system settings.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSystemSettings;

impl SystemSettings for NoSystemSettings {
    fn max_volume(&self) -> u32 {
        0
    }

    fn stream_volume(&self) -> Result<u32> {
        Err(PlayerError::Settings("stream volume".into()))
    }

    fn set_stream_volume(&mut self, _volume: u32) -> Result<()> {
        Err(PlayerError::Settings("stream volume".into()))
    }

    fn brightness(&self) -> Result<u32> {
        Err(PlayerError::Settings("brightness".into()))
    }

    fn set_brightness(&mut self, _brightness: u32) -> Result<()> {
        Err(PlayerError::Settings("brightness".into()))
    }

    fn is_brightness_manual(&self) -> Result<bool> {
        Err(PlayerError::Settings("brightness mode".into()))
    }

    fn set_brightness_manual(&mut self) -> Result<()> {
        Err(PlayerError::Settings("brightness mode".into()))
    }
}
