// Core types and traits for the FiveFive video player

pub mod callback;
pub mod error;
pub mod kernel;
pub mod player;
pub mod source;
pub mod state;
pub mod surface;
pub mod ticker;

// Re-export commonly used types
pub use callback::{CallbackEvent, CallbackManager, PlayerCallback};
pub use error::{PlayerError, Result};
pub use kernel::{KernelEvent, MediaKernel};
pub use player::{FivePlayer, PlayerConfig};
pub use source::MediaSource;
pub use state::PlaybackState;
pub use surface::{RenderSurface, SurfaceBinding, SurfaceEvent, SurfaceHandle};
pub use ticker::{Clock, ManualClock, ProgressTicker, SystemClock, PROGRESS_INTERVAL_MS};

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialize logging based on platform. Safe to call more than once.
pub fn init_logging() {
    INIT_LOGGER.call_once(|| {
        #[cfg(target_os = "android")]
        {
            android_logger::init_once(
                android_logger::Config::default()
                    .with_max_level(log::LevelFilter::Debug)
                    .with_tag("FivePlayer"),
            );
        }

        #[cfg(not(target_os = "android"))]
        {
            let _ = env_logger::builder()
                .is_test(false)
                .filter_level(log::LevelFilter::Info)
                .try_init();
        }
    });
}
