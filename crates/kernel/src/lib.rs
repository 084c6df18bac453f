// MediaKernel implementation over a native platform decoder

pub mod config;
pub mod media_player_kernel;
pub mod native;

pub use config::{KernelConfig, DEFAULT_BENIGN_ERRORS};
pub use media_player_kernel::{DecoderFactory, MediaPlayerKernel};
pub use native::{AudioStream, NativeDecoder, NativeEvent, VolumeControl};
