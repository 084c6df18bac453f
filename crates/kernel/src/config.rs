// Kernel configuration and decoder error classification

use crate::native::AudioStream;

/// Error pairs the platform decoder reports as warnings.
///
/// `(38, -38)` is an invalid-state query (e.g. duration read before
/// prepare). Every other pair is fatal unless added to
/// [`KernelConfig::benign_errors`].
pub const DEFAULT_BENIGN_ERRORS: &[(i32, i32)] = &[(38, -38)];

/// Kernel configuration
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// `(what, extra)` pairs that are logged and dropped
    pub benign_errors: Vec<(i32, i32)>,
    pub audio_stream: AudioStream,
    pub screen_on_while_playing: bool,
}

impl KernelConfig {
    pub fn is_benign(&self, what: i32, extra: i32) -> bool {
        self.benign_errors.contains(&(what, extra))
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            benign_errors: DEFAULT_BENIGN_ERRORS.to_vec(),
            audio_stream: AudioStream::Music,
            screen_on_while_playing: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_benign_pairs() {
        let config = KernelConfig::default();
        assert!(config.is_benign(38, -38));
        assert!(!config.is_benign(1, -19));
        assert!(!config.is_benign(-38, 38));
        assert!(!config.is_benign(1, -1004));
        assert!(!config.is_benign(100, 0));
    }

    #[test]
    fn test_custom_allow_list() {
        let config = KernelConfig {
            benign_errors: vec![(1, -19), (-5, 7)],
            ..KernelConfig::default()
        };
        assert!(config.is_benign(1, -19));
        assert!(config.is_benign(-5, 7));
        assert!(!config.is_benign(38, -38));
    }
}
