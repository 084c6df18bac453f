// Media source handed to a kernel for one playback session

/// A media source: a title, a locator the decoder understands (local path or
/// remote URL) and a looping flag.
///
/// A source is immutable once handed to a kernel; a new session needs a new
/// value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSource {
    title: String,
    locator: String,
    looping: bool,
}

impl MediaSource {
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            locator: locator.into(),
            looping: false,
        }
    }

    pub fn with_title(title: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            locator: locator.into(),
            looping: false,
        }
    }

    #[must_use]
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Whether the locator carries anything a decoder could open.
    pub fn has_locator(&self) -> bool {
        !self.locator.trim().is_empty()
    }
}
