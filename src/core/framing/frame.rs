use crate::core::framing::escape::decode_escapes;
use crate::domain::config::FramingConfig;
use crate::domain::error::SermonResult;

/// Decoded frame/append strings wrapped around every submitted command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameTemplate {
    frame: String,
    append: String,
}

impl FrameTemplate {
    /// Decode the raw (escaped) strings once. A bad escape is a configuration error.
    pub fn new(raw_frame: &str, raw_append: &str) -> SermonResult<Self> {
        Ok(Self {
            frame: decode_escapes(raw_frame)?,
            append: decode_escapes(raw_append)?,
        })
    }

    pub fn from_config(config: &FramingConfig) -> SermonResult<Self> {
        Self::new(&config.frame, &config.append)
    }

    /// Add already-decoded text to the end of the append string.
    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.append.push_str(suffix);
        self
    }

    pub fn frame(&self) -> &str {
        &self.frame
    }

    pub fn append(&self) -> &str {
        &self.append
    }

    /// `frame + raw + append + frame`
    pub fn frame_command(&self, raw: &str) -> String {
        let mut processed =
            String::with_capacity(2 * self.frame.len() + raw.len() + self.append.len());
        processed.push_str(&self.frame);
        processed.push_str(raw);
        processed.push_str(&self.append);
        processed.push_str(&self.frame);
        processed
    }
}
