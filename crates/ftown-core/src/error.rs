//! Error types for ftown

use thiserror::Error;

use crate::native::ErrorCode;
use crate::types::GlyphFormat;

pub type Result<T> = std::result::Result<T, FtError>;

/// Main error type for ftown
#[derive(Debug, Error)]
pub enum FtError {
    /// A factory call reported success but produced a null handle.
    #[error("native factory returned a null handle for {what}")]
    InvalidHandle { what: &'static str },

    #[error("cannot access a disposed {what}")]
    ObjectDisposed { what: &'static str },

    /// Any non-zero native return code, preserved verbatim.
    #[error("{op} failed: {code}")]
    NativeOperationFailed { op: &'static str, code: ErrorCode },

    #[error("glyph format is {actual}, not {expected}")]
    InvalidCast {
        expected: GlyphFormat,
        actual: GlyphFormat,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FtError {
    /// Wrap a native error code returned by `op`.
    pub fn native(op: &'static str, code: ErrorCode) -> Self {
        FtError::NativeOperationFailed { op, code }
    }

    /// The native error code, when this error came from the native library.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            FtError::NativeOperationFailed { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_disposed(&self) -> bool {
        matches!(self, FtError::ObjectDisposed { .. })
    }
}

/// Attach the native operation name to a raw native result.
pub trait NativeResultExt<T> {
    fn op(self, op: &'static str) -> Result<T>;
}

impl<T> NativeResultExt<T> for std::result::Result<T, ErrorCode> {
    fn op(self, op: &'static str) -> Result<T> {
        self.map_err(|code| {
            log::debug!("{op} failed with {code}");
            FtError::native(op, code)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_codes_survive_conversion() {
        let err: Result<()> = Err(ErrorCode::INVALID_FILE_FORMAT).op("FT_New_Face");
        let err = err.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::INVALID_FILE_FORMAT));
        assert_eq!(
            err.to_string(),
            "FT_New_Face failed: Invalid_File_Format (0x03)"
        );
    }

    #[test]
    fn invalid_cast_names_both_formats() {
        let err = FtError::InvalidCast {
            expected: GlyphFormat::Bitmap,
            actual: GlyphFormat::Outline,
        };
        assert_eq!(err.to_string(), "glyph format is outline, not bitmap");
        assert!(err.code().is_none());
    }
}
