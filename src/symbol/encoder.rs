use crate::symbol::ModuleMatrix;
use qrcodegen::{QrCode, QrCodeEcc, QrSegment, Version};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("cannot encode an empty payload")]
    EmptyPayload,
    #[error("payload of {len} bytes does not fit in a version {max_version} symbol")]
    DataTooLong { len: usize, max_version: u8 },
    #[error("encoder produced an invalid {count}x{count} module matrix")]
    InvalidMatrix { count: usize },
}

/// Error correction policy. One level is used for every symbol in a job.
#[derive(Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Debug, Default)]
pub enum ErrorLevel {
    /// ~15% recovery; fewer, larger modules that scan quickly.
    #[default]
    #[serde(rename = "M")]
    Medium,
    /// ~30% recovery; survives partial occlusion at the cost of density.
    #[serde(rename = "H")]
    High,
}

impl ErrorLevel {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorLevel::Medium => "M",
            ErrorLevel::High => "H",
        }
    }

    pub fn all() -> &'static [ErrorLevel] {
        &[ErrorLevel::Medium, ErrorLevel::High]
    }
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Something that turns a payload into a module matrix.
pub trait SymbolEncoder {
    fn encode(&self, payload: &str, level: ErrorLevel) -> Result<ModuleMatrix, EncodingError>;
}

/// QR Model 2 encoder, bounded to versions `1..=max_version`.
#[derive(Debug, Clone, Copy)]
pub struct QrEncoder {
    max_version: u8,
}

pub const DEFAULT_MAX_VERSION: u8 = 10;

impl QrEncoder {
    pub fn new(max_version: u8) -> QrEncoder {
        QrEncoder {
            max_version: max_version.clamp(Version::MIN.value(), Version::MAX.value()),
        }
    }
}

impl Default for QrEncoder {
    fn default() -> Self {
        QrEncoder::new(DEFAULT_MAX_VERSION)
    }
}

impl SymbolEncoder for QrEncoder {
    fn encode(&self, payload: &str, level: ErrorLevel) -> Result<ModuleMatrix, EncodingError> {
        if payload.is_empty() {
            return Err(EncodingError::EmptyPayload);
        }

        let ecc = match level {
            ErrorLevel::Medium => QrCodeEcc::Medium,
            ErrorLevel::High => QrCodeEcc::High,
        };
        let segments = QrSegment::make_segments(payload);
        // no ecc boost: the level is a fixed policy, not a floor
        let qr = QrCode::encode_segments_advanced(
            &segments,
            ecc,
            Version::MIN,
            Version::new(self.max_version),
            None,
            false,
        )
        .map_err(|_| EncodingError::DataTooLong {
            len: payload.len(),
            max_version: self.max_version,
        })?;

        let count = qr.size() as usize;
        ModuleMatrix::from_fn(count, |row, col| qr.get_module(col as i32, row as i32))
    }
}
