//! Error types for pdfium-core

use crate::render::PixelFormat;
use thiserror::Error;

/// Result type for pdfium-core operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Error types for document and page operations
#[derive(Error, Debug)]
pub enum PdfError {
    /// The file length could not be read or is zero
    #[error("cannot determine file size")]
    FileSize,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The engine could not open or parse the document
    #[error("cannot create document: {0}")]
    OpenFailed(EngineError),

    /// The document or page named by a handle is not open
    #[error("{0}")]
    IllegalState(&'static str),

    /// The engine returned no page for this index
    #[error("Failed to load page {index}")]
    PageLoadFailed { index: i32 },

    /// PNG encoding error
    #[error("PNG encoding error: {0}")]
    PngEncoding(String),
}

/// Host-facing category of a [`PdfError`].
///
/// Bindings use this to choose which exception type to raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Resource acquisition failed (file size, document open).
    Io,
    /// An operation was attempted against a handle in the wrong state.
    IllegalState,
}

impl PdfError {
    /// Classify this error for the host boundary.
    pub fn class(&self) -> ErrorClass {
        match self {
            PdfError::FileSize
            | PdfError::Io(_)
            | PdfError::OpenFailed(_)
            | PdfError::PngEncoding(_) => ErrorClass::Io,
            PdfError::IllegalState(_) | PdfError::PageLoadFailed { .. } => ErrorClass::IllegalState,
        }
    }
}

/// Engine last-error codes reported after a failed document open.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    #[error("No error.")]
    Success,
    #[error("File not found or could not be opened.")]
    File,
    #[error("File not in PDF format or corrupted.")]
    Format,
    #[error("Incorrect password.")]
    Password,
    #[error("Unsupported security scheme.")]
    Security,
    #[error("Page not found or content error.")]
    Page,
    #[error("Unknown error.")]
    Unknown(u32),
}

impl EngineError {
    pub const SUCCESS: u32 = 0;
    pub const UNKNOWN: u32 = 1;
    pub const FILE: u32 = 2;
    pub const FORMAT: u32 = 3;
    pub const PASSWORD: u32 = 4;
    pub const SECURITY: u32 = 5;
    pub const PAGE: u32 = 6;

    /// Convert from the engine's raw error code.
    pub fn from_code(code: u32) -> Self {
        match code {
            Self::SUCCESS => EngineError::Success,
            Self::FILE => EngineError::File,
            Self::FORMAT => EngineError::Format,
            Self::PASSWORD => EngineError::Password,
            Self::SECURITY => EngineError::Security,
            Self::PAGE => EngineError::Page,
            other => EngineError::Unknown(other),
        }
    }

    /// The raw error code.
    pub fn code(&self) -> u32 {
        match self {
            EngineError::Success => Self::SUCCESS,
            EngineError::File => Self::FILE,
            EngineError::Format => Self::FORMAT,
            EngineError::Password => Self::PASSWORD,
            EngineError::Security => Self::SECURITY,
            EngineError::Page => Self::PAGE,
            EngineError::Unknown(code) => *code,
        }
    }
}

/// Reasons a render call stopped before reaching the rasterizer.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The page handle does not refer to an open page
    #[error("Render page pointers invalid")]
    UnknownPage,

    /// The target's pixel format is not RGBA 8888
    #[error("Bitmap format must be RGBA_8888, got {0:?}")]
    UnsupportedFormat(PixelFormat),

    /// Querying the target's geometry failed
    #[error("Fetching bitmap info failed: {0}")]
    Info(std::io::Error),

    /// The surface refused the RGBA 8888 buffer geometry
    #[error("Setting surface geometry failed: {0}")]
    Geometry(std::io::Error),

    /// Locking the target's pixels failed
    #[error("Locking target failed: {0}")]
    Lock(std::io::Error),

    /// The locked buffer cannot hold the advertised geometry
    #[error("Pixel buffer too small: need {required} bytes, got {actual}")]
    BufferTooSmall { required: usize, actual: usize },

    /// The engine refused to wrap the pixel buffer
    #[error("Failed to create engine bitmap")]
    BitmapCreation,
}
