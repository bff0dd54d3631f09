use thiserror::Error;

/// Failure of a sprite API call. The addressed sprite is left untouched
/// whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpriteError {
    /// Sprite id outside `[0, count)`.
    #[error("Sprite index {index} out of range (0..{count})")]
    IndexOutOfRange { index: usize, count: usize },
    /// A referenced object (spriteset, palette, blend table) is missing or unusable.
    #[error("Invalid {0} reference")]
    InvalidReference(&'static str),
    /// A backing surface could not be allocated.
    #[error("Out of memory allocating {bytes} bytes")]
    OutOfMemory { bytes: usize },
    /// Frame index outside the spriteset's frame table.
    #[error("Picture index {index} out of range (0..{count})")]
    PictureOutOfRange { index: usize, count: usize },
    /// No frame with this name in the spriteset.
    #[error("Picture '{0}' not found")]
    UnknownPicture(String),
    /// Scale factors must be finite and strictly positive.
    #[error("Invalid scale factors ({sx}, {sy})")]
    InvalidScale { sx: f32, sy: f32 },
    /// Rotation angle is NaN or infinite.
    #[error("Invalid rotation angle {0}")]
    InvalidAngle(f32),
}

impl SpriteError {
    /// The last-error code this failure publishes.
    pub fn code(&self) -> ErrorCode {
        match self {
            SpriteError::IndexOutOfRange { .. } => ErrorCode::IdxSprite,
            SpriteError::InvalidReference(_) => ErrorCode::Reference,
            SpriteError::OutOfMemory { .. } => ErrorCode::OutOfMemory,
            SpriteError::PictureOutOfRange { .. } | SpriteError::UnknownPicture(_) => {
                ErrorCode::IdxPicture
            }
            SpriteError::InvalidScale { .. } | SpriteError::InvalidAngle(_) => {
                ErrorCode::WrongParam
            }
        }
    }
}


/// Engine-wide last-error code, updated by every public entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ErrorCode {
    #[default]
    Ok = 0,
    IdxSprite = 1,
    IdxPicture = 2,
    Reference = 3,
    OutOfMemory = 4,
    WrongParam = 5,
}

impl ErrorCode {
    /// Short human-readable description.
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::Ok => "No error",
            ErrorCode::IdxSprite => "Invalid sprite index",
            ErrorCode::IdxPicture => "Invalid sprite picture",
            ErrorCode::Reference => "Invalid object reference",
            ErrorCode::OutOfMemory => "Not enough memory",
            ErrorCode::WrongParam => "Invalid parameter",
        }
    }
}
