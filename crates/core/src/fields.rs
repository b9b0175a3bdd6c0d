#![forbid(unsafe_code)]

pub const UNTITLED: &str = "Untitled";
pub const MAX_TITLE_CHARS: usize = 255;
pub const MAX_BLOCK_TYPE_CHARS: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TitleError {
    TooLong,
    ContainsControl,
}

impl TitleError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::TooLong => "title is too long",
            Self::ContainsControl => "title contains control characters",
        }
    }
}

/// Trims the title and substitutes [`UNTITLED`] for an empty one.
pub fn normalize_title(value: &str) -> Result<String, TitleError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(UNTITLED.to_string());
    }
    if trimmed.chars().count() > MAX_TITLE_CHARS {
        return Err(TitleError::TooLong);
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(TitleError::ContainsControl);
    }
    Ok(trimmed.to_string())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockFieldError {
    EmptyType,
    TypeTooLong,
    TypeContainsControl,
    NegativePosition,
}

impl BlockFieldError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::EmptyType => "block type must not be empty",
            Self::TypeTooLong => "block type is too long",
            Self::TypeContainsControl => "block type contains control characters",
            Self::NegativePosition => "block position must not be negative",
        }
    }
}

pub fn validate_block_type(value: &str) -> Result<(), BlockFieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BlockFieldError::EmptyType);
    }
    if trimmed.chars().count() > MAX_BLOCK_TYPE_CHARS {
        return Err(BlockFieldError::TypeTooLong);
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(BlockFieldError::TypeContainsControl);
    }
    Ok(())
}

pub fn validate_block_position(position: Option<i64>) -> Result<(), BlockFieldError> {
    match position {
        Some(value) if value < 0 => Err(BlockFieldError::NegativePosition),
        _ => Ok(()),
    }
}
