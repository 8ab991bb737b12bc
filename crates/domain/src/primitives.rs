//! Identifier primitives with validated constructors.

use foodify_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validation failures for domain primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// `ProductId` is empty after trimming.
    EmptyProductId {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// `CategoryId` is empty after trimming.
    EmptyCategoryId {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// Identifier contains characters that cannot appear in a path segment.
    InvalidIdentifier {
        /// Trimmed identifier that failed validation.
        input: String,
    },
    /// Page numbers start at 1.
    InvalidPage {
        /// Rejected page number.
        page: u32,
    },
    /// Page sizes must be non-zero.
    InvalidPageSize {
        /// Rejected page size.
        page_size: u32,
    },
}

impl PrimitiveError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyProductId { .. } => ErrorCode::new("domain", "invalid_product_id"),
            Self::EmptyCategoryId { .. } => ErrorCode::new("domain", "invalid_category_id"),
            Self::InvalidIdentifier { .. } => ErrorCode::new("domain", "invalid_identifier"),
            Self::InvalidPage { .. } | Self::InvalidPageSize { .. } => {
                ErrorCode::new("domain", "invalid_page_request")
            },
        }
    }
}

impl fmt::Display for PrimitiveError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyProductId { .. } => formatter.write_str("ProductId must be non-empty"),
            Self::EmptyCategoryId { .. } => formatter.write_str("CategoryId must be non-empty"),
            Self::InvalidIdentifier { input } => {
                write!(formatter, "identifier `{input}` contains reserved characters")
            },
            Self::InvalidPage { .. } => formatter.write_str("page must be >= 1"),
            Self::InvalidPageSize { .. } => formatter.write_str("page size must be >= 1"),
        }
    }
}

impl std::error::Error for PrimitiveError {}

impl From<PrimitiveError> for ErrorEnvelope {
    fn from(error: PrimitiveError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());
        match error {
            PrimitiveError::EmptyProductId { input_length }
            | PrimitiveError::EmptyCategoryId { input_length } => {
                envelope.with_metadata("input_length", input_length.to_string())
            },
            PrimitiveError::InvalidIdentifier { input } => envelope.with_metadata("input", input),
            PrimitiveError::InvalidPage { page } => envelope.with_metadata("page", page.to_string()),
            PrimitiveError::InvalidPageSize { page_size } => {
                envelope.with_metadata("page_size", page_size.to_string())
            },
        }
    }
}

/// Product identity key (barcode or upstream `_id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(Box<str>);

impl ProductId {
    /// Parse a `ProductId` from user or upstream input.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let Some(trimmed) = trimmed_non_empty(raw) else {
            return Err(PrimitiveError::EmptyProductId {
                input_length: raw.len(),
            });
        };
        ensure_path_safe(trimmed)?;
        Ok(Self(trimmed.to_owned().into_boxed_str()))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the id is made of ASCII digits only (a barcode).
    #[must_use]
    pub fn is_barcode(&self) -> bool {
        is_all_digits(&self.0)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Upstream category tag, e.g. `en:breakfast-cereals`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(Box<str>);

impl CategoryId {
    /// Parse a `CategoryId` from user or upstream input.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let Some(trimmed) = trimmed_non_empty(raw) else {
            return Err(PrimitiveError::EmptyCategoryId {
                input_length: raw.len(),
            });
        };
        ensure_path_safe(trimmed)?;
        Ok(Self(trimmed.to_owned().into_boxed_str()))
    }

    /// Parse an optional selection; blank input means "all categories".
    pub fn parse_selection(input: impl AsRef<str>) -> Result<Option<Self>, PrimitiveError> {
        if input.as_ref().trim().is_empty() {
            return Ok(None);
        }
        Self::parse(input).map(Some)
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CategoryId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

pub(crate) fn is_all_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|byte| byte.is_ascii_digit())
}

fn trimmed_non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn ensure_path_safe(value: &str) -> Result<(), PrimitiveError> {
    if value
        .chars()
        .any(|ch| ch.is_control() || matches!(ch, '/' | '\\' | '?' | '#'))
    {
        return Err(PrimitiveError::InvalidIdentifier {
            input: value.to_owned(),
        });
    }
    Ok(())
}
