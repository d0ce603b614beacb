//! Error types for modelxsd
//!
//! Generation is all-or-nothing: every failure is surfaced synchronously as
//! one of the variants below and no partial document is ever returned.

use std::fmt;
use thiserror::Error;

/// Result type alias using modelxsd Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for modelxsd operations
#[derive(Error, Debug)]
pub enum Error {
    /// The model does not expose the structural metadata needed to describe it
    #[error("configuration error for model '{model}': {message}")]
    Configuration {
        /// Model identity the error refers to
        model: String,
        /// What is missing or inconsistent
        message: String,
    },

    /// A column's semantic type has no entry in the type mapping table
    #[error("unknown column type '{type_name}' for column '{column}' of model '{model}'")]
    UnknownType {
        /// Model identity owning the column
        model: String,
        /// Column name
        column: String,
        /// The unmapped type name
        type_name: String,
    },

    /// Malformed customization specification
    #[error("customization error: {0}")]
    Customization(#[from] CustomizationError),

    /// XML writing error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error for a model
    pub fn configuration(model: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Configuration {
            model: model.into(),
            message: message.into(),
        }
    }
}

/// Customization error with context
#[derive(Debug, Clone, PartialEq)]
pub struct CustomizationError {
    /// Error message
    pub message: String,
    /// Element (or path of elements) the error refers to
    pub element: Option<String>,
    /// Why the input was rejected
    pub reason: Option<String>,
}

impl CustomizationError {
    /// Create a new customization error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            element: None,
            reason: None,
        }
    }

    /// Set the element the error refers to
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    /// Set the reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

impl fmt::Display for CustomizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref element) = self.element {
            write!(f, " (element '{}')", element)?;
        }

        if let Some(ref reason) = self.reason {
            write!(f, ": {}", reason)?;
        }

        Ok(())
    }
}

impl std::error::Error for CustomizationError {}
