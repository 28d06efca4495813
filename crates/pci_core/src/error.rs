use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// The validation failure behind this error, if that is what it is.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

/// Malformed cell data or options, rejected before any optimization work starts.
#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum ValidationError {
    #[error("cell at index {index} has an empty id")]
    EmptyId { index: usize },
    #[error("duplicate cell id: {id}")]
    DuplicateId { id: String },
    #[error("cell {id}: invalid coordinates lat={latitude} lng={longitude}")]
    InvalidCoordinates {
        id: String,
        latitude: f64,
        longitude: f64,
    },
    #[error("cell {id}: pci {pci} outside domain [{min}, {max}]")]
    PciOutOfDomain {
        id: String,
        pci: u16,
        min: u16,
        max: u16,
    },
    #[error("invalid pci domain [{min}, {max}] (expected min <= max <= 503)")]
    InvalidDomain { min: u16, max: u16 },
    #[error("cell {id}: {reason}")]
    InvalidRadio { id: String, reason: String },
}
