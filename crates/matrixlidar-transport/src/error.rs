use std::path::PathBuf;

/// Errors that can occur in bus transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the bus device node.
    #[error("failed to open bus {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to select the target device address on the bus.
    #[error("failed to select device address {address:#04x}: {source}")]
    SelectAddress {
        address: u8,
        source: std::io::Error,
    },

    /// An I/O error occurred while reading or writing the bus.
    #[error("bus I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport is not available on this platform.
    #[error("transport unsupported: {0}")]
    Unsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, TransportError>;
