//! Error types for the Aurora RHI
//!
//! Every creation path in the RHI (backend selection, device, swapchain,
//! texture, pipeline states, command lists) reports failure through these
//! types. There is no "initialized" flag to poll: an object either exists
//! fully constructed or its constructor returned an `Error`.

use std::fmt;

/// Result type for Aurora RHI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Aurora RHI errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (Vulkan, Direct3D 11, Direct3D 12)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, view, swapchain buffer, etc.)
    InvalidResource(String),

    /// Initialization failed (device, swapchain, context)
    InitializationFailed(String),

    /// The requested graphics API has no backend on this build or platform
    UnsupportedBackend(String),

    /// A precondition on the arguments of a call did not hold
    InvalidArgument(String),

    /// Adapter enumeration found no usable GPU
    NoAdapter,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::UnsupportedBackend(msg) => write!(f, "Unsupported backend: {}", msg),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::NoAdapter => write!(f, "No suitable GPU adapter found"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
