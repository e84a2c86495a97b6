/// Configuration subsystem - Editor settings and preferences
///
/// This module handles loading and applying configuration from .quillrc files.

pub mod rc;

// Re-export public interface
pub use rc::{ConfigError, RcConfig, RcLoader};
