use crate::surface::GeometryError;

/// Failures that prevent a render session from starting or continuing.
///
/// Hosts are expected to show a static fallback when mounting fails; none of
/// these are retried by the session itself.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No adapter, device or presentable surface could be created.
    #[error("GPU rendering is unsupported here: {0}")]
    Unsupported(String),
    /// The effect program failed to compile or link.
    #[error("shader failed to compile: {0}")]
    ShaderCompile(String),
    #[error("failed to measure container: {0}")]
    Geometry(#[from] GeometryError),
    /// The device failed while presenting.
    #[error("GPU device failure: {0}")]
    Device(String),
}

impl SessionError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, SessionError::Unsupported(_))
    }
}
