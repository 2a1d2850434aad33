/// Failures raised while acquiring or preparing a drawing surface.
///
/// All of them mean a required environment capability is missing; none is
/// retried internally. A failed cache build leaves the cache empty so the
/// next render attempts the build again.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Drawing surface of {width}x{height} is unavailable: {reason}")]
    SurfaceUnavailable {
        width: u32,
        height: u32,
        reason: String,
    },
    #[error("Drawing context is unavailable: {0}")]
    ContextUnavailable(String),
    #[error("No font face matches \"{font}\"")]
    FontUnavailable { font: String },
}

pub type RenderResult<T> = std::result::Result<T, RenderError>;
