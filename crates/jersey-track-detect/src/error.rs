/// Failure reported by an opaque model (number locator or text recognizer).
#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("model rejected input of {width}x{height}")]
    InvalidInput { width: u32, height: u32 },
    #[error("inference failed: {0}")]
    Inference(String),
    #[error(transparent)]
    Backend(#[from] Box<dyn std::error::Error + Send + Sync + 'static>),
}
