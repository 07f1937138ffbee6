use thiserror::Error;

pub type SkyResult<T> = Result<T, SkyError>;

#[derive(Error, Debug)]
pub enum SkyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
