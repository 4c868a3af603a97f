use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposerError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Document is protected and could not be unlocked: {0}")]
    Locked(String),

    #[error("Document has no page {0}")]
    PageNotFound(u32),
}
