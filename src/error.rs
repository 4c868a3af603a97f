use crate::config::ConfigError;
use handreceipt_pdf_composer::ComposerError;
use std::path::PathBuf;
use thiserror::Error;

/// Every way producing a hand receipt can fail. None of them leave a file at
/// the output path.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Template not found: {}", .path.display())]
    TemplateMissing { path: PathBuf },

    #[error("Template has no pages: {}", .path.display())]
    TemplateEmpty { path: PathBuf },

    #[error("Could not unlock template {}: {reason}", .path.display())]
    TemplateUnlockFailed { path: PathBuf, reason: String },

    #[error("Could not read template {}: {reason}", .path.display())]
    TemplateUnreadable { path: PathBuf, reason: String },

    #[error("Layout configuration is unusable: {0}")]
    InvalidLayout(#[source] ConfigError),

    #[error("Failed to assemble the document: {0}")]
    Compose(#[from] ComposerError),

    #[error("Failed to write {}: {source}", .path.display())]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<lopdf::Error> for GenerateError {
    fn from(e: lopdf::Error) -> Self {
        GenerateError::Compose(ComposerError::Pdf(e))
    }
}
