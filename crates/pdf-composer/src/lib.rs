//! PDF composition utilities for stamping overlays onto template documents.
//!
//! This crate provides low-level PDF manipulation using lopdf:
//! - Opening and unlocking protected templates
//! - Deep object copying with cycle detection
//! - Importing template pages with inherited attributes resolved
//! - Compositing overlay content above template pages

mod compose;
mod copier;
mod error;

pub use compose::{BasePage, OVERLAY_XOBJECT_PREFIX, Overlay, OverlayComposer};
pub use error::ComposerError;

use lopdf::Document;

/// Parses a PDF held in memory, unlocking it if it is access-protected.
///
/// An encrypted document that opens with the empty user password is decrypted
/// without asking. Otherwise `request_password` is asked for a credential and
/// the bytes are parsed again with it; returning `None` gives up.
pub fn open_document<F>(bytes: &[u8], request_password: F) -> Result<Document, ComposerError>
where
    F: FnOnce() -> Option<String>,
{
    let doc = Document::load_mem(bytes)?;
    if !doc.is_encrypted() {
        if doc.was_encrypted() {
            log::info!("Unlocked protected document with the empty password.");
        }
        return Ok(doc);
    }

    log::info!("Document is password protected; requesting a credential.");
    let Some(password) = request_password() else {
        return Err(ComposerError::Locked("no password was provided".to_string()));
    };

    match Document::load_mem_with_password(bytes, &password) {
        Ok(doc) => {
            log::info!("Unlocked protected document with the supplied password.");
            Ok(doc)
        }
        Err(lopdf::Error::InvalidPassword) => {
            Err(ComposerError::Locked("the provided password was rejected".to_string()))
        }
        Err(err) => Err(err.into()),
    }
}
