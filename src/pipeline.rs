//! Pagination and template merge: turns logical rows into a finished,
//! multi-page hand receipt.

use crate::compositor::{HeaderMeta, render_page};
use crate::config::LayoutConfig;
use crate::error::GenerateError;
use crate::rows::{IssuedItem, LogicalRow, build_rows};
use handreceipt_pdf_composer::{ComposerError, OverlayComposer, open_document};
use lopdf::Document;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// The rows assigned to one output page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec<'r> {
    pub page_no: usize,
    pub of_pages: usize,
    pub rows: &'r [LogicalRow],
    pub is_first: bool,
}

/// Number of pages needed for `total_rows` rows.
pub fn page_count(total_rows: usize, cfg: &LayoutConfig) -> usize {
    1 + total_rows
        .saturating_sub(cfg.rows_first)
        .div_ceil(cfg.rows_next.max(1))
}

/// Splits `rows` across pages: the first page takes up to `rows_first`, every
/// continuation page up to `rows_next`. There is always at least one page.
pub fn paginate<'r>(rows: &'r [LogicalRow], cfg: &LayoutConfig) -> Vec<PageSpec<'r>> {
    let (first, rest) = rows.split_at(rows.len().min(cfg.rows_first));
    let of_pages = page_count(rows.len(), cfg);

    let mut pages = Vec::with_capacity(of_pages);
    pages.push(PageSpec { page_no: 1, of_pages, rows: first, is_first: true });
    for (index, chunk) in rest.chunks(cfg.rows_next.max(1)).enumerate() {
        pages.push(PageSpec { page_no: index + 2, of_pages, rows: chunk, is_first: false });
    }
    pages
}

/// Supplies the password for a protected template once the empty password has
/// been rejected.
pub trait CredentialProvider {
    fn request_password(&self, template: &Path) -> Option<String>;
}

/// Never supplies a password.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn request_password(&self, _template: &Path) -> Option<String> {
        None
    }
}

/// Always supplies the same password.
#[derive(Debug, Clone)]
pub struct StaticPassword(pub String);

impl CredentialProvider for StaticPassword {
    fn request_password(&self, _template: &Path) -> Option<String> {
        Some(self.0.clone())
    }
}

impl<F> CredentialProvider for F
where
    F: Fn(&Path) -> Option<String>,
{
    fn request_password(&self, template: &Path) -> Option<String> {
        self(template)
    }
}

/// Outcome of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderSummary {
    pub output_path: PathBuf,
    pub pages_written: usize,
    pub rows_written: usize,
    /// Wrapped lines that did not fit in their field and were left out.
    pub truncated_lines: usize,
}

/// Produces hand receipts from one template.
pub struct Generator<C = NoCredentials> {
    template_path: PathBuf,
    credentials: C,
}

impl Generator<NoCredentials> {
    pub fn new(template_path: impl Into<PathBuf>) -> Self {
        Self { template_path: template_path.into(), credentials: NoCredentials }
    }
}

impl<C: CredentialProvider> Generator<C> {
    /// Replaces the source asked for a password when the template is protected.
    pub fn with_credentials<P: CredentialProvider>(self, credentials: P) -> Generator<P> {
        Generator { template_path: self.template_path, credentials }
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    /// Packs `items` into rows and renders them. See [`Generator::render_document`].
    pub fn generate(
        &self,
        output_path: &Path,
        meta: &HeaderMeta,
        items: &[IssuedItem],
        cfg: &LayoutConfig,
    ) -> Result<RenderSummary, GenerateError> {
        let rows = build_rows(items);
        self.render_document(output_path, meta, &rows, cfg)
    }

    /// Writes `rows` onto copies of the template pages and publishes the result
    /// at `output_path`, replacing any file already there.
    ///
    /// Template page 1 backs the first page; page 2, or page 1 again for a
    /// single-page template, backs every continuation page. On error nothing is
    /// written at `output_path`.
    pub fn render_document(
        &self,
        output_path: &Path,
        meta: &HeaderMeta,
        rows: &[LogicalRow],
        cfg: &LayoutConfig,
    ) -> Result<RenderSummary, GenerateError> {
        cfg.validate().map_err(GenerateError::InvalidLayout)?;

        let template = self.open_template()?;
        let template_pages = template.get_pages().len() as u32;
        let continuation_base = if template_pages >= 2 { 2 } else { 1 };

        let pages = paginate(rows, cfg);
        log::info!(
            "Rendering {} rows onto {} page(s) from {}",
            rows.len(),
            pages.len(),
            self.template_path.display()
        );

        let mut composer = OverlayComposer::new(&template);
        let mut truncated_lines = 0;
        for spec in &pages {
            let base_number = if spec.is_first { 1 } else { continuation_base };
            let base = composer.base_page(base_number)?;
            let surface =
                render_page(meta, spec.rows, spec.page_no, spec.of_pages, spec.is_first, cfg);
            truncated_lines += surface.truncated_lines;
            composer.push_page(&base, surface.to_overlay()?)?;
        }
        let pages_written = composer.page_count();
        let mut document = composer.finish();

        publish(&mut document, output_path)?;
        log::info!("Wrote {} page(s) to {}", pages_written, output_path.display());
        if truncated_lines > 0 {
            log::warn!("{} wrapped line(s) were dropped for lack of space", truncated_lines);
        }

        Ok(RenderSummary {
            output_path: output_path.to_path_buf(),
            pages_written,
            rows_written: rows.len(),
            truncated_lines,
        })
    }

    fn open_template(&self) -> Result<Document, GenerateError> {
        let path = &self.template_path;
        let bytes = fs::read(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => GenerateError::TemplateMissing { path: path.clone() },
            _ => GenerateError::TemplateUnreadable { path: path.clone(), reason: err.to_string() },
        })?;

        let document = open_document(&bytes, || self.credentials.request_password(path))
            .map_err(|err| match err {
                ComposerError::Locked(reason) => {
                    GenerateError::TemplateUnlockFailed { path: path.clone(), reason }
                }
                other => GenerateError::TemplateUnreadable {
                    path: path.clone(),
                    reason: other.to_string(),
                },
            })?;

        if document.get_pages().is_empty() {
            return Err(GenerateError::TemplateEmpty { path: path.clone() });
        }
        Ok(document)
    }
}

/// Saves `document` to a temporary file beside `output_path` and renames it
/// into place.
fn publish(document: &mut Document, output_path: &Path) -> Result<(), GenerateError> {
    let write_err = |source: io::Error| GenerateError::OutputWriteFailed {
        path: output_path.to_path_buf(),
        source,
    };

    let mut bytes = Vec::new();
    document
        .save_to(&mut bytes)
        .map_err(|err| write_err(io::Error::other(err.to_string())))?;

    let dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(&bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(output_path).map_err(|err| write_err(err.error))?;
    Ok(())
}
