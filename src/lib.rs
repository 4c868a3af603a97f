//! Hand receipt overlay engine.
//!
//! Packs issued equipment into two-line table rows, paginates them over a
//! fixed-layout PDF form and stamps the text onto copies of the form pages at
//! calibrated coordinates.
//!
//! ```no_run
//! use handreceipt::{Generator, HeaderMeta, IssuedItem, LayoutStore};
//! use std::path::Path;
//!
//! let cfg = LayoutStore::default().load();
//! let items = vec![IssuedItem::new("Laptop-X", "IT", "LX001", "")];
//! let meta = HeaderMeta::new("Supply Room", "PVT Jane Roe", "555-0100");
//! let summary = Generator::new("DA2062_flat.pdf")
//!     .generate(Path::new("receipt.pdf"), &meta, &items, &cfg)?;
//! println!("{} page(s)", summary.pages_written);
//! # Ok::<(), handreceipt::GenerateError>(())
//! ```

pub mod compositor;
pub mod config;
pub mod error;
pub mod naming;
pub mod pipeline;
pub mod rows;

pub use compositor::{HeaderMeta, PageSurface, TextRole, TextRun, render_page};
pub use config::{ConfigError, LayoutConfig, LayoutStore};
pub use error::GenerateError;
pub use pipeline::{
    CredentialProvider, Generator, NoCredentials, PageSpec, RenderSummary, StaticPassword,
    page_count, paginate,
};
pub use rows::{IssuedItem, LogicalRow, OrderedGroups, build_rows};

pub use handreceipt_layout::{FontMetrics, StandardFont, wrap};
