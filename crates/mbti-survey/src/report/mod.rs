//! Personality report shared by the result page and the PDF export.

mod document;
mod export;
mod insights;
pub mod views;

pub use document::render_markdown;
pub use export::{pdf_filename, ExportError, ReportExporter};
pub use views::{DimensionDetail, ReportInsights, ResultView};

pub(crate) use insights::generate_insights;
