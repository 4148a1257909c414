//! Paginated PDF report over a sequence of fee records.

pub mod canvas;
pub mod error;
pub mod fonts;
pub mod geometry;
pub mod pdf;
pub mod raster;
pub mod renderer;

pub use canvas::{Area, Canvas, Rgb, TextStyle};
pub use error::RenderError;
pub use fonts::{Font, TextExtent};
pub use geometry::PageGeometry;
pub use pdf::PdfCanvas;
pub use raster::RasterImage;
pub use renderer::{LayoutSummary, PageSequence, ReportOptions, ReportRenderer};
