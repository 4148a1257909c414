//! Multi-product report layout.
//!
//! One cover page, then one page-sequence per product. A product never shares
//! a page with another; long content spills onto further pages that repeat
//! the header.

use time::{macros::format_description, Date};
use tracing::{debug, info, warn};

use crate::domain::{FeeRecord, LineKind};
use crate::infra::images::ImageSource;
use crate::util::assets::{AssetError, AssetStore, BRAND_MARK};

use super::canvas::{Area, Canvas, Rgb, TextStyle};
use super::error::RenderError;
use super::fonts::{wrap_text, Font, TextExtent};
use super::geometry::*;
use super::pdf::PdfCanvas;
use super::raster::RasterImage;

const REPORT_TITLE: &str = "Product Analysis";
const LINK_LABEL: &str = "Click to view the listing";

const COVER_TITLE: TextStyle = TextStyle::new(Font::Bold, 24.0, Rgb::AMBER);
const COVER_CLIENT: TextStyle = TextStyle::new(Font::Regular, 18.0, Rgb::BLACK);
const COVER_DATE: TextStyle = TextStyle::new(Font::Regular, 11.0, Rgb::GREY);
const HEADER: TextStyle = TextStyle::new(Font::Bold, 12.0, Rgb::BLACK);
const PRODUCT_HEADING: TextStyle = TextStyle::new(Font::Bold, 20.0, Rgb::NAVY);
const PRODUCT_TITLE: TextStyle = TextStyle::new(Font::Bold, 16.0, Rgb::NAVY);
const BODY: TextStyle = TextStyle::new(Font::Regular, 11.0, Rgb::BLACK);
const NET_VALUE: TextStyle = TextStyle::new(Font::Bold, 12.0, Rgb::GREEN);
const NOTE_LABEL: TextStyle = TextStyle::new(Font::Bold, 12.0, Rgb::BLUE);
const LINK: TextStyle = TextStyle::new(Font::Bold, 12.0, Rgb::BLUE);

#[derive(Clone, Debug, PartialEq)]
pub struct ReportOptions {
    pub client_name: String,
    pub include_links: bool,
    /// Shown in every page header.
    pub agency_name: String,
    pub currency: String,
    pub generated_on: Option<Date>,
}

impl ReportOptions {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            include_links: true,
            agency_name: "Seller Desk".to_string(),
            currency: "R$".to_string(),
            generated_on: None,
        }
    }
}

/// Pages produced for one product. Page numbers are zero-based and count the cover.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSequence {
    pub product_index: usize,
    pub first_page: usize,
    pub page_count: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutSummary {
    pub total_pages: usize,
    pub sequences: Vec<PageSequence>,
}

pub struct ReportRenderer<'a> {
    geometry: PageGeometry,
    assets: &'a dyn AssetStore,
    images: &'a dyn ImageSource,
}

impl<'a> ReportRenderer<'a> {
    pub fn new(assets: &'a dyn AssetStore, images: &'a dyn ImageSource) -> Self {
        Self {
            geometry: PageGeometry::default(),
            assets,
            images,
        }
    }

    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    /// Renders the full report to PDF bytes.
    pub fn render(
        &self,
        products: &[FeeRecord],
        options: &ReportOptions,
    ) -> Result<Vec<u8>, RenderError> {
        let mut canvas = PdfCanvas::new(self.geometry.width, self.geometry.height)?;
        let summary = self.render_to(&mut canvas, products, options)?;
        let bytes = canvas.finish()?;
        info!(
            pages = summary.total_pages,
            bytes = bytes.len(),
            "report rendered"
        );
        Ok(bytes)
    }

    /// Lays the report out on any [`Canvas`].
    pub fn render_to<C: Canvas>(
        &self,
        canvas: &mut C,
        products: &[FeeRecord],
        options: &ReportOptions,
    ) -> Result<LayoutSummary, RenderError> {
        if options.client_name.trim().is_empty() {
            return Err(RenderError::MissingClientName);
        }
        info!(
            products = products.len(),
            client = %options.client_name,
            "rendering report"
        );

        let brand = self.brand_mark();
        let mut flow = PageFlow {
            canvas,
            geometry: self.geometry,
            header: format!("{} | {REPORT_TITLE}", options.agency_name),
            brand: brand.as_ref(),
            pages_opened: 0,
            y: 0.0,
        };

        self.draw_cover(&mut flow, options)?;

        let mut sequences = Vec::with_capacity(products.len());
        for (index, product) in products.iter().enumerate() {
            let first_page = flow.pages_opened;
            self.draw_product(&mut flow, index, products.len(), product, options)?;
            sequences.push(PageSequence {
                product_index: index,
                first_page,
                page_count: flow.pages_opened - first_page,
            });
        }

        Ok(LayoutSummary {
            total_pages: flow.pages_opened,
            sequences,
        })
    }

    fn brand_mark(&self) -> Option<RasterImage> {
        let loaded = self
            .assets
            .lookup(BRAND_MARK)
            .and_then(|bytes| RasterImage::decode(&bytes));
        match loaded {
            Ok(image) => Some(image),
            Err(err) => {
                warn!(error = %err, "brand mark unavailable; omitting it");
                None
            }
        }
    }

    fn product_photo(&self, url: &str) -> Result<RasterImage, AssetError> {
        let bytes = self.images.fetch(url)?;
        RasterImage::decode(&bytes)
    }

    fn draw_cover<C: Canvas>(
        &self,
        flow: &mut PageFlow<'_, C>,
        options: &ReportOptions,
    ) -> Result<(), RenderError> {
        let g = self.geometry;
        flow.open_blank_page()?;

        if let Some(brand) = flow.brand {
            let width = COVER_BRAND_WIDTH;
            let height = width * brand.aspect();
            flow.canvas.image(
                brand,
                Area {
                    x: g.right_edge() - width,
                    y: g.height - height - 1.5 * CM,
                    width,
                    height,
                },
            );
        }

        flow.canvas
            .text(g.margin, g.height - 5.0 * CM, REPORT_TITLE, COVER_TITLE);
        flow.canvas.line(
            (g.margin, g.height - 5.2 * CM),
            (g.right_edge(), g.height - 5.2 * CM),
            1.0,
            Rgb::GREY,
        );
        flow.canvas.text(
            g.margin,
            g.height - 7.0 * CM,
            &format!("Client: {}", options.client_name.trim()),
            COVER_CLIENT,
        );

        if let Some(date) = options.generated_on {
            match date.format(format_description!("[day]/[month]/[year]")) {
                Ok(formatted) => flow.canvas.text(
                    g.margin,
                    g.height - 8.0 * CM,
                    &format!("Generated on {formatted}"),
                    COVER_DATE,
                ),
                Err(err) => warn!(error = %err, "could not format report date"),
            }
        }
        Ok(())
    }

    fn draw_product<C: Canvas>(
        &self,
        flow: &mut PageFlow<'_, C>,
        index: usize,
        total: usize,
        product: &FeeRecord,
        options: &ReportOptions,
    ) -> Result<(), RenderError> {
        let g = self.geometry;
        flow.open_page()?;

        flow.write(&format!("Product {} of {total}", index + 1), PRODUCT_HEADING);
        flow.y -= PRODUCT_HEADING_STEP;

        let title_lines = wrap_text(
            &product.title,
            PRODUCT_TITLE.font,
            PRODUCT_TITLE.size,
            g.content_width(),
        );
        for (line_index, line) in title_lines.iter().enumerate() {
            if line_index > 0 {
                flow.y -= WRAPPED_TITLE_STEP;
                flow.ensure_room()?;
            }
            flow.write(line, PRODUCT_TITLE);
        }
        flow.y -= TITLE_STEP;

        self.draw_photo(flow, product)?;

        flow.canvas
            .line((g.margin, flow.y), (g.right_edge(), flow.y), 0.5, Rgb::GREY);
        flow.y -= SEPARATOR_STEP;

        for line in product.summary_lines(&options.currency) {
            if line.kind.is_headline() {
                continue;
            }
            flow.ensure_room()?;
            if line.kind == LineKind::NetRange {
                let extent = TextExtent::measure(
                    &line.text,
                    NET_VALUE.font,
                    NET_VALUE.size,
                    g.margin,
                    flow.y,
                );
                flow.canvas
                    .fill_rect(extent.padded(HIGHLIGHT_PADDING), Rgb::PALE_GREEN);
                flow.write(&line.text, NET_VALUE);
                flow.y -= HIGHLIGHT_STEP;
            } else {
                flow.write(&line.text, BODY);
                flow.y -= LINE_STEP;
            }
        }

        if let Some(note) = product.note.as_deref().filter(|note| !note.trim().is_empty()) {
            // The label never ends a page on its own.
            flow.ensure_room_below(NOTE_LABEL_STEP)?;
            flow.write("Note:", NOTE_LABEL);
            flow.y -= NOTE_LABEL_STEP;
            for paragraph in note.lines() {
                for line in wrap_text(paragraph, BODY.font, BODY.size, g.content_width()) {
                    flow.ensure_room()?;
                    flow.write(&line, BODY);
                    flow.y -= LINE_STEP;
                }
            }
            flow.y -= NOTE_TRAILING_STEP;
        }

        let url = product.source_url.trim();
        if options.include_links && !url.is_empty() {
            flow.y -= LINK_LEAD;
            flow.ensure_room()?;
            let extent = TextExtent::measure(LINK_LABEL, LINK.font, LINK.size, g.margin, flow.y);
            flow.write(LINK_LABEL, LINK);
            flow.canvas.link(extent.area(), url);
            flow.canvas.line(
                (extent.x, flow.y - 1.0),
                (extent.x + extent.width, flow.y - 1.0),
                1.0,
                Rgb::BLUE,
            );
            flow.y -= LINK_STEP;
        } else {
            flow.y -= PRODUCT_TRAILING_STEP;
        }

        Ok(())
    }

    fn draw_photo<C: Canvas>(
        &self,
        flow: &mut PageFlow<'_, C>,
        product: &FeeRecord,
    ) -> Result<(), RenderError> {
        let Some(url) = product.photo_url.as_deref() else {
            flow.y -= NO_IMAGE_SPACING;
            return Ok(());
        };

        let photo = match self.product_photo(url) {
            Ok(photo) => photo,
            Err(err) => {
                warn!(url, error = %err, "product image unavailable; continuing without it");
                flow.y -= NO_IMAGE_SPACING;
                return Ok(());
            }
        };

        let (max_width, max_height) = self.geometry.image_box();
        let thumb = photo.thumbnail(max_width, max_height);
        let (width, height) = (thumb.width() as f32, thumb.height() as f32);

        if flow.y - height < self.geometry.bottom_reserve() {
            flow.open_page()?;
        }
        let bottom = flow.y - height;
        flow.canvas.image(
            &thumb,
            Area {
                x: self.geometry.margin,
                y: bottom,
                width,
                height,
            },
        );
        flow.y = bottom - IMAGE_SPACING;
        Ok(())
    }
}

/// Cursor over the pages of the document being drawn.
struct PageFlow<'a, C> {
    canvas: &'a mut C,
    geometry: PageGeometry,
    header: String,
    brand: Option<&'a RasterImage>,
    pages_opened: usize,
    y: f32,
}

impl<C: Canvas> PageFlow<'_, C> {
    fn open_blank_page(&mut self) -> Result<(), RenderError> {
        self.canvas.start_page()?;
        self.pages_opened += 1;
        self.y = self.geometry.content_top();
        Ok(())
    }

    /// New page with the repeating header drawn and the cursor at the top.
    fn open_page(&mut self) -> Result<(), RenderError> {
        self.open_blank_page()?;
        self.draw_header();
        Ok(())
    }

    fn draw_header(&mut self) {
        let g = self.geometry;
        self.canvas
            .text(g.margin, g.header_baseline(), &self.header, HEADER);

        if let Some(brand) = self.brand {
            let width = HEADER_BRAND_WIDTH;
            let height = width * brand.aspect();
            self.canvas.image(
                brand,
                Area {
                    x: g.right_edge() - width,
                    y: g.header_baseline() - height / 2.0,
                    width,
                    height,
                },
            );
        }

        self.canvas.line(
            (g.margin, g.header_rule()),
            (g.right_edge(), g.header_rule()),
            0.5,
            Rgb::GREY,
        );
    }

    /// Breaks to a new page when the cursor has passed the bottom reserve.
    fn ensure_room(&mut self) -> Result<(), RenderError> {
        self.ensure_room_below(0.0)
    }

    /// Like [`ensure_room`](Self::ensure_room), but also keeps a line
    /// `depth` further down on the current page.
    fn ensure_room_below(&mut self, depth: f32) -> Result<(), RenderError> {
        if self.y - depth < self.geometry.bottom_reserve() {
            debug!(page = self.pages_opened + 1, "page break");
            self.open_page()?;
        }
        Ok(())
    }

    fn write(&mut self, text: &str, style: TextStyle) {
        self.canvas.text(self.geometry.margin, self.y, text, style);
    }
}
