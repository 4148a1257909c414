//! [`Canvas`] backed by `pdf-writer`: standard Helvetica fonts, deflated
//! content streams, image XObjects and URI link annotations.

use std::collections::HashMap;

use pdf_writer::types::{ActionType, AnnotationType};
use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str};
use tracing::debug;

use super::canvas::{Area, Canvas, Rgb, TextStyle};
use super::error::RenderError;
use super::fonts::{to_winansi, Font};
use super::raster::RasterImage;

const COMPRESSION_LEVEL: u8 = 6;

struct PageBuffer {
    content: Content,
    images: Vec<(String, Ref)>,
    links: Vec<(Area, String)>,
}

impl PageBuffer {
    fn new() -> Self {
        Self {
            content: Content::new(),
            images: Vec::new(),
            links: Vec::new(),
        }
    }
}

pub struct PdfCanvas {
    pdf: Pdf,
    next_id: i32,
    catalog_id: Ref,
    pages_id: Ref,
    fonts: [(Font, Ref); 2],
    width: f32,
    height: f32,
    pages: Vec<PageBuffer>,
    /// Written image XObjects by [`RasterImage::key`].
    xobjects: HashMap<u64, (String, Ref)>,
}

impl PdfCanvas {
    pub fn new(width: f32, height: f32) -> Result<Self, RenderError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(RenderError::CapabilityUnavailable(format!(
                "invalid page size {width}x{height}"
            )));
        }

        let mut pdf = Pdf::new();
        let catalog_id = Ref::new(1);
        let pages_id = Ref::new(2);
        let fonts = [(Font::Regular, Ref::new(3)), (Font::Bold, Ref::new(4))];
        for (font, id) in fonts {
            pdf.type1_font(id)
                .base_font(Name(font.base_font()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
        }

        Ok(Self {
            pdf,
            next_id: 5,
            catalog_id,
            pages_id,
            fonts,
            width,
            height,
            pages: Vec::new(),
            xobjects: HashMap::new(),
        })
    }

    fn alloc(&mut self) -> Ref {
        let id = Ref::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn page(&mut self) -> &mut PageBuffer {
        if self.pages.is_empty() {
            self.pages.push(PageBuffer::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Stores the pixels (and a soft mask for translucent images) as XObjects.
    fn write_image(&mut self, image: &RasterImage) -> (String, Ref) {
        let image_id = self.alloc();
        let mask_id = image.alpha_bytes().map(|alpha| {
            let mask_id = self.alloc();
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&alpha, COMPRESSION_LEVEL);
            let mut mask = self.pdf.image_xobject(mask_id, &compressed);
            mask.filter(Filter::FlateDecode);
            mask.width(image.width() as i32);
            mask.height(image.height() as i32);
            mask.color_space().device_gray();
            mask.bits_per_component(8);
            mask_id
        });

        let compressed =
            miniz_oxide::deflate::compress_to_vec_zlib(&image.rgb_bytes(), COMPRESSION_LEVEL);
        let mut xobject = self.pdf.image_xobject(image_id, &compressed);
        xobject.filter(Filter::FlateDecode);
        xobject.width(image.width() as i32);
        xobject.height(image.height() as i32);
        xobject.color_space().device_rgb();
        xobject.bits_per_component(8);
        if let Some(mask_id) = mask_id {
            xobject.s_mask(mask_id);
        }
        drop(xobject);

        let name = format!("Im{}", self.xobjects.len() + 1);
        debug!(%name, width = image.width(), height = image.height(), "embedding image");
        (name, image_id)
    }

    /// Writes the page tree and returns the finished document.
    pub fn finish(self) -> Result<Vec<u8>, RenderError> {
        if self.pages.is_empty() {
            return Err(RenderError::CapabilityUnavailable(
                "document has no pages".to_string(),
            ));
        }

        let PdfCanvas {
            mut pdf,
            mut next_id,
            catalog_id,
            pages_id,
            fonts,
            width,
            height,
            pages,
            ..
        } = self;
        let mut alloc = || {
            let id = Ref::new(next_id);
            next_id += 1;
            id
        };

        let mut page_ids = Vec::with_capacity(pages.len());
        for buffer in pages {
            let page_id = alloc();
            let content_id = alloc();

            let annotation_ids: Vec<Ref> = buffer
                .links
                .iter()
                .map(|(area, url)| {
                    let annotation_id = alloc();
                    let mut annotation = pdf.annotation(annotation_id);
                    annotation
                        .subtype(AnnotationType::Link)
                        .rect(to_rect(*area))
                        .border(0.0, 0.0, 0.0, None);
                    annotation
                        .action()
                        .action_type(ActionType::Uri)
                        .uri(Str(url.as_bytes()));
                    annotation_id
                })
                .collect();

            let raw = buffer.content.finish();
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), COMPRESSION_LEVEL);
            pdf.stream(content_id, &compressed)
                .filter(Filter::FlateDecode);

            let mut page = pdf.page(page_id);
            page.media_box(Rect::new(0.0, 0.0, width, height))
                .parent(pages_id)
                .contents(content_id);
            if !annotation_ids.is_empty() {
                page.annotations(annotation_ids.iter().copied());
            }
            {
                let mut resources = page.resources();
                {
                    let mut font_dict = resources.fonts();
                    for (font, font_id) in &fonts {
                        font_dict.pair(Name(font.resource_name()), *font_id);
                    }
                }
                if !buffer.images.is_empty() {
                    let mut xobjects = resources.x_objects();
                    for (name, xobject_id) in &buffer.images {
                        xobjects.pair(Name(name.as_bytes()), *xobject_id);
                    }
                }
            }
            drop(page);
            page_ids.push(page_id);
        }

        debug!(pages = page_ids.len(), "writing pdf page tree");
        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(page_ids.len() as i32);

        Ok(pdf.finish())
    }
}

fn to_rect(area: Area) -> Rect {
    Rect::new(area.x, area.y, area.x + area.width, area.y + area.height)
}

impl Canvas for PdfCanvas {
    fn start_page(&mut self) -> Result<(), RenderError> {
        self.pages.push(PageBuffer::new());
        Ok(())
    }

    fn text(&mut self, x: f32, y: f32, text: &str, style: TextStyle) {
        let encoded = to_winansi(text);
        let Rgb(r, g, b) = style.color;
        let content = &mut self.page().content;
        content.set_fill_rgb(r, g, b);
        content.begin_text();
        content.set_font(Name(style.font.resource_name()), style.size);
        content.next_line(x, y);
        content.show(Str(&encoded));
        content.end_text();
    }

    fn fill_rect(&mut self, area: Area, color: Rgb) {
        let Rgb(r, g, b) = color;
        let content = &mut self.page().content;
        content.set_fill_rgb(r, g, b);
        content.rect(area.x, area.y, area.width, area.height);
        content.fill_nonzero();
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgb) {
        let Rgb(r, g, b) = color;
        let content = &mut self.page().content;
        content.set_stroke_rgb(r, g, b);
        content.set_line_width(width);
        content.move_to(from.0, from.1);
        content.line_to(to.0, to.1);
        content.stroke();
    }

    fn image(&mut self, image: &RasterImage, area: Area) {
        let (name, image_id) = match self.xobjects.get(&image.key()) {
            Some(written) => written.clone(),
            None => {
                let written = self.write_image(image);
                self.xobjects.insert(image.key(), written.clone());
                written
            }
        };

        let page = self.page();
        page.content.save_state();
        page.content
            .transform([area.width, 0.0, 0.0, area.height, area.x, area.y]);
        page.content.x_object(Name(name.as_bytes()));
        page.content.restore_state();
        if !page.images.iter().any(|(existing, _)| *existing == name) {
            page.images.push((name, image_id));
        }
    }

    fn link(&mut self, area: Area, url: &str) {
        self.page().links.push((area, url.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_page_size() {
        assert!(matches!(
            PdfCanvas::new(0.0, 842.0),
            Err(RenderError::CapabilityUnavailable(_))
        ));
        assert!(PdfCanvas::new(f32::NAN, 842.0).is_err());
    }

    #[test]
    fn empty_document_cannot_finish() {
        let canvas = PdfCanvas::new(595.0, 842.0).unwrap();
        assert!(matches!(
            canvas.finish(),
            Err(RenderError::CapabilityUnavailable(_))
        ));
    }

    #[test]
    fn writes_a_pdf_with_every_page() {
        let mut canvas = PdfCanvas::new(595.0, 842.0).unwrap();
        for _ in 0..3 {
            canvas.start_page().unwrap();
            canvas.text(
                50.0,
                700.0,
                "Olá",
                TextStyle::new(Font::Regular, 11.0, Rgb::BLACK),
            );
        }
        canvas.link(
            Area {
                x: 50.0,
                y: 100.0,
                width: 80.0,
                height: 11.0,
            },
            "https://example.com",
        );
        assert_eq!(canvas.page_count(), 3);

        let bytes = canvas.finish().unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(text.contains("/Count 3"));
        assert!(text.contains("/URI (https://example.com)"));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
    }

    #[test]
    fn repeated_image_is_stored_once() {
        let logo = RasterImage::from_rgba(image::RgbaImage::from_pixel(
            8,
            4,
            image::Rgba([10, 20, 30, 128]),
        ));
        let photo = RasterImage::from_rgba(image::RgbaImage::from_pixel(
            6,
            6,
            image::Rgba([200, 10, 10, 255]),
        ));
        let area = Area {
            x: 10.0,
            y: 10.0,
            width: 40.0,
            height: 20.0,
        };

        let mut canvas = PdfCanvas::new(595.0, 842.0).unwrap();
        for _ in 0..4 {
            canvas.start_page().unwrap();
            canvas.image(&logo, area);
            canvas.image(&logo.clone(), area);
        }
        canvas.image(&photo, area);

        let bytes = canvas.finish().unwrap();
        let text = String::from_utf8_lossy(&bytes);
        // logo + its soft mask + the opaque photo
        assert_eq!(text.matches("/Subtype /Image").count(), 3);
        assert_eq!(text.matches("/Im1 ").count(), 4);
    }
}
