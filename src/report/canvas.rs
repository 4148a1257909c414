use super::error::RenderError;
use super::fonts::Font;
use super::raster::RasterImage;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const GREY: Rgb = Rgb(0.5, 0.5, 0.5);
    pub const NAVY: Rgb = Rgb(0.0, 0.0, 0.5);
    pub const BLUE: Rgb = Rgb(0.0, 0.0, 1.0);
    pub const AMBER: Rgb = Rgb(1.0, 0.7, 0.0);
    pub const GREEN: Rgb = Rgb(0.0, 0.5, 0.0);
    pub const PALE_GREEN: Rgb = Rgb(0.9, 1.0, 0.9);
}

/// Axis-aligned box in PDF user space; `y` is the bottom edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Area {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
    pub color: Rgb,
}

impl TextStyle {
    pub const fn new(font: Font, size: f32, color: Rgb) -> Self {
        Self { font, size, color }
    }
}

/// Page-drawing capability the renderer lays out against. Coordinates are
/// points with the origin at the bottom-left of the current page.
///
/// Only opening a page can fail; everything drawn afterwards lands on the
/// most recently opened page.
pub trait Canvas {
    fn start_page(&mut self) -> Result<(), RenderError>;
    fn text(&mut self, x: f32, y: f32, text: &str, style: TextStyle);
    fn fill_rect(&mut self, area: Area, color: Rgb);
    fn line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgb);
    fn image(&mut self, image: &RasterImage, area: Area);
    /// Clickable region opening `url`.
    fn link(&mut self, area: Area, url: &str);
}
