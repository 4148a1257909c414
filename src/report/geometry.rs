/// Points per centimetre.
pub const CM: f32 = 72.0 / 2.54;

pub const A4_WIDTH: f32 = 595.2756;
pub const A4_HEIGHT: f32 = 841.8898;

/// Fixed page layout. All distances are in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageGeometry {
    pub fn a4() -> Self {
        Self {
            width: A4_WIDTH,
            height: A4_HEIGHT,
            margin: 2.0 * CM,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    pub fn right_edge(&self) -> f32 {
        self.width - self.margin
    }

    /// Baseline of the first content line under the page header.
    pub fn content_top(&self) -> f32 {
        self.height - 2.5 * CM
    }

    /// Baseline of the repeating header title.
    pub fn header_baseline(&self) -> f32 {
        self.height - 1.5 * CM
    }

    pub fn header_rule(&self) -> f32 {
        self.height - 1.8 * CM
    }

    /// A line whose baseline would sit below this moves to a new page.
    pub fn bottom_reserve(&self) -> f32 {
        self.margin + 3.0 * CM
    }

    /// Bounding box for product photos.
    pub fn image_box(&self) -> (f32, f32) {
        (self.content_width(), 8.0 * CM)
    }
}

pub const PRODUCT_HEADING_STEP: f32 = 1.2 * CM;
pub const TITLE_STEP: f32 = 1.0 * CM;
pub const WRAPPED_TITLE_STEP: f32 = 0.7 * CM;
pub const IMAGE_SPACING: f32 = 0.5 * CM;
/// Advance used instead of an image when none is drawn.
pub const NO_IMAGE_SPACING: f32 = 1.0 * CM;
pub const SEPARATOR_STEP: f32 = 0.5 * CM;
pub const LINE_STEP: f32 = 0.6 * CM;
pub const HIGHLIGHT_STEP: f32 = 1.0 * CM;
pub const HIGHLIGHT_PADDING: f32 = 2.0;
pub const NOTE_LABEL_STEP: f32 = 0.5 * CM;
pub const NOTE_TRAILING_STEP: f32 = 0.4 * CM;
pub const LINK_LEAD: f32 = 0.7 * CM;
pub const LINK_STEP: f32 = 1.0 * CM;
pub const PRODUCT_TRAILING_STEP: f32 = 0.5 * CM;
pub const COVER_BRAND_WIDTH: f32 = 5.0 * CM;
pub const HEADER_BRAND_WIDTH: f32 = 3.5 * CM;
