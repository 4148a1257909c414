//! Network collaborators: listing pages and product photos.

pub mod images;
pub mod listing;

pub use images::{HttpImageSource, ImageSource, NoImages};
pub use listing::{parse_listing_html, FetchError, ListingFetcher};
