//! Fee estimation logic and the product working set live here.

pub mod entities;
pub mod fees;
pub mod products;

pub use entities::{
    FeeRecord, LineKind, ListingAttributes, ListingType, Money, Percent, PriceUnavailable,
    SummaryLine,
};
pub use fees::{
    fixed_fee_for, parse_percent, FeeCalculator, FeeRates, InstallmentPhrase, ListingClassifier,
    RateError, SignalClassifier,
};
pub use products::{ProductCollection, ProductEntry};
