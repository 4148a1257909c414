use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Two-decimal currency amount. Kept exact; rounding only happens on display.
pub type Money = Decimal;

/// Percentage expressed in points (`16.5` means 16.5%).
pub type Percent = Decimal;

/// Flat attribute record produced by the listing fetcher.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListingAttributes {
    pub title: String,
    pub price: Option<Money>,
    /// True when the page text advertises interest-free installments.
    pub listing_type_signal: bool,
    pub photo_url: Option<String>,
    pub source_url: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingType {
    Premium,
    Classic,
}

impl ListingType {
    pub fn name(&self) -> &'static str {
        match self {
            ListingType::Premium => "Premium",
            ListingType::Classic => "Classic",
        }
    }
}

/// Fully resolved fee estimate for one listing. Immutable once handed out.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeeRecord {
    pub title: String,
    pub price: Option<Money>,
    pub listing_type: ListingType,
    pub commission_min: Percent,
    pub commission_max: Percent,
    pub fixed_fee: Money,
    pub tax_rate_pct: Percent,
    pub tax_amount: Money,
    pub partner_commission_pct: Percent,
    pub partner_commission_amount: Money,
    pub net_min: Option<Money>,
    pub net_max: Option<Money>,
    pub photo_url: Option<String>,
    pub note: Option<String>,
    pub source_url: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("listing price is unavailable")]
pub struct PriceUnavailable;

impl FeeRecord {
    /// Attaches the operator's free-text note. Blank notes are dropped.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        let trimmed = note.trim();
        self.note = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    /// `(net_min, net_max)`, or the absence of a price as an error value.
    pub fn net_range(&self) -> Result<(Money, Money), PriceUnavailable> {
        match (self.net_min, self.net_max) {
            (Some(min), Some(max)) => Ok((min, max)),
            _ => Err(PriceUnavailable),
        }
    }

    /// Breakdown lines in display order. Headline kinds come first so the
    /// renderer can drop what it already shows structurally.
    pub fn summary_lines(&self, currency: &str) -> Vec<SummaryLine> {
        let mut lines = Vec::with_capacity(6);

        match self.price {
            Some(price) => {
                lines.push(SummaryLine::new(
                    LineKind::Title,
                    format!("Title: {}", self.title),
                ));
                lines.push(SummaryLine::new(
                    LineKind::Price,
                    format!("Price: {currency} {price:.2}"),
                ));
            }
            None => lines.push(SummaryLine::new(LineKind::PriceMissing, "Price not found")),
        }

        lines.push(SummaryLine::new(
            LineKind::Tax,
            format!(
                "Tax rate: {:.2}% ({currency} {:.2})",
                self.tax_rate_pct, self.tax_amount
            ),
        ));
        lines.push(SummaryLine::new(
            LineKind::PartnerCommission,
            format!(
                "Partner commission: {:.2}% ({currency} {:.2})",
                self.partner_commission_pct, self.partner_commission_amount
            ),
        ));

        match self.net_range() {
            Ok((min, max)) => lines.push(SummaryLine::new(
                LineKind::NetRange,
                format!("Estimated net value: from {currency} {min:.2} to {currency} {max:.2}"),
            )),
            Err(PriceUnavailable) => lines.push(SummaryLine::new(
                LineKind::NetUnavailable,
                "Unable to estimate the net value.",
            )),
        }

        lines
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    Title,
    Price,
    PriceMissing,
    Tax,
    PartnerCommission,
    NetRange,
    NetUnavailable,
}

impl LineKind {
    /// Lines already rendered as the product headline.
    pub fn is_headline(&self) -> bool {
        matches!(self, LineKind::Title | LineKind::Price)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryLine {
    pub kind: LineKind,
    pub text: String,
}

impl SummaryLine {
    fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}
