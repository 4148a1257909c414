//! Marketplace fee math: listing classification, fixed-fee brackets and the
//! net proceeds range.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

use super::entities::{FeeRecord, ListingAttributes, ListingType, Money, Percent};

const HUNDRED: Decimal = dec!(100);

impl ListingType {
    /// `[min, max]` commission the marketplace may charge for this listing type.
    pub fn commission_band(&self) -> (Percent, Percent) {
        match self {
            ListingType::Premium => (dec!(16.5), dec!(19.0)),
            ListingType::Classic => (dec!(11.5), dec!(14.0)),
        }
    }
}

/// Flat fee by price bracket. Brackets are half-open with an inclusive lower bound.
pub fn fixed_fee_for(price: Money) -> Money {
    if price < dec!(30) {
        dec!(6.25)
    } else if price < dec!(50) {
        dec!(6.50)
    } else if price < dec!(79) {
        dec!(6.75)
    } else {
        dec!(20.00)
    }
}

/// Decides the listing type. Swappable so a structured field can replace the
/// text heuristic without touching the fee math.
pub trait ListingClassifier {
    fn classify(&self, attrs: &ListingAttributes) -> ListingType;
}

/// Trusts the fetcher's installment signal.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignalClassifier;

impl ListingClassifier for SignalClassifier {
    fn classify(&self, attrs: &ListingAttributes) -> ListingType {
        if attrs.listing_type_signal {
            ListingType::Premium
        } else {
            ListingType::Classic
        }
    }
}

impl<F> ListingClassifier for F
where
    F: Fn(&ListingAttributes) -> ListingType,
{
    fn classify(&self, attrs: &ListingAttributes) -> ListingType {
        self(attrs)
    }
}

/// Best-effort scan of rendered page text for an interest-free installment offer.
///
/// Case is ignored and every run of whitespace or punctuation counts as a single
/// space, so `"Sem-Juros"`, `"sem\n juros"` and `"(SEM JUROS)"` all match.
#[derive(Clone, Debug)]
pub struct InstallmentPhrase {
    phrases: Vec<String>,
}

impl Default for InstallmentPhrase {
    fn default() -> Self {
        Self::new(["sem juros", "interest free"])
    }
}

impl InstallmentPhrase {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases = phrases
            .into_iter()
            .map(|phrase| normalize(phrase.as_ref()))
            .filter(|phrase| !phrase.is_empty())
            .collect();
        Self { phrases }
    }

    pub fn detect(&self, text: &str) -> bool {
        let haystack = normalize(text);
        self.phrases.iter().any(|phrase| haystack.contains(phrase))
    }
}

fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateError {
    #[error("rate must not be negative: {0}")]
    Negative(Decimal),
    #[error("invalid rate: {0:?}")]
    Invalid(String),
}

/// Operator-supplied rates applied on top of the marketplace fees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeRates {
    pub tax_rate_pct: Percent,
    pub partner_commission_pct: Percent,
}

impl FeeRates {
    pub fn new(tax_rate_pct: Percent, partner_commission_pct: Percent) -> Result<Self, RateError> {
        for value in [tax_rate_pct, partner_commission_pct] {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(RateError::Negative(value));
            }
        }
        Ok(Self {
            tax_rate_pct,
            partner_commission_pct,
        })
    }
}

/// Parses operator input such as `"12.5"`, `"12,5"` or `""` (zero).
pub fn parse_percent(input: &str) -> Result<Percent, RateError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let value = Decimal::from_str(&trimmed.replace(',', "."))
        .map_err(|_| RateError::Invalid(trimmed.to_string()))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(RateError::Negative(value));
    }
    Ok(value)
}

/// Pure fee calculator. Never fails: an unknown price yields zeroed amounts
/// and no net range.
#[derive(Clone, Debug, Default)]
pub struct FeeCalculator<C = SignalClassifier> {
    classifier: C,
}

impl FeeCalculator<SignalClassifier> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: ListingClassifier> FeeCalculator<C> {
    pub fn with_classifier(classifier: C) -> Self {
        Self { classifier }
    }

    pub fn compute(&self, attrs: &ListingAttributes, rates: FeeRates) -> FeeRecord {
        let listing_type = self.classifier.classify(attrs);
        let (commission_min, commission_max) = listing_type.commission_band();

        let price = attrs.price;
        let amounts = price
            .and_then(|p| PricedAmounts::derive(p, rates, commission_min, commission_max))
            .unwrap_or_default();

        FeeRecord {
            title: attrs.title.clone(),
            price,
            listing_type,
            commission_min,
            commission_max,
            fixed_fee: amounts.fixed_fee,
            tax_rate_pct: rates.tax_rate_pct,
            tax_amount: amounts.tax_amount,
            partner_commission_pct: rates.partner_commission_pct,
            partner_commission_amount: amounts.partner_commission_amount,
            net_min: amounts.net_min,
            net_max: amounts.net_max,
            photo_url: attrs.photo_url.clone(),
            note: None,
            source_url: attrs.source_url.clone(),
        }
    }
}

/// Amounts that only exist for a known price. `Default` is the unpriced
/// record: zero amounts and no net range.
#[derive(Default)]
struct PricedAmounts {
    fixed_fee: Money,
    tax_amount: Money,
    partner_commission_amount: Money,
    net_min: Option<Money>,
    net_max: Option<Money>,
}

impl PricedAmounts {
    /// `None` when any product leaves the `Decimal` range; the record is then
    /// reported as if the price could not be used.
    fn derive(
        price: Money,
        rates: FeeRates,
        commission_min: Percent,
        commission_max: Percent,
    ) -> Option<Self> {
        let fixed_fee = fixed_fee_for(price);
        let tax_amount = price.checked_mul(rates.tax_rate_pct)?.checked_div(HUNDRED)?;
        let partner_commission_amount = price
            .checked_mul(rates.partner_commission_pct)?
            .checked_div(HUNDRED)?;

        // Not clamped: a negative net is the signal that fees exceed revenue.
        let net_after = |commission: Percent| {
            price
                .checked_mul(Decimal::ONE - commission / HUNDRED)?
                .checked_sub(fixed_fee)?
                .checked_sub(tax_amount)?
                .checked_sub(partner_commission_amount)
        };

        Some(Self {
            fixed_fee,
            tax_amount,
            partner_commission_amount,
            net_min: Some(net_after(commission_max)?),
            net_max: Some(net_after(commission_min)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::LineKind;

    fn attrs(price: Option<Decimal>, premium: bool) -> ListingAttributes {
        ListingAttributes {
            title: "Cafeteira Elétrica".to_string(),
            price,
            listing_type_signal: premium,
            photo_url: None,
            source_url: "https://example.com/item".to_string(),
        }
    }

    fn rates(tax: Decimal, partner: Decimal) -> FeeRates {
        FeeRates::new(tax, partner).unwrap()
    }

    #[test]
    fn fixed_fee_brackets_have_exact_boundaries() {
        assert_eq!(fixed_fee_for(dec!(0)), dec!(6.25));
        assert_eq!(fixed_fee_for(dec!(29.99)), dec!(6.25));
        assert_eq!(fixed_fee_for(dec!(30.00)), dec!(6.50));
        assert_eq!(fixed_fee_for(dec!(49.99)), dec!(6.50));
        assert_eq!(fixed_fee_for(dec!(50.00)), dec!(6.75));
        assert_eq!(fixed_fee_for(dec!(78.99)), dec!(6.75));
        assert_eq!(fixed_fee_for(dec!(79.00)), dec!(20.00));
    }

    #[test]
    fn classic_scenario_matches_hand_computation() {
        let record = FeeCalculator::new().compute(
            &attrs(Some(dec!(100)), false),
            rates(dec!(5), dec!(10)),
        );

        assert_eq!(record.listing_type, ListingType::Classic);
        assert_eq!(record.fixed_fee, dec!(20.00));
        assert_eq!(record.tax_amount, dec!(5.00));
        assert_eq!(record.partner_commission_amount, dec!(10.00));
        assert_eq!(record.net_min, Some(dec!(51.00)));
        assert_eq!(record.net_max, Some(dec!(53.50)));
    }

    #[test]
    fn premium_uses_higher_band() {
        let record =
            FeeCalculator::new().compute(&attrs(Some(dec!(40)), true), FeeRates::default());

        assert_eq!(record.listing_type, ListingType::Premium);
        assert_eq!(
            (record.commission_min, record.commission_max),
            (dec!(16.5), dec!(19.0))
        );
        // 40 * 0.81 - 6.50
        assert_eq!(record.net_min, Some(dec!(25.90)));
        // 40 * 0.835 - 6.50
        assert_eq!(record.net_max, Some(dec!(26.90)));
    }

    #[test]
    fn missing_price_zeroes_derived_amounts() {
        let record =
            FeeCalculator::new().compute(&attrs(None, false), rates(dec!(12.5), dec!(10)));

        assert_eq!(record.fixed_fee, Decimal::ZERO);
        assert_eq!(record.tax_amount, Decimal::ZERO);
        assert_eq!(record.partner_commission_amount, Decimal::ZERO);
        assert_eq!(record.net_min, None);
        assert_eq!(record.net_max, None);
        assert!(record.net_range().is_err());
    }

    #[test]
    fn negative_net_is_kept() {
        let record = FeeCalculator::new().compute(
            &attrs(Some(dec!(10)), true),
            rates(dec!(20), dec!(30)),
        );
        let (min, max) = record.net_range().unwrap();
        assert!(min < Decimal::ZERO);
        assert!(max < Decimal::ZERO);
        assert!(min <= max);
    }

    #[test]
    fn compute_is_deterministic() {
        let calculator = FeeCalculator::new();
        let input = attrs(Some(dec!(57.35)), true);
        let first = calculator.compute(&input, rates(dec!(7.3), dec!(4)));
        let second = calculator.compute(&input, rates(dec!(7.3), dec!(4)));
        assert_eq!(first, second);
    }

    #[test]
    fn injected_classifier_replaces_signal() {
        let calculator = FeeCalculator::with_classifier(|_: &ListingAttributes| ListingType::Premium);
        let record = calculator.compute(&attrs(Some(dec!(100)), false), FeeRates::default());
        assert_eq!(record.listing_type, ListingType::Premium);
    }

    #[test]
    fn phrase_detection_ignores_case_and_punctuation() {
        let phrase = InstallmentPhrase::default();
        assert!(phrase.detect("em até 10x SEM JUROS!"));
        assert!(phrase.detect("10x\n  sem\t juros"));
        assert!(phrase.detect("(Sem-Juros)"));
        assert!(phrase.detect("Pay in 3 interest-free installments"));
        assert!(!phrase.detect("10x com juros"));
        assert!(!phrase.detect(""));
    }

    #[test]
    fn parse_percent_accepts_comma_and_blank() {
        assert_eq!(parse_percent("12,5"), Ok(dec!(12.5)));
        assert_eq!(parse_percent(" 10 "), Ok(dec!(10)));
        assert_eq!(parse_percent(""), Ok(Decimal::ZERO));
        assert!(matches!(parse_percent("abc"), Err(RateError::Invalid(_))));
        assert!(matches!(parse_percent("-1"), Err(RateError::Negative(_))));
    }

    #[test]
    fn negative_rates_are_rejected() {
        assert_eq!(
            FeeRates::new(dec!(-1), dec!(0)),
            Err(RateError::Negative(dec!(-1)))
        );
    }

    #[test]
    fn summary_lines_follow_price_presence() {
        let calculator = FeeCalculator::new();
        let priced = calculator.compute(&attrs(Some(dec!(100)), false), rates(dec!(5), dec!(10)));
        let texts: Vec<_> = priced
            .summary_lines("R$")
            .into_iter()
            .map(|line| line.text)
            .collect();
        assert_eq!(
            texts,
            vec![
                "Title: Cafeteira Elétrica".to_string(),
                "Price: R$ 100.00".to_string(),
                "Tax rate: 5.00% (R$ 5.00)".to_string(),
                "Partner commission: 10.00% (R$ 10.00)".to_string(),
                "Estimated net value: from R$ 51.00 to R$ 53.50".to_string(),
            ]
        );

        let unpriced = calculator.compute(&attrs(None, false), FeeRates::default());
        let kinds: Vec<_> = unpriced
            .summary_lines("R$")
            .into_iter()
            .map(|line| line.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                LineKind::PriceMissing,
                LineKind::Tax,
                LineKind::PartnerCommission,
                LineKind::NetUnavailable,
            ]
        );
    }

    #[test]
    fn blank_note_is_dropped() {
        let record = FeeCalculator::new()
            .compute(&attrs(Some(dec!(10)), false), FeeRates::default())
            .with_note("   ");
        assert_eq!(record.note, None);
    }

    #[test]
    fn out_of_range_amounts_leave_the_net_unestimated() {
        let huge_rate = parse_percent("1000000000000000").unwrap();
        let record = FeeCalculator::new().compute(
            &attrs(Some(dec!(1000000000000000)), false),
            rates(huge_rate, dec!(10)),
        );

        assert_eq!(record.price, Some(dec!(1000000000000000)));
        assert_eq!(record.tax_amount, Decimal::ZERO);
        assert_eq!(record.partner_commission_amount, Decimal::ZERO);
        assert!(record.net_range().is_err());
        assert!(record
            .summary_lines("R$")
            .iter()
            .any(|line| line.kind == LineKind::NetUnavailable));

        let record = FeeCalculator::new().compute(
            &attrs(Some(Decimal::MAX), true),
            rates(dec!(5), dec!(5)),
        );
        assert!(record.net_range().is_err());
    }
}
