use proptest::prelude::*;
use rust_decimal::Decimal;

use listing_net_report::domain::{
    fixed_fee_for, FeeCalculator, FeeRates, InstallmentPhrase, ListingAttributes, ListingType,
};

fn listing(price: Option<Decimal>, premium: bool) -> ListingAttributes {
    ListingAttributes {
        title: "Produto".to_string(),
        price,
        listing_type_signal: premium,
        photo_url: None,
        source_url: "https://example.com/produto".to_string(),
    }
}

fn money(cents: u32) -> Decimal {
    Decimal::new(cents as i64, 2)
}

proptest! {
    #[test]
    fn net_max_never_below_net_min(
        cents in 0u32..10_000_000,
        tax in 0u32..10_000,
        partner in 0u32..10_000,
        premium in any::<bool>(),
    ) {
        let rates = FeeRates::new(money(tax), money(partner)).unwrap();
        let record = FeeCalculator::new().compute(&listing(Some(money(cents)), premium), rates);

        let (min, max) = record.net_range().unwrap();
        prop_assert!(record.commission_max >= record.commission_min);
        prop_assert!(max >= min);
    }

    #[test]
    fn unknown_price_never_produces_amounts(
        tax in 0u32..10_000,
        partner in 0u32..10_000,
        premium in any::<bool>(),
    ) {
        let rates = FeeRates::new(money(tax), money(partner)).unwrap();
        let record = FeeCalculator::new().compute(&listing(None, premium), rates);

        prop_assert_eq!(record.fixed_fee, Decimal::ZERO);
        prop_assert_eq!(record.tax_amount, Decimal::ZERO);
        prop_assert_eq!(record.partner_commission_amount, Decimal::ZERO);
        prop_assert_eq!(record.net_min, None);
        prop_assert_eq!(record.net_max, None);
    }

    #[test]
    fn compute_is_pure(
        cents in proptest::option::of(0u32..1_000_000),
        tax in 0u32..5_000,
        premium in any::<bool>(),
    ) {
        let calculator = FeeCalculator::new();
        let attrs = listing(cents.map(money), premium);
        let rates = FeeRates::new(money(tax), Decimal::ZERO).unwrap();

        prop_assert_eq!(calculator.compute(&attrs, rates), calculator.compute(&attrs, rates));
    }

    #[test]
    fn fixed_fee_is_monotonic(a in 0u32..20_000, b in 0u32..20_000) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(fixed_fee_for(money(low)) <= fixed_fee_for(money(high)));
    }

    #[test]
    fn trigger_phrase_found_regardless_of_case_and_punctuation(
        before in "[ .,;:!?()\\-\n\t]{0,6}",
        between in "[ .,;:\\-\n\t]{1,4}",
        after in "[ .,;:!?()\\-\n\t]{0,6}",
        upper in proptest::collection::vec(any::<bool>(), 8),
    ) {
        let word = |text: &str, flags: &[bool]| -> String {
            text.chars()
                .zip(flags.iter().cycle())
                .map(|(ch, up)| if *up { ch.to_ascii_uppercase() } else { ch })
                .collect()
        };
        let text = format!(
            "Em até 12x{before}{}{between}{}{after}no cartão",
            word("sem", &upper[..3]),
            word("juros", &upper[3..]),
        );

        prop_assert!(InstallmentPhrase::default().detect(&text));
    }
}

#[test]
fn premium_signal_selects_premium_band() {
    let record = FeeCalculator::new().compute(&listing(Some(money(10_000)), true), FeeRates::default());
    assert_eq!(record.listing_type, ListingType::Premium);
}
