use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::workflows::move_out::calculator::{DepositBasis, DispositionCalculator};
use crate::workflows::move_out::classification::{classify, is_deductible};
use crate::workflows::move_out::domain::{DamageItem, DamageItemId, InspectionId};
use crate::workflows::move_out::money::CURRENCY_SCALE;

fn cents(max: i64) -> impl Strategy<Value = Decimal> {
    (0i64..max).prop_map(|n| Decimal::new(n, 2))
}

/// Store-level items can carry fractions of a cent; validation only guards the service.
fn mills(max: i64) -> impl Strategy<Value = Decimal> {
    (0i64..max).prop_map(|n| Decimal::new(n, 3))
}

fn item_strategy() -> impl Strategy<Value = DamageItem> {
    (mills(5_000_000), any::<bool>(), any::<bool>(), 0u32..10_000).prop_map(
        |(repair_cost, is_normal_wear, is_pre_existing, n)| DamageItem {
            id: DamageItemId(format!("dmg-{n:06}")),
            inspection_id: InspectionId("insp-prop".to_string()),
            description: format!("Finding {n}"),
            location: None,
            repair_cost,
            is_normal_wear,
            is_pre_existing,
            photo_urls: Vec::new(),
            notes: None,
            move_in_item_id: None,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn refund_and_shortfall_never_negative(
        amount in cents(1_000_000),
        interest in cents(50_000),
        items in prop::collection::vec(item_strategy(), 0..12),
    ) {
        let basis = DepositBasis { amount, interest_accrued: interest };
        let calculation = DispositionCalculator.calculate(basis, &items).expect("in range");

        prop_assert!(calculation.refund_amount >= Decimal::ZERO);
        prop_assert!(calculation.shortfall >= Decimal::ZERO);
        prop_assert!(calculation.total_deductions >= Decimal::ZERO);
        prop_assert!(
            calculation.refund_amount.is_zero() || calculation.shortfall.is_zero(),
            "refund and shortfall are exclusive"
        );
        prop_assert_eq!(
            calculation.refund_amount - calculation.shortfall,
            basis.total().expect("in range") - calculation.total_deductions
        );
    }

    #[test]
    fn itemization_matches_deductible_items(
        items in prop::collection::vec(item_strategy(), 0..12),
    ) {
        let basis = DepositBasis {
            amount: Decimal::new(100_000, 2),
            interest_accrued: Decimal::ZERO,
        };
        let calculation = DispositionCalculator.calculate(basis, &items).expect("in range");
        let groups = classify(&items);

        prop_assert_eq!(groups.deductible.len() + groups.non_deductible.len(), items.len());
        prop_assert_eq!(calculation.itemized_deductions.len(), groups.deductible.len());
        prop_assert!(groups.deductible.iter().all(|item| is_deductible(item)));
        prop_assert!(groups.non_deductible.iter().all(|item| !is_deductible(item)));

        prop_assert!(calculation
            .itemized_deductions
            .iter()
            .all(|line| line.amount.scale() <= CURRENCY_SCALE));
        let itemized: Decimal = calculation
            .itemized_deductions
            .iter()
            .map(|line| line.amount)
            .sum();
        prop_assert_eq!(itemized, calculation.total_deductions);
    }
}
