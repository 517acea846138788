use serde::Serialize;

use super::domain::DamageItem;

/// Normal wear and pre-existing damage are never charged to the tenant; either flag excludes.
pub fn is_deductible(item: &DamageItem) -> bool {
    !item.is_normal_wear && !item.is_pre_existing
}

/// Why an item was left out of the deductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    NormalWear,
    PreExisting,
    NormalWearAndPreExisting,
}

impl ExclusionReason {
    pub fn for_item(item: &DamageItem) -> Option<Self> {
        match (item.is_normal_wear, item.is_pre_existing) {
            (false, false) => None,
            (true, false) => Some(Self::NormalWear),
            (false, true) => Some(Self::PreExisting),
            (true, true) => Some(Self::NormalWearAndPreExisting),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NormalWear => "normal wear and tear",
            Self::PreExisting => "pre-existing condition",
            Self::NormalWearAndPreExisting => "normal wear and tear; pre-existing condition",
        }
    }
}

/// Damage items split by whether they reduce the refund. Input order is kept in both groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DamageClassification<'a> {
    pub deductible: Vec<&'a DamageItem>,
    pub non_deductible: Vec<&'a DamageItem>,
}

pub fn classify(items: &[DamageItem]) -> DamageClassification<'_> {
    let (deductible, non_deductible) = items.iter().partition(|item| is_deductible(item));
    DamageClassification {
        deductible,
        non_deductible,
    }
}
