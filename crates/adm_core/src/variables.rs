//! variables.rs: Canonical policy enums and `Params` with safe defaults.
//!
//! `Params` is the admission-cycle parameter set: the category bonus table,
//! preference limits, merit tie handling, and the two reallocation policies
//! (upgrade scan range, seat release on reallocation).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::Category;
use crate::errors::CoreError;
use crate::percent::Percentage;

/// ------------ Macros ------------

/// Define a serde’d enum with explicit wire tokens.
macro_rules! serde_enum {
    ($name:ident => { $($variant:ident = $token:expr),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $token)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $token, )+
                }
            }
        }
    };
}

/// ------------ Canonical enums (wire tokens explicit) ------------

serde_enum!(MeritTiePolicy => {
    InputOrder = "input_order",
    Random     = "random"
});

serde_enum!(UpgradePolicy => {
    ForwardScan    = "forward_scan",
    StrictlyBetter = "strictly_better"
});

/// ------------ Params ------------

pub const DEFAULT_MAX_PREFERENCES: u8 = 5;
pub const MAX_PREFERENCES_CAP: u8 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Params {
    pub admission_year: u16,
    /// Bonus added to the base percentage; categories absent from the map get 0.
    pub category_bonus: BTreeMap<Category, Percentage>,
    pub max_preferences: u8,
    pub merit_tie_policy: MeritTiePolicy,
    /// Only consulted when `merit_tie_policy == random`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tie_seed: Option<u64>,
    pub upgrade_policy: UpgradePolicy,
    /// Release the vacated seat when a round moves an applicant elsewhere.
    pub release_on_reallocation: bool,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            admission_year: 2026,
            category_bonus: default_bonus_table(),
            max_preferences: DEFAULT_MAX_PREFERENCES,
            merit_tie_policy: MeritTiePolicy::InputOrder,
            tie_seed: None,
            upgrade_policy: UpgradePolicy::ForwardScan,
            release_on_reallocation: true,
        }
    }
}

impl Params {
    pub fn bonus_for(&self, category: Category) -> Percentage {
        self.category_bonus.get(&category).copied().unwrap_or(Percentage::ZERO)
    }

    #[inline]
    pub fn max_preferences(&self) -> usize {
        self.max_preferences as usize
    }
}

/// general 0, ews 0, obc +2, sc +5, st +5
pub fn default_bonus_table() -> BTreeMap<Category, Percentage> {
    let pts = |p: u32| Percentage::from_hundredths(p * 100).unwrap_or(Percentage::ZERO);
    BTreeMap::from([
        (Category::General, Percentage::ZERO),
        (Category::Ews, Percentage::ZERO),
        (Category::Obc, pts(2)),
        (Category::Sc, pts(5)),
        (Category::St, pts(5)),
    ])
}

/// Domain checks that serde alone cannot express.
pub fn validate_domains(p: &Params) -> Result<(), CoreError> {
    if !(2000..=2100).contains(&p.admission_year) {
        return Err(CoreError::DomainOutOfRange("admission_year"));
    }
    if !(1..=MAX_PREFERENCES_CAP).contains(&p.max_preferences) {
        return Err(CoreError::DomainOutOfRange("max_preferences"));
    }
    if p.merit_tie_policy == MeritTiePolicy::Random && p.tie_seed.is_none() {
        return Err(CoreError::DomainOutOfRange("tie_seed"));
    }
    Ok(())
}
