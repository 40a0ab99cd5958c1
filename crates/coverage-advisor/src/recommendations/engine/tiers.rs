//! Bracket lookups behind every threshold-based limit.
//!
//! A table is a list of `(lower bound, value)` pairs. Resolving `x` picks the tier with
//! the greatest bound `b` such that `b <= x`; probes below every bound (negative or NaN
//! included) fall back to the lowest tier. Lower bounds are inclusive everywhere.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tier<T> {
    pub lower_bound: f64,
    pub value: T,
}

impl<T> Tier<T> {
    pub const fn new(lower_bound: f64, value: T) -> Self {
        Self { lower_bound, value }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TierResolver<'a, T> {
    tiers: &'a [Tier<T>],
}

impl<'a, T> TierResolver<'a, T> {
    /// Built-in tables only; an empty table fails const evaluation.
    pub(crate) const fn new(tiers: &'a [Tier<T>]) -> Self {
        assert!(!tiers.is_empty(), "tier table must hold at least one tier");
        Self { tiers }
    }

    /// `None` for an empty table.
    pub const fn try_new(tiers: &'a [Tier<T>]) -> Option<Self> {
        if tiers.is_empty() {
            None
        } else {
            Some(Self { tiers })
        }
    }

    pub fn tiers(&self) -> &'a [Tier<T>] {
        self.tiers
    }

    pub fn resolve(&self, probe: f64) -> &'a T {
        let lowest = self
            .tiers
            .iter()
            .min_by(|a, b| a.lower_bound.total_cmp(&b.lower_bound));

        let selected = self
            .tiers
            .iter()
            .filter(|tier| tier.lower_bound <= probe)
            .max_by(|a, b| match a.lower_bound.total_cmp(&b.lower_bound) {
                // keep the first declared tier on equal bounds
                Ordering::Equal => Ordering::Greater,
                other => other,
            });

        match selected.or(lowest) {
            Some(tier) => &tier.value,
            None => unreachable!("tier tables are non-empty by construction"),
        }
    }
}

/// General-liability aggregate limit and per-victim sublimit, in euros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiabilityLimits {
    pub general: u64,
    pub per_victim: u64,
}

impl LiabilityLimits {
    pub const fn new(general: u64, per_victim: u64) -> Self {
        Self {
            general,
            per_victim,
        }
    }
}

const ELECTRICAL_TIERS: [Tier<u64>; 3] = [
    Tier::new(0.0, 30_000),
    Tier::new(500_000.0, 60_000),
    Tier::new(1_000_000.0, 100_000),
];

const THEFT_TIERS: [Tier<u8>; 2] = [Tier::new(0.0, 25), Tier::new(1_000_000.0, 50)];

const LIABILITY_TIERS: [Tier<LiabilityLimits>; 4] = [
    Tier::new(0.0, LiabilityLimits::new(600_000, 450_000)),
    Tier::new(1_000_000.0, LiabilityLimits::new(1_000_000, 600_000)),
    Tier::new(3_000_000.0, LiabilityLimits::new(2_000_000, 600_000)),
    Tier::new(10_000_000.0, LiabilityLimits::new(3_000_000, 900_000)),
];

/// Building value -> electrical-damage limit (euros).
pub const ELECTRICAL_DAMAGE_LIMIT: TierResolver<'static, u64> =
    TierResolver::new(&ELECTRICAL_TIERS);

/// Building + contents + stock -> theft coverage percentage.
pub const THEFT_PERCENTAGE: TierResolver<'static, u8> = TierResolver::new(&THEFT_TIERS);

/// Annual billing -> liability limits.
pub const LIABILITY_LIMITS: TierResolver<'static, LiabilityLimits> =
    TierResolver::new(&LIABILITY_TIERS);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn electrical_tier_includes_lower_bounds() {
        assert_eq!(*ELECTRICAL_DAMAGE_LIMIT.resolve(0.0), 30_000);
        assert_eq!(*ELECTRICAL_DAMAGE_LIMIT.resolve(499_999.99), 30_000);
        assert_eq!(*ELECTRICAL_DAMAGE_LIMIT.resolve(500_000.0), 60_000);
        assert_eq!(*ELECTRICAL_DAMAGE_LIMIT.resolve(999_999.0), 60_000);
        assert_eq!(*ELECTRICAL_DAMAGE_LIMIT.resolve(1_000_000.0), 100_000);
        assert_eq!(*ELECTRICAL_DAMAGE_LIMIT.resolve(25_000_000.0), 100_000);
    }

    #[test]
    fn theft_tier_switches_at_one_million() {
        assert_eq!(*THEFT_PERCENTAGE.resolve(999_999.0), 25);
        assert_eq!(*THEFT_PERCENTAGE.resolve(1_000_000.0), 50);
    }

    #[test]
    fn liability_tier_boundaries() {
        let base = LIABILITY_LIMITS.resolve(999_999.0);
        assert_eq!((base.general, base.per_victim), (600_000, 450_000));

        let at_million = LIABILITY_LIMITS.resolve(1_000_000.0);
        assert_eq!((at_million.general, at_million.per_victim), (1_000_000, 600_000));

        let at_three = LIABILITY_LIMITS.resolve(3_000_000.0);
        assert_eq!((at_three.general, at_three.per_victim), (2_000_000, 600_000));

        let at_ten = LIABILITY_LIMITS.resolve(10_000_000.0);
        assert_eq!((at_ten.general, at_ten.per_victim), (3_000_000, 900_000));
    }

    #[test]
    fn probes_below_the_table_fall_back_to_the_first_tier() {
        assert_eq!(*ELECTRICAL_DAMAGE_LIMIT.resolve(-1.0), 30_000);
        assert_eq!(*ELECTRICAL_DAMAGE_LIMIT.resolve(f64::NAN), 30_000);
        assert_eq!(*ELECTRICAL_DAMAGE_LIMIT.resolve(f64::NEG_INFINITY), 30_000);
        assert_eq!(*ELECTRICAL_DAMAGE_LIMIT.resolve(f64::INFINITY), 100_000);
    }

    #[test]
    fn resolution_does_not_depend_on_declaration_order() {
        let shuffled = [
            Tier::new(1_000_000.0, "high"),
            Tier::new(0.0, "base"),
            Tier::new(500_000.0, "mid"),
        ];
        let resolver = TierResolver::new(&shuffled);
        assert_eq!(*resolver.resolve(10.0), "base");
        assert_eq!(*resolver.resolve(500_000.0), "mid");
        assert_eq!(*resolver.resolve(2_000_000.0), "high");
    }

    #[test]
    fn empty_tables_are_refused() {
        let empty: [Tier<u8>; 0] = [];
        assert!(TierResolver::try_new(&empty).is_none());
        assert!(TierResolver::try_new(&[Tier::new(0.0, 1u8)]).is_some());
    }

    #[test]
    fn tables_start_at_zero() {
        assert_eq!(ELECTRICAL_DAMAGE_LIMIT.tiers()[0].lower_bound, 0.0);
        assert_eq!(THEFT_PERCENTAGE.tiers()[0].lower_bound, 0.0);
        assert_eq!(LIABILITY_LIMITS.tiers()[0].lower_bound, 0.0);
    }
}
