use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Market-cap bucket, ordered from smallest to largest.
///
/// Bins are right-inclusive and the lowest bin is open downwards:
/// `(-inf, 100M]`, `(100M, 1B]`, `(1B, 100B]`, `(100B, inf)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MarketCapTier {
    MicroNano,
    Small,
    Mid,
    Large,
}

impl MarketCapTier {
    pub const ALL: [MarketCapTier; 4] = [Self::MicroNano, Self::Small, Self::Mid, Self::Large];

    pub fn classify(market_cap: Decimal) -> Self {
        if market_cap <= dec!(100000000) {
            Self::MicroNano
        } else if market_cap <= dec!(1000000000) {
            Self::Small
        } else if market_cap <= dec!(100000000000) {
            Self::Mid
        } else {
            Self::Large
        }
    }

    /// Label stored in `crypto_prices.market_cap_tier`.
    pub fn label(self) -> &'static str {
        match self {
            Self::MicroNano => "Micro/Nano",
            Self::Small => "Small",
            Self::Mid => "Mid",
            Self::Large => "Large",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.label() == label)
    }
}

impl fmt::Display for MarketCapTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_are_right_inclusive() {
        let cases = [
            (dec!(100000000), MarketCapTier::MicroNano),
            (dec!(100000000.01), MarketCapTier::Small),
            (dec!(1000000000), MarketCapTier::Small),
            (dec!(1000000000.01), MarketCapTier::Mid),
            (dec!(100000000000), MarketCapTier::Mid),
            (dec!(100000000000.01), MarketCapTier::Large),
        ];

        for (market_cap, expected) in cases {
            assert_eq!(
                MarketCapTier::classify(market_cap),
                expected,
                "market cap {}",
                market_cap
            );
        }
    }

    #[test]
    fn test_lowest_bin_includes_zero_and_below() {
        assert_eq!(MarketCapTier::classify(Decimal::ZERO), MarketCapTier::MicroNano);
        assert_eq!(MarketCapTier::classify(dec!(-5)), MarketCapTier::MicroNano);
    }

    #[test]
    fn test_labels_round_trip() {
        for tier in MarketCapTier::ALL {
            assert_eq!(MarketCapTier::from_label(tier.label()), Some(tier));
        }
        assert_eq!(MarketCapTier::MicroNano.to_string(), "Micro/Nano");
        assert_eq!(MarketCapTier::from_label("Huge"), None);
    }

    #[test]
    fn test_tiers_are_ordered_by_size() {
        assert!(MarketCapTier::MicroNano < MarketCapTier::Small);
        assert!(MarketCapTier::Mid < MarketCapTier::Large);
    }
}
