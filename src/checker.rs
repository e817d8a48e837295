//! Deciding whether a derived address is worth recording.
//!
//! Order of checks, cheapest first:
//! 1. Address class: only legacy (`1...`) addresses are considered
//! 2. Membership filter: definite misses stop here
//! 3. Ledger lookup: ground truth for the remaining few

use std::sync::Arc;

use crate::filter::{is_supported_address, MembershipFilter};
use crate::ledger::{AddressActivity, LedgerLookup};

/// How a checked address should be recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Positive balance
    Funded,
    /// No balance, but has transaction history
    Active,
    /// Nothing to record
    Empty,
}

impl Classification {
    /// Classifies an activity result. A positive balance wins over activity.
    pub fn of(activity: &AddressActivity) -> Self {
        if activity.balance_btc > 0.0 {
            Classification::Funded
        } else if activity.active {
            Classification::Active
        } else {
            Classification::Empty
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Funded => write!(f, "funded"),
            Classification::Active => write!(f, "active"),
            Classification::Empty => write!(f, "empty"),
        }
    }
}

/// Outcome of checking one address.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckOutcome {
    /// Whether the filter reported a possible match (and the ledger was queried)
    pub filter_hit: bool,
    pub activity: AddressActivity,
}

impl CheckOutcome {
    #[inline]
    pub fn classification(&self) -> Classification {
        Classification::of(&self.activity)
    }
}

/// Combines the address-class gate, the filter and the ledger.
#[derive(Clone)]
pub struct AddressChecker {
    filter: Arc<dyn MembershipFilter>,
    ledger: Arc<dyn LedgerLookup>,
}

impl AddressChecker {
    pub fn new(filter: Arc<dyn MembershipFilter>, ledger: Arc<dyn LedgerLookup>) -> Self {
        Self { filter, ledger }
    }

    /// Returns balance and activity for `address`, defaulting to empty.
    ///
    /// The ledger is only queried when the filter reports a possible match.
    pub fn check(&self, address: &str) -> CheckOutcome {
        if !is_supported_address(address) || !self.filter.maybe_contains(address) {
            return CheckOutcome {
                filter_hit: false,
                activity: AddressActivity::default(),
            };
        }

        CheckOutcome {
            filter_hit: true,
            activity: self.ledger.lookup(address),
        }
    }
}
