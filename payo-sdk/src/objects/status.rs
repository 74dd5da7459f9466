//! Invoice lifecycle status.
//!
//! Transitions are decided by the backend. The client only observes them,
//! so the helpers here answer "is this observation plausible?" rather than
//! driving any state change.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Detected,
    Confirmed,
    Expired,
    Underpaid,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 5] = [
        InvoiceStatus::Pending,
        InvoiceStatus::Detected,
        InvoiceStatus::Confirmed,
        InvoiceStatus::Expired,
        InvoiceStatus::Underpaid,
    ];

    /// Terminal statuses never change again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            InvoiceStatus::Confirmed | InvoiceStatus::Expired | InvoiceStatus::Underpaid
        )
    }

    /// Whether `next` may directly follow `self` in an invoice timeline.
    pub fn can_transition_to(self, next: InvoiceStatus) -> bool {
        use InvoiceStatus::*;
        matches!(
            (self, next),
            (Pending, Detected)
                | (Detected, Confirmed)
                | (Pending, Expired)
                | (Pending, Underpaid)
                | (Detected, Underpaid)
        )
    }

    /// Whether `next` is reachable from `self` through zero or more direct
    /// transitions.
    ///
    /// A poller can miss intermediate states, so `pending -> confirmed` is
    /// a valid observation even though it is not a direct transition.
    pub fn can_advance_to(self, next: InvoiceStatus) -> bool {
        if self == next || self.can_transition_to(next) {
            return true;
        }
        InvoiceStatus::ALL
            .iter()
            .any(|&mid| self.can_transition_to(mid) && mid.can_transition_to(next))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Detected => "detected",
            InvoiceStatus::Confirmed => "confirmed",
            InvoiceStatus::Expired => "expired",
            InvoiceStatus::Underpaid => "underpaid",
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InvoiceStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_owned()))
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown invoice status: {0}")]
pub struct UnknownStatus(pub String);
