//! PaymentGate: the independent precondition in front of the consent and
//! ticket flows.
//!
//! Payment verification itself happens out of band (an administrator flips
//! `is_verified` through the profile patch side channel); the gate is a
//! pure predicate over the fan snapshot, consulted by every entry point
//! that leads to consent or tickets so it cannot be bypassed.

use crate::models::Fan;

pub fn is_consent_reachable(fan: &Fan) -> bool {
    fan.is_verified
}
