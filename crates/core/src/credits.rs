//! Credit accounting for completed generations.

/// Credits consumed by one completed generation.
pub const GENERATION_COST: i32 = 5;

/// Balance left after charging one generation against `balance`.
///
/// An absent balance counts as zero. The result may be negative: balances
/// are not checked before a job runs.
pub fn remaining_after_charge(balance: Option<i32>) -> i32 {
    balance.unwrap_or(0).saturating_sub(GENERATION_COST)
}
