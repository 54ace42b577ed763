//! Friendliness rules between fleets and colonies.

use crate::types::{AllianceId, EmpireId, Fleet};

/// Whether two parties count as friendly. Native (unowned) parties are
/// friendly with each other but never with an owned party. Owned parties are
/// friendly when they share an empire or a declared alliance.
pub fn is_friendly(
    empire_a: Option<&EmpireId>,
    alliance_a: Option<AllianceId>,
    empire_b: Option<&EmpireId>,
    alliance_b: Option<AllianceId>,
) -> bool {
    match (empire_a, empire_b) {
        (None, None) => true,
        (None, Some(_)) | (Some(_), None) => false,
        (Some(a), Some(b)) => {
            if a == b {
                return true;
            }
            match (alliance_a, alliance_b) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
    }
}

pub fn fleets_friendly(a: &Fleet, b: &Fleet) -> bool {
    is_friendly(a.empire.as_ref(), a.alliance, b.empire.as_ref(), b.alliance)
}
