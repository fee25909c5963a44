// Played / did-not-play classification for a single match record.

use crate::model::{ContributionKind, RawMatchRecord};

/// Whether the player actually took part in the match.
///
/// Any one of these is enough:
/// - a `PlayedOneMinute` quantity above zero,
/// - a `PlayedSixtyMinutes` quantity above zero,
/// - a strictly positive point total (covers records missing minutes data).
///
/// A negative total without a minutes marker counts as not played.
pub fn played(m: &RawMatchRecord) -> bool {
    m.quantity(ContributionKind::PlayedOneMinute) > 0
        || m.quantity(ContributionKind::PlayedSixtyMinutes) > 0
        || m.total_points > 0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
