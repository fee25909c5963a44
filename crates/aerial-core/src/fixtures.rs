// Upcoming fixtures, keyed by club and attached to output records unchanged.

use crate::aggregate::AggregatedPlayerRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A scheduled match that has not started yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingFixture {
    /// Display date, e.g. `"14 Dec"`.
    pub date: String,
    /// Kick-off time, `HH:MM`.
    pub time: String,
    pub gameweek: String,
    pub home_id: String,
    pub home_name: String,
    pub home_short_name: String,
    pub away_id: String,
    pub away_name: String,
    pub away_short_name: String,
}

/// Club id (uppercased) → that club's upcoming fixtures.
pub type FixtureMap = BTreeMap<String, Vec<UpcomingFixture>>;

/// Fixtures for a club, or an empty slice when the club has none listed.
pub fn fixtures_for<'a>(fixtures: &'a FixtureMap, club: &str) -> &'a [UpcomingFixture] {
    fixtures
        .get(&club.trim().to_uppercase())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Attach each record's club fixtures in place.
pub fn attach(records: &mut [AggregatedPlayerRecord], fixtures: &FixtureMap) {
    for record in records {
        record.upcoming_fixtures = fixtures_for(fixtures, &record.club).to_vec();
    }
}
