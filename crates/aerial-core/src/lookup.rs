// Code normalization tables: team names, positions and contribution labels.

use crate::model::ContributionKind;
use std::collections::BTreeMap;

/// Built-in team name → three-letter code table.
const DEFAULT_TEAMS: &[(&str, &str)] = &[
    ("ARSENAL", "ARS"),
    ("ASTON VILLA", "AVL"),
    ("BRIGHTON", "BHA"),
    ("BRIGHTON & HOVE ALBION", "BHA"),
    ("CHELSEA", "CHE"),
    ("EVERTON", "EVE"),
    ("LEICESTER CITY", "LEI"),
    ("LIVERPOOL", "LIV"),
    ("LONDON CITY LIONESSES", "LCL"),
    ("MANCHESTER CITY", "MCI"),
    ("MANCHESTER UNITED", "MUN"),
    ("TOTTENHAM HOTSPUR", "TOT"),
    ("WEST HAM UNITED", "WHU"),
];

const DEFAULT_POSITIONS: &[(&str, &str)] = &[
    ("GOALKEEPER", "GK"),
    ("DEFENDER", "DEF"),
    ("MIDFIELDER", "MID"),
    ("FORWARD", "FOR"),
];

/// Immutable lookup tables handed to the aggregator and tooltip synthesizer.
///
/// Keys are stored uppercased and trimmed; lookups normalize the same way.
/// Values that have no entry pass through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTables {
    teams: BTreeMap<String, String>,
    positions: BTreeMap<String, String>,
    labels: BTreeMap<ContributionKind, String>,
}

impl Default for CodeTables {
    fn default() -> Self {
        let mut tables = Self::empty();
        for (name, code) in DEFAULT_TEAMS {
            tables = tables.with_team(name, code);
        }
        for (name, code) in DEFAULT_POSITIONS {
            tables = tables.with_position(name, code);
        }
        tables
    }
}

impl CodeTables {
    /// Tables with no team or position entries and built-in labels only.
    pub fn empty() -> Self {
        Self {
            teams: BTreeMap::new(),
            positions: BTreeMap::new(),
            labels: BTreeMap::new(),
        }
    }

    pub fn with_team(mut self, name: &str, code: &str) -> Self {
        self.teams.insert(normalize_key(name), code.trim().to_string());
        self
    }

    pub fn with_position(mut self, name: &str, code: &str) -> Self {
        self.positions
            .insert(normalize_key(name), code.trim().to_string());
        self
    }

    pub fn with_label(mut self, kind: ContributionKind, label: &str) -> Self {
        self.labels.insert(kind, label.to_string());
        self
    }

    /// Normalized code for a team name. Empty input yields an empty string.
    pub fn team_code(&self, name: &str) -> String {
        lookup(&self.teams, name)
    }

    /// Normalized code for a position name. Empty input yields an empty string.
    pub fn position_code(&self, position: &str) -> String {
        lookup(&self.positions, position)
    }

    /// Tooltip label for a contribution kind.
    pub fn label(&self, kind: ContributionKind) -> &str {
        self.labels
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_label())
    }

    /// Whether two team identifiers name the same club once normalized.
    /// Blank identifiers never match anything.
    pub fn same_team(&self, a: &str, b: &str) -> bool {
        let a = normalize_key(&self.team_code(a));
        let b = normalize_key(&self.team_code(b));
        !a.is_empty() && a == b
    }
}

fn normalize_key(s: &str) -> String {
    s.trim().to_uppercase()
}

fn lookup(table: &BTreeMap<String, String>, raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }
    table
        .get(&normalize_key(raw))
        .cloned()
        .unwrap_or_else(|| raw.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_codes_normalize_case_and_whitespace() {
        let tables = CodeTables::default();
        assert_eq!(tables.team_code("Arsenal"), "ARS");
        assert_eq!(tables.team_code("  manchester united "), "MUN");
        assert_eq!(tables.team_code("Brighton & Hove Albion"), "BHA");
    }

    #[test]
    fn unmapped_values_pass_through_unchanged() {
        let tables = CodeTables::default();
        assert_eq!(tables.team_code("Crystal Palace"), "Crystal Palace");
        assert_eq!(tables.team_code("ARS"), "ARS");
        assert_eq!(tables.position_code("Wing-back"), "Wing-back");
        assert_eq!(tables.team_code(""), "");
        assert_eq!(tables.position_code("   "), "");
    }

    #[test]
    fn position_codes() {
        let tables = CodeTables::default();
        assert_eq!(tables.position_code("Goalkeeper"), "GK");
        assert_eq!(tables.position_code("FORWARD"), "FOR");
    }

    #[test]
    fn overrides_replace_defaults() {
        let tables = CodeTables::default()
            .with_team("Arsenal", "AFC")
            .with_position("forward", "FWD")
            .with_label(ContributionKind::Scored, "Goals");
        assert_eq!(tables.team_code("arsenal"), "AFC");
        assert_eq!(tables.position_code("Forward"), "FWD");
        assert_eq!(tables.label(ContributionKind::Scored), "Goals");
        assert_eq!(tables.label(ContributionKind::Assisted), "Assist");
    }

    #[test]
    fn same_team_compares_codes() {
        let tables = CodeTables::default();
        assert!(tables.same_team("Arsenal", "ARS"));
        assert!(tables.same_team("ars", "ARS"));
        assert!(!tables.same_team("Arsenal", "Chelsea"));
        assert!(!tables.same_team("", ""));
    }
}
