// Integration tests for the aggregation pipeline.
//
// These drive the public API end to end: a small season population goes in,
// flattened rows come out, and the cross-cutting properties (shared column
// set, DNP handling, window arithmetic, tooltip stability, fixture
// attachment) are checked on the result.

use std::collections::BTreeMap;

use aerial_core::*;

// ===========================================================================
// Test helpers
// ===========================================================================

fn contributions(entries: &[(ContributionKind, u32, i32)]) -> BTreeMap<ContributionKind, Contribution> {
    entries
        .iter()
        .map(|(kind, q, p)| (*kind, Contribution::new(*q, *p)))
        .collect()
}

fn appearance(gw: u32, points: i32, home: &str, away: &str, score: (u32, u32)) -> RawMatchRecord {
    RawMatchRecord {
        gameweek: RawGameweek::Number(i64::from(gw)),
        total_points: points,
        home_team: home.into(),
        away_team: away.into(),
        score: Score::new(score.0, score.1),
        date: format!("2025-09-{:02}", gw + 5),
        contributions: contributions(&[(ContributionKind::PlayedSixtyMinutes, 1, 2)]),
    }
}

fn named(name: &str, club: &str, matches: Vec<RawMatchRecord>) -> PlayerRecord {
    PlayerRecord {
        name: Some(name.into()),
        club: club.into(),
        position: "Midfielder".into(),
        nationality: "England".into(),
        value: Some(RawNumber::from("5.5m")),
        selected_percentage: Some(RawNumber::from("4.2%")),
        matches,
    }
}

/// Three named players over a five-gameweek season, plus one unnamed record.
fn season() -> Vec<PlayerRecord> {
    vec![
        named(
            "Keira Walsh",
            "Chelsea",
            vec![
                appearance(1, 3, "Chelsea", "Arsenal", (1, 1)),
                appearance(3, 6, "Everton", "Chelsea", (0, 2)),
            ],
        ),
        named(
            "Grace Clinton",
            "Manchester United",
            (1..=5)
                .map(|gw| appearance(gw, gw as i32, "Manchester United", "Liverpool", (2, 0)))
                .collect(),
        ),
        named("Bench Warmer", "Arsenal", vec![]),
        PlayerRecord {
            name: None,
            matches: vec![appearance(2, 1, "Arsenal", "Chelsea", (0, 0))],
            ..Default::default()
        },
    ]
}

fn run(players: &[PlayerRecord], fixtures: &FixtureMap) -> AggregationRun {
    aggregate_population(
        players,
        fixtures,
        &CodeTables::default(),
        &AggregateOptions::default(),
    )
}

// ===========================================================================
// Population-level behaviour
// ===========================================================================

#[test]
fn every_record_shares_the_same_columns() {
    let run = run(&season(), &FixtureMap::new());
    assert_eq!(run.index.max(), Some(5));
    for record in &run.records {
        let columns: Vec<u32> = record.gameweeks.iter().map(|(gw, _)| *gw).collect();
        assert_eq!(columns, vec![1, 2, 3, 4, 5], "columns for {}", record.name);
    }
}

#[test]
fn unnamed_records_are_counted_not_emitted() {
    let run = run(&season(), &FixtureMap::new());
    assert_eq!(run.summary.players_in, 4);
    assert_eq!(run.summary.emitted, 3);
    assert_eq!(run.summary.skipped_unnamed, 1);
    assert_eq!(run.summary.gameweek_columns, 5);
}

#[test]
fn output_preserves_input_order() {
    let mut players = season();
    for i in 0..200 {
        players.push(named(
            &format!("Squad Player {i:03}"),
            "Arsenal",
            vec![appearance(1 + (i % 5), 1, "Arsenal", "Chelsea", (1, 0))],
        ));
    }
    let run = run(&players, &FixtureMap::new());
    let names: Vec<&str> = run.records.iter().map(|r| r.name.as_str()).collect();
    let expected: Vec<&str> = players
        .iter()
        .filter_map(|p| p.name.as_deref())
        .collect();
    assert_eq!(names, expected);
}

#[test]
fn player_without_matches_is_all_placeholders() {
    let run = run(&season(), &FixtureMap::new());
    let bench = run
        .records
        .iter()
        .find(|r| r.name == "Bench Warmer")
        .unwrap();
    assert!(bench.gameweeks.iter().all(|(_, c)| *c == GameweekCell::NotPlayed));
    assert_eq!(bench.total_points, 0);
    assert_eq!(bench.games_played, 0);
    assert_eq!(bench.recent_points, 0);
    assert_eq!(bench.points_per_game, 0.0);

    let json = serde_json::to_value(bench).unwrap();
    for gw in 1..=5 {
        assert_eq!(json[gw.to_string()], DNP_PLACEHOLDER);
    }
}

#[test]
fn gap_scenario_from_three_and_one() {
    let run = run(&season(), &FixtureMap::new());
    let walsh = &run.records[0];
    assert_eq!(walsh.name, "Keira Walsh");
    assert_eq!(walsh.cell(2), Some(&GameweekCell::NotPlayed));
    assert_eq!(walsh.cell(4), Some(&GameweekCell::NotPlayed));
    assert_eq!(walsh.games_played, 2);
    assert_eq!(walsh.recent_games_played, 2);
    assert_eq!(walsh.recent_points, 9);
    assert_eq!(walsh.recent_points_per_game, 2.3);
}

#[test]
fn recent_ppg_uses_fixed_divisor() {
    let run = run(&season(), &FixtureMap::new());
    for record in &run.records {
        let expected = (f64::from(record.recent_points) / 4.0 * 10.0).round() / 10.0;
        assert_eq!(record.recent_points_per_game, expected, "{}", record.name);
    }
    let clinton = &run.records[1];
    // Most recent four of gw 1..=5 are 5, 4, 3, 2.
    assert_eq!(clinton.recent_points, 14);
    assert_eq!(clinton.recent_points_per_game, 3.5);
}

#[test]
fn column_points_match_lifetime_totals() {
    let run = run(&season(), &FixtureMap::new());
    for record in &run.records {
        assert_eq!(
            record.column_points(),
            i64::from(record.total_points),
            "{}",
            record.name
        );
    }
}

#[test]
fn aggregation_is_repeatable() {
    let players = season();
    let first = run(&players, &FixtureMap::new());
    let second = run(&players, &FixtureMap::new());
    assert_eq!(first.index, second.index);
    assert_eq!(first.records, second.records);
    assert_eq!(
        serde_json::to_string(&first.records).unwrap(),
        serde_json::to_string(&second.records).unwrap()
    );
}

// ===========================================================================
// Match-level scenarios
// ===========================================================================

#[test]
fn penalised_non_appearance_shows_placeholder() {
    let mut m = appearance(2, -1, "Arsenal", "Chelsea", (0, 1));
    m.contributions = contributions(&[(ContributionKind::ReceivedYellowCard, 1, -1)]);
    let players = vec![named("Carded Sub", "Arsenal", vec![appearance(1, 2, "Arsenal", "Chelsea", (1, 0)), m])];

    let run = run(&players, &FixtureMap::new());
    let record = &run.records[0];
    assert_eq!(record.cell(2), Some(&GameweekCell::NotPlayed));
    assert_eq!(record.games_played, 1);
    assert_eq!(record.total_points, 2);
}

#[test]
fn tooltip_orders_goal_before_bonus() {
    let mut m = appearance(1, 11, "Chelsea", "Arsenal", (3, 0));
    m.contributions = contributions(&[
        (ContributionKind::Bonus, 1, 3),
        (ContributionKind::Scored, 2, 6),
        (ContributionKind::PlayedSixtyMinutes, 1, 2),
    ]);
    let players = vec![named("Sam Kerr", "Chelsea", vec![m])];
    let run = run(&players, &FixtureMap::new());

    let Some(GameweekCell::Played(cell)) = run.records[0].cell(1) else {
        panic!("gameweek 1 should be played");
    };
    let lines: Vec<&str> = cell.tooltip.lines().collect();
    let goal = lines.iter().position(|l| *l == "Goal x2 (+6pts)").unwrap();
    let bonus = lines.iter().position(|l| *l == "Bonus (+3pts)").unwrap();
    assert!(goal < bonus);
    assert_eq!(lines[1], "ARS (H)");
    assert_eq!(lines[2], "W 3 - 0");
}

// ===========================================================================
// Fixtures
// ===========================================================================

#[test]
fn fixtures_attach_by_normalized_club() {
    let fixture = UpcomingFixture {
        date: "14 Dec".into(),
        time: "12:30".into(),
        gameweek: "11".into(),
        home_id: "CHE".into(),
        home_name: "Chelsea".into(),
        home_short_name: "Chelsea".into(),
        away_id: "MUN".into(),
        away_name: "Manchester United".into(),
        away_short_name: "Man Utd".into(),
    };
    let mut fixtures = FixtureMap::new();
    fixtures.insert("CHE".into(), vec![fixture.clone()]);
    fixtures.insert("MUN".into(), vec![fixture.clone()]);

    let run = run(&season(), &fixtures);
    let by_name = |name: &str| run.records.iter().find(|r| r.name == name).unwrap();
    assert_eq!(by_name("Keira Walsh").upcoming_fixtures, vec![fixture.clone()]);
    assert_eq!(by_name("Grace Clinton").upcoming_fixtures, vec![fixture]);
    assert!(by_name("Bench Warmer").upcoming_fixtures.is_empty());

    let json = serde_json::to_value(by_name("Keira Walsh")).unwrap();
    assert_eq!(json["upcoming_fixtures"][0]["away_short_name"], "Man Utd");
}
