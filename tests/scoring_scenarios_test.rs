use h2h_ledger::domain::{
    Chip, FixtureId, FixtureStatus, H2hMatch, LeagueId, ManagerId, ManagerPicks,
    PerformanceRecord, PlayerId, PlayerInfo, Position, RoundData, RoundId, RoundStatus,
    SquadPick, TeamId,
};
use h2h_ledger::engine::{
    check_breakdown, BonusEngine, BpsEntry, Formation, LuckDecomposer, SubstitutionEngine,
    TeamScoreCalculator,
};
use std::collections::HashMap;

const ROUND: RoundId = RoundId(21);
const TEAM: TeamId = TeamId(4);
const FIXTURE: FixtureId = FixtureId(210);

fn positions() -> [Position; 15] {
    use Position::*;
    [Gkp, Def, Def, Def, Def, Mid, Mid, Mid, Mid, Fwd, Fwd, Gkp, Def, Mid, Fwd]
}

/// Captain in slot 10, vice-captain in slot 11.
fn picks(chip: Chip) -> ManagerPicks {
    let picks = (1..=15u8)
        .map(|slot| {
            let pick = SquadPick::new(PlayerId::new(u32::from(slot)), slot);
            match slot {
                10 => pick.captain(),
                11 => pick.vice_captain(),
                _ => pick,
            }
        })
        .collect();
    ManagerPicks::new(ManagerId::new(500), ROUND, picks, chip, 0).unwrap()
}

/// A finished round. Every player plays 90 minutes for 2 points unless
/// overridden by `(player, minutes, points)`.
fn round(overrides: &[(u32, u16, i32)]) -> RoundData {
    let players = positions()
        .into_iter()
        .enumerate()
        .map(|(i, p)| PlayerInfo::new(PlayerId::new(i as u32 + 1), TEAM, p));
    let records = (1..=15u32).map(|p| {
        let (minutes, points) = overrides
            .iter()
            .find(|(player, _, _)| *player == p)
            .map(|&(_, m, pts)| (m, pts))
            .unwrap_or((90, 2));
        PerformanceRecord::new(PlayerId::new(p), ROUND, FIXTURE, TEAM, minutes, points)
    });
    let fixture = FixtureStatus::new(FIXTURE, ROUND, TEAM, TeamId::new(5)).finished();
    RoundData::new(ROUND, players.collect::<Vec<_>>(), records, vec![fixture])
}

fn calculate(picks: &ManagerPicks, data: &RoundData) -> h2h_ledger::TeamGameweekScore {
    let formation = Formation::default();
    let score =
        TeamScoreCalculator::new(&formation).calculate(picks, data, RoundStatus::Completed);
    check_breakdown(&score).unwrap();
    score
}

#[test]
fn test_triple_captain_passes_to_vice() {
    let data = round(&[(10, 0, 0), (11, 90, 10)]);
    let score = calculate(&picks(Chip::TripleCaptain), &data);

    assert_eq!(score.captain_played_by, Some(PlayerId::new(11)));
    assert_eq!(score.captain_bonus, 20);
}

#[test]
fn test_armband_lost_when_captain_and_vice_miss_out() {
    let data = round(&[(10, 0, 0), (11, 0, 0)]);
    let score = calculate(&picks(Chip::None), &data);

    assert_eq!(score.captain_played_by, None);
    assert_eq!(score.captain_bonus, 0);
}

#[test]
fn test_bench_boost_counts_whole_bench_without_subs() {
    // A starter missed out, but bench boost disables substitutions.
    let data = round(&[(3, 0, 0), (12, 90, 2), (13, 90, 4), (14, 0, 0), (15, 90, 6)]);
    let score = calculate(&picks(Chip::BenchBoost), &data);

    assert_eq!(score.bench_boost_total, 12);
    assert_eq!(score.auto_sub_total, 0);
    assert!(score.auto_subs.is_empty());
}

#[test]
fn test_goalkeeper_only_bench_leaves_outfield_starter_in() {
    // Defender in slot 2 did not play; only the bench goalkeeper did.
    let data = round(&[(2, 0, 0), (13, 0, 0), (14, 0, 0), (15, 0, 0)]);
    let score = calculate(&picks(Chip::None), &data);

    assert!(score.auto_subs.is_empty());
    assert_eq!(score.auto_sub_total, 0);
    assert_eq!(score.starting_xi_total, 20);
    assert_eq!(score.net_total, 22);
}

#[test]
fn test_auto_sub_follows_bench_order() {
    // Midfielder in slot 6 did not play; bench slot 13 (defender) comes in first.
    let data = round(&[(6, 0, 0), (13, 90, 5), (14, 90, 7)]);
    let score = calculate(&picks(Chip::None), &data);

    assert_eq!(score.auto_subs.len(), 1);
    assert_eq!(score.auto_subs[0].player_out, PlayerId::new(6));
    assert_eq!(score.auto_subs[0].player_in, PlayerId::new(13));
    assert_eq!(score.auto_sub_total, 5);
    assert_eq!(score.starting_xi_total, 20);
}

#[test]
fn test_effective_xi_is_always_formation_valid() {
    let formation = Formation::default();
    let cases: [&[(u32, u16, i32)]; 4] = [
        &[],
        &[(1, 0, 0)],
        &[(2, 0, 0), (3, 0, 0), (4, 0, 0)],
        &[(10, 0, 0), (11, 0, 0), (6, 0, 0), (12, 0, 0)],
    ];
    for overrides in cases {
        let data = round(overrides);
        let outcome = SubstitutionEngine::new(&formation).apply(&picks(Chip::None), &data);
        let counts = Formation::count(
            outcome
                .effective_xi
                .iter()
                .filter_map(|p| data.player(p.player).map(|info| &info.position)),
        );
        assert!(formation.is_valid(&counts), "invalid XI for {:?}", overrides);
        assert_eq!(outcome.effective_xi.len(), 11);
    }
}

#[test]
fn test_three_way_bonus_tie() {
    let entry = |player: u32, bps: i32| BpsEntry {
        player: PlayerId::new(player),
        bps,
        minutes: 90,
    };
    let awards = BonusEngine::award(&[entry(1, 33), entry(2, 33), entry(3, 33), entry(4, 30)]);

    assert_eq!(awards[&PlayerId::new(1)], 3);
    assert_eq!(awards[&PlayerId::new(2)], 3);
    assert_eq!(awards[&PlayerId::new(3)], 3);
    assert_eq!(awards[&PlayerId::new(4)], 0);
}

#[test]
fn test_two_way_tie_skips_second_place() {
    let entry = |player: u32, bps: i32| BpsEntry {
        player: PlayerId::new(player),
        bps,
        minutes: 90,
    };
    let awards = BonusEngine::award(&[entry(1, 40), entry(2, 40), entry(3, 35), entry(4, 20)]);

    assert_eq!(awards[&PlayerId::new(1)], 3);
    assert_eq!(awards[&PlayerId::new(2)], 3);
    assert_eq!(awards[&PlayerId::new(3)], 1);
    assert_eq!(awards[&PlayerId::new(4)], 0);
    let total: u32 = awards.values().map(|&b| u32::from(b)).sum();
    assert!(total <= 9);
}

#[test]
fn test_calculation_is_idempotent() {
    let data = round(&[(4, 0, 0), (10, 90, 13), (13, 90, 1)]);
    let picks = picks(Chip::TripleCaptain);
    assert_eq!(calculate(&picks, &data), calculate(&picks, &data));
}

fn season() -> Vec<H2hMatch> {
    let league = LeagueId::new(1);
    let m = |round: u32, a: (u32, i32), b: (u32, i32)| {
        H2hMatch::new(
            league,
            RoundId::new(round),
            (ManagerId::new(a.0), a.1),
            (ManagerId::new(b.0), b.1),
        )
    };
    vec![
        m(1, (1, 71), (2, 44)),
        m(1, (3, 52), (4, 60)),
        m(1, (5, 39), (6, 39)),
        m(2, (1, 48), (3, 63)),
        m(2, (2, 57), (5, 41)),
        m(2, (4, 66), (6, 70)),
        m(3, (1, 55), (4, 49)),
        m(3, (2, 35), (6, 58)),
        m(3, (3, 61), (5, 62)),
    ]
}

#[test]
fn test_luck_zero_sum_components() {
    let matches = season();
    let mut chips = HashMap::new();
    chips.insert((ManagerId::new(6), RoundId::new(2)), Chip::BenchBoost);
    chips.insert((ManagerId::new(3), RoundId::new(2)), Chip::TripleCaptain);
    chips.insert((ManagerId::new(5), RoundId::new(3)), Chip::Wildcard);
    let decomposer = LuckDecomposer::new(&matches, &chips);

    for round in decomposer.rounds() {
        let luck = decomposer.round_luck(round).unwrap();
        assert_eq!(luck.len(), 6);
        let sum: f64 = luck.iter().map(|l| l.variance_luck).sum();
        assert!(sum.abs() <= 0.01, "round {} variance sums to {}", round, sum);
    }

    let season = decomposer.season_luck().unwrap();
    assert_eq!(season.len(), 6);
    for (name, sum) in [
        ("variance", season.iter().map(|s| s.variance_luck).sum::<f64>()),
        ("schedule", season.iter().map(|s| s.schedule_luck).sum::<f64>()),
        ("chip", season.iter().map(|s| s.chip_luck).sum::<f64>()),
    ] {
        assert!(sum.abs() <= 0.01, "{} sums to {}", name, sum);
    }
}

#[test]
fn test_luck_is_idempotent() {
    let matches = season();
    let chips = HashMap::new();
    let first = LuckDecomposer::new(&matches, &chips).season_luck().unwrap();
    let second = LuckDecomposer::new(&matches, &chips).season_luck().unwrap();
    assert_eq!(first, second);
}
