use super::DealerSelector;
use crate::config::ScoringWeights;
use crate::domain::{
    Certification, CrapsRole, Dealer, DealerStatus, GameType, HistoricalAssignment,
    ProficiencyLevel, Table, TableStatus,
};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

// ==========================================
// 测试辅助函数
// ==========================================

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap().and_hms_opt(14, 0, 0).unwrap()
}

fn cert(dealer_id: &str, game_type: GameType, level: ProficiencyLevel) -> Certification {
    Certification {
        certification_id: format!("c-{}-{}", dealer_id, game_type),
        dealer_id: dealer_id.to_string(),
        game_type,
        proficiency_level: level,
        craps_role: CrapsRole::None,
        certified_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        expiration_date: None,
        is_active: true,
    }
}

fn dealer(id: &str, certs: Vec<Certification>) -> Dealer {
    Dealer {
        dealer_id: id.to_string(),
        employee_number: format!("E-{}", id),
        display_name: id.to_uppercase(),
        status: DealerStatus::Available,
        seniority_level: 0,
        shift_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        shift_end: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        last_break_time: None,
        last_meal_time: None,
        preferred_pit: None,
        certifications: certs,
        assignment_history: Vec::new(),
        revision: 0,
    }
}

fn blackjack_table(pit: &str) -> Table {
    Table {
        table_id: "t1".to_string(),
        table_number: "BJ101".to_string(),
        game_type: GameType::Blackjack,
        status: TableStatus::Open,
        pit: pit.to_string(),
        min_bet: 10.0,
        max_bet: 500.0,
        is_high_limit: false,
        required_dealer_count: 1,
        push_interval_minutes: 20,
        current_assignments: Vec::new(),
        next_assignments: Vec::new(),
        is_locked: false,
        revision: 0,
    }
}

fn history(game_type: GameType, pit: &str, start: NaiveDateTime, minutes: i64) -> HistoricalAssignment {
    HistoricalAssignment {
        assignment_id: format!("h-{}-{}", pit, start),
        table_id: "tx".to_string(),
        game_type,
        pit: pit.to_string(),
        start_time: start,
        end_time: Some(start + Duration::minutes(minutes)),
    }
}

// ==========================================
// 评分
// ==========================================

#[test]
fn test_intermediate_newcomer_scores_exactly_ninety() {
    let selector = DealerSelector::default();
    let table = blackjack_table("PIT-A");
    let d = dealer("d1", vec![cert("d1", GameType::Blackjack, ProficiencyLevel::Intermediate)]);

    let best = selector.select_best_dealer(&table, &[d], now()).unwrap();
    assert_eq!(best.score(), 90.0);
    assert_eq!(best.breakdown.skill, 60.0);
    assert_eq!(best.breakdown.fairness, 30.0);
    assert_eq!(best.breakdown.pit_preference, 0.0);
}

#[test]
fn test_fresh_dealer_beats_heavily_worked_peer() {
    let selector = DealerSelector::default();
    let table = blackjack_table("PIT-A");

    let fresh = dealer("fresh", vec![cert("fresh", GameType::Blackjack, ProficiencyLevel::Advanced)]);
    let mut worked = dealer("worked", vec![cert("worked", GameType::Blackjack, ProficiencyLevel::Advanced)]);
    let start = now() - Duration::hours(5);
    worked.assignment_history = vec![
        history(GameType::Roulette, "PIT-C", start, 60),
        history(GameType::Baccarat, "PIT-C", start + Duration::hours(1), 60),
        history(GameType::Blackjack, "PIT-B", start + Duration::hours(2), 60),
    ];

    let ranked = selector.rank_candidates(&table, &[worked, fresh], now());
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].dealer_id, "fresh");
    assert_eq!(ranked[1].pool_index, 0);
}

#[test]
fn test_uncertified_and_expired_dealers_are_never_selected() {
    let selector = DealerSelector::default();
    let table = blackjack_table("PIT-A");

    let roulette_only = dealer("r", vec![cert("r", GameType::Roulette, ProficiencyLevel::Expert)]);
    let mut expired_cert = cert("x", GameType::Blackjack, ProficiencyLevel::Expert);
    expired_cert.expiration_date = Some(NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
    let expired = dealer("x", vec![expired_cert]);
    let mut inactive_cert = cert("i", GameType::Blackjack, ProficiencyLevel::Expert);
    inactive_cert.is_active = false;
    let inactive = dealer("i", vec![inactive_cert]);

    let pool = vec![roulette_only, expired, inactive];
    assert!(selector.select_best_dealer(&table, &pool, now()).is_none());
    assert!(selector.rank_candidates(&table, &pool, now()).is_empty());
}

#[test]
fn test_break_recency_and_pit_factors() {
    let selector = DealerSelector::default();
    let table = blackjack_table("PIT-A");

    let mut rested = dealer("rested", vec![cert("rested", GameType::Blackjack, ProficiencyLevel::Basic)]);
    rested.last_break_time = Some(now() - Duration::minutes(30));
    rested.preferred_pit = Some("PIT-A".to_string());

    let mut tired = dealer("tired", vec![cert("tired", GameType::Blackjack, ProficiencyLevel::Basic)]);
    tired.last_break_time = Some(now() - Duration::minutes(150));

    let mut middle = dealer("middle", vec![cert("middle", GameType::Blackjack, ProficiencyLevel::Basic)]);
    middle.last_break_time = Some(now() - Duration::minutes(100));

    let pool = vec![tired, middle, rested];
    let ranked = selector.rank_candidates(&table, &pool, now());

    let by_id = |id: &str| ranked.iter().find(|c| c.dealer_id == id).unwrap();
    assert_eq!(by_id("rested").breakdown.break_recency, 10.0);
    assert_eq!(by_id("rested").breakdown.pit_preference, 15.0);
    assert_eq!(by_id("tired").breakdown.break_recency, -20.0);
    assert_eq!(by_id("middle").breakdown.break_recency, 0.0);
    assert_eq!(ranked[0].dealer_id, "rested");
    assert_eq!(ranked[2].dealer_id, "tired");
}

#[test]
fn test_movement_uses_most_recent_assignment() {
    let selector = DealerSelector::default();
    let table = blackjack_table("PIT-A");
    let base = now() - Duration::hours(3);

    let mut d = dealer("d1", vec![cert("d1", GameType::Blackjack, ProficiencyLevel::Basic)]);
    d.assignment_history = vec![
        history(GameType::Blackjack, "PIT-A", base, 20),
        history(GameType::Blackjack, "PIT-B", base + Duration::hours(1), 20),
    ];
    let score = selector.score_dealer(&table, &d, now()).unwrap();
    assert_eq!(score.movement, 0.0);

    d.assignment_history.reverse();
    d.assignment_history[1] = history(GameType::Blackjack, "PIT-A", base + Duration::hours(2), 20);
    let score = selector.score_dealer(&table, &d, now()).unwrap();
    assert_eq!(score.movement, 10.0);
}

#[test]
fn test_ties_keep_pool_order_and_pool_is_untouched() {
    let selector = DealerSelector::new(ScoringWeights::default());
    let table = blackjack_table("PIT-A");
    let pool = vec![
        dealer("first", vec![cert("first", GameType::Blackjack, ProficiencyLevel::Advanced)]),
        dealer("second", vec![cert("second", GameType::Blackjack, ProficiencyLevel::Advanced)]),
    ];

    let best = selector.select_best_dealer(&table, &pool, now()).unwrap();
    assert_eq!(best.dealer_id, "first");
    assert_eq!(pool.len(), 2);
}

#[test]
fn test_highest_of_several_valid_certifications_is_used() {
    let selector = DealerSelector::default();
    let table = blackjack_table("PIT-A");
    let d = dealer(
        "d1",
        vec![
            cert("d1", GameType::Blackjack, ProficiencyLevel::Trainee),
            Certification {
                certification_id: "c-second".to_string(),
                ..cert("d1", GameType::Blackjack, ProficiencyLevel::Expert)
            },
        ],
    );

    let best = selector.select_best_dealer(&table, &[d], now()).unwrap();
    assert_eq!(best.proficiency_level, ProficiencyLevel::Expert);
    assert_eq!(best.breakdown.skill, 100.0);
}
