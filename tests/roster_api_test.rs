// ==========================================
// RosterApi 集成测试
// ==========================================
// 测试目标: 荷官/赌台录入、上下班、开关台与锁定
// ==========================================


use table_rotation::api::NewTable;
use table_rotation::domain::{ActionType, DealerStatus, GameType, ProficiencyLevel, TableStatus};
use table_rotation::engine::AssignOptions;
use test_helpers::{cert, seed_dealer, seed_open_table, setup_app, ts, ACTOR};

fn new_table(table_number: &str, push_interval_minutes: Option<i64>) -> NewTable {
    NewTable {
        table_number: table_number.to_string(),
        game_type: GameType::Baccarat,
        pit: "HL-1".to_string(),
        min_bet: 100.0,
        max_bet: 10_000.0,
        is_high_limit: true,
        required_dealer_count: 1,
        push_interval_minutes,
    }
}

#[test]
fn test_register_dealer_rejects_duplicate_employee_number() {
    let (_tmp, state) = setup_app();
    let dealer = seed_dealer(&state, "E001", vec![cert(GameType::Blackjack, ProficiencyLevel::Basic)]);
    assert_eq!(dealer.status, DealerStatus::Available);
    assert_eq!(dealer.certifications.len(), 1);

    let again = state
        .roster_api
        .register_dealer(
            ACTOR,
            table_rotation::api::NewDealer {
                employee_number: "E001".to_string(),
                display_name: "Someone else".to_string(),
                seniority_level: 1,
                shift_start: dealer.shift_start,
                shift_end: dealer.shift_end,
                preferred_pit: None,
                certifications: Vec::new(),
            },
        )
        .unwrap();
    assert!(!again.success);

    let added = state
        .roster_api
        .add_certification(ACTOR, &dealer.dealer_id, cert(GameType::Roulette, ProficiencyLevel::Advanced))
        .unwrap();
    assert!(added.success, "{}", added.message);
    let reloaded = state.roster_api.get_dealer(&dealer.dealer_id).unwrap().unwrap();
    assert_eq!(reloaded.certifications.len(), 2);
}

#[test]
fn test_create_table_defaults_and_collisions() {
    let (_tmp, state) = setup_app();

    let created = state.roster_api.create_table(ACTOR, new_table("BAC1", None)).unwrap();
    assert!(created.success, "{}", created.message);
    let table = created.payload.unwrap();
    assert_eq!(table.status, TableStatus::Closed);
    assert_eq!(table.push_interval_minutes, 20);

    let custom = state.roster_api.create_table(ACTOR, new_table("BAC2", Some(30))).unwrap();
    assert_eq!(custom.payload.unwrap().push_interval_minutes, 30);

    let duplicate = state.roster_api.create_table(ACTOR, new_table("BAC1", None)).unwrap();
    assert!(!duplicate.success);

    let invalid = state.roster_api.create_table(ACTOR, new_table("BAC3", Some(0))).unwrap();
    assert!(!invalid.success);

    assert!(state.roster_api.list_tables(TableStatus::Open).unwrap().is_empty());
    assert!(state.roster_api.open_table(ACTOR, &table.table_id).unwrap().success);
    assert!(!state.roster_api.open_table(ACTOR, &table.table_id).unwrap().success);
    assert_eq!(state.roster_api.list_tables(TableStatus::Open).unwrap().len(), 1);

    let opened = state
        .audit_log_repo
        .find_by_action_type(ActionType::TableOpened, 10)
        .unwrap();
    assert_eq!(opened.len(), 1);
}

#[test]
fn test_close_table_requires_no_dealers() {
    let (_tmp, state) = setup_app();
    let dealer = seed_dealer(&state, "E001", vec![cert(GameType::Blackjack, ProficiencyLevel::Basic)]);
    let table = seed_open_table(&state, "BJ101", GameType::Blackjack);

    let assignment = state
        .rotation_api
        .assign_dealer(ACTOR, &dealer.dealer_id, &table.table_id, true, AssignOptions::default(), ts(10, 0))
        .unwrap()
        .payload
        .unwrap();

    assert!(!state.roster_api.close_table(ACTOR, &table.table_id).unwrap().success);
    assert!(!state.roster_api.end_shift(ACTOR, &dealer.dealer_id).unwrap().success);

    state
        .rotation_api
        .remove_dealer(ACTOR, &assignment.assignment_id, ts(10, 30))
        .unwrap();

    assert!(state.roster_api.close_table(ACTOR, &table.table_id).unwrap().success);
    assert!(state.roster_api.end_shift(ACTOR, &dealer.dealer_id).unwrap().success);

    let dealer = state.roster_api.get_dealer(&dealer.dealer_id).unwrap().unwrap();
    assert_eq!(dealer.status, DealerStatus::OffShift);
    assert!(state
        .roster_api
        .list_dealers(&[DealerStatus::Available])
        .unwrap()
        .is_empty());
}
