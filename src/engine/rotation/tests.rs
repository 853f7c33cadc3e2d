use super::AssignOptions;
use crate::domain::{BreakType, DealerStatus, GameType, ProficiencyLevel};
use crate::engine::error::EngineError;
use crate::engine::test_fixtures::{seed_blackjack_dealer, seed_table, setup_engine, ts};
use crate::repository::RosterStore;
use chrono::Duration;

#[test]
fn test_assign_current_sets_dealing() {
    let (store, engine) = setup_engine();
    seed_blackjack_dealer(&store, "d1", ProficiencyLevel::Advanced);
    seed_table(&store, "t1", "BJ101", GameType::Blackjack);

    let a = engine
        .assign("d1", "t1", true, AssignOptions::default(), ts(10, 0))
        .unwrap();
    assert!(a.is_current);
    assert_eq!(a.start_time, ts(10, 0));

    let dealer = store.find_dealer("d1").unwrap().unwrap();
    assert_eq!(dealer.status, DealerStatus::Dealing);
    assert_eq!(dealer.revision, 1);
}

#[test]
fn test_returned_records_match_stored_timestamps() {
    let (store, engine) = setup_engine();
    seed_blackjack_dealer(&store, "d1", ProficiencyLevel::Advanced);
    seed_table(&store, "t1", "BJ101", GameType::Blackjack);

    // 调用方时钟带毫秒，落库为整秒
    let now = ts(9, 0) + Duration::milliseconds(750);

    let a = engine.assign("d1", "t1", true, AssignOptions::default(), now).unwrap();
    assert_eq!(a.start_time, ts(9, 0));
    let stored = store.find_assignment(&a.assignment_id).unwrap().unwrap();
    assert_eq!(stored.start_time, a.start_time);
    assert_eq!(stored.created_at, a.created_at);

    let record = engine
        .send_to_break("d1", BreakType::Break, 15, ts(9, 30) + Duration::milliseconds(250))
        .unwrap();
    let stored_break = store.find_open_break("d1").unwrap().unwrap();
    assert_eq!(stored_break, record);
    assert_eq!(
        store.find_dealer("d1").unwrap().unwrap().last_break_time,
        Some(ts(9, 30))
    );
}

#[test]
fn test_assign_current_replaces_incumbent_and_previous_seat() {
    let (store, engine) = setup_engine();
    seed_blackjack_dealer(&store, "d1", ProficiencyLevel::Advanced);
    seed_blackjack_dealer(&store, "d2", ProficiencyLevel::Advanced);
    seed_table(&store, "t1", "BJ101", GameType::Blackjack);
    seed_table(&store, "t2", "BJ102", GameType::Blackjack);

    let first = engine.assign("d1", "t1", true, AssignOptions::default(), ts(10, 0)).unwrap();
    let second = engine.assign("d2", "t2", true, AssignOptions::default(), ts(10, 0)).unwrap();

    // d2 从 BJ102 调到 BJ101：BJ101 现任 d1 下台，BJ102 空出
    engine.assign("d2", "t1", true, AssignOptions::default(), ts(10, 30)).unwrap();

    let first = store.find_assignment(&first.assignment_id).unwrap().unwrap();
    let second = store.find_assignment(&second.assignment_id).unwrap().unwrap();
    assert_eq!(first.end_time, Some(ts(10, 30)));
    assert_eq!(second.end_time, Some(ts(10, 30)));

    assert_eq!(store.find_dealer("d1").unwrap().unwrap().status, DealerStatus::Available);
    assert_eq!(store.find_dealer("d2").unwrap().unwrap().status, DealerStatus::Dealing);

    let t2 = store.find_table("t2").unwrap().unwrap();
    assert!(t2.active_current_assignment().is_none());
}

#[test]
fn test_queued_assignment_defaults_to_push_interval() {
    let (store, engine) = setup_engine();
    seed_blackjack_dealer(&store, "d1", ProficiencyLevel::Advanced);
    seed_table(&store, "t1", "BJ101", GameType::Blackjack);

    let a = engine.assign("d1", "t1", false, AssignOptions::default(), ts(10, 0)).unwrap();
    assert!(!a.is_current);
    assert_eq!(a.start_time, ts(10, 20));
    assert_eq!(store.find_dealer("d1").unwrap().unwrap().status, DealerStatus::Available);

    // 已有未结束派台时不可再排为下一位
    seed_table(&store, "t2", "BJ102", GameType::Blackjack);
    let err = engine
        .assign("d1", "t2", false, AssignOptions::default(), ts(10, 5))
        .unwrap_err();
    assert!(matches!(err, EngineError::PreconditionFailed(_)));
}

#[test]
fn test_terminal_dealer_cannot_be_assigned() {
    let (store, engine) = setup_engine();
    seed_blackjack_dealer(&store, "d1", ProficiencyLevel::Advanced);
    seed_table(&store, "t1", "BJ101", GameType::Blackjack);
    engine.send_home("d1", ts(9, 0)).unwrap();

    let err = engine
        .assign("d1", "t1", true, AssignOptions::default(), ts(10, 0))
        .unwrap_err();
    assert!(matches!(err, EngineError::PreconditionFailed(_)));
}

#[test]
fn test_push_rotates_current_and_next() {
    let (store, engine) = setup_engine();
    seed_blackjack_dealer(&store, "d1", ProficiencyLevel::Advanced);
    seed_blackjack_dealer(&store, "d2", ProficiencyLevel::Advanced);
    seed_table(&store, "t1", "BJ101", GameType::Blackjack);

    let current = engine.assign("d1", "t1", true, AssignOptions::default(), ts(10, 0)).unwrap();
    let next = engine.assign("d2", "t1", false, AssignOptions::default(), ts(10, 0)).unwrap();

    assert!(engine.execute_push("t1", ts(10, 20)).unwrap());

    let current = store.find_assignment(&current.assignment_id).unwrap().unwrap();
    let next = store.find_assignment(&next.assignment_id).unwrap().unwrap();
    assert_eq!(current.end_time, Some(ts(10, 20)));
    assert!(!current.is_current);
    assert!(next.is_current);
    assert_eq!(next.start_time, ts(10, 20));
    assert!(next.end_time.is_none());

    assert_eq!(store.find_dealer("d1").unwrap().unwrap().status, DealerStatus::Available);
    assert_eq!(store.find_dealer("d2").unwrap().unwrap().status, DealerStatus::Dealing);
}

#[test]
fn test_push_without_next_changes_nothing() {
    let (store, engine) = setup_engine();
    seed_blackjack_dealer(&store, "d1", ProficiencyLevel::Advanced);
    seed_table(&store, "t1", "BJ101", GameType::Blackjack);

    let current = engine.assign("d1", "t1", true, AssignOptions::default(), ts(10, 0)).unwrap();
    let table_before = store.find_table("t1").unwrap().unwrap();

    assert!(!engine.execute_push("t1", ts(10, 20)).unwrap());
    assert!(!engine.execute_push("missing", ts(10, 20)).unwrap());

    let stored = store.find_assignment(&current.assignment_id).unwrap().unwrap();
    assert!(stored.end_time.is_none());
    assert!(stored.is_current);
    assert_eq!(store.find_table("t1").unwrap().unwrap().revision, table_before.revision);
}

#[test]
fn test_push_closes_incoming_dealers_break() {
    let (store, engine) = setup_engine();
    seed_blackjack_dealer(&store, "d1", ProficiencyLevel::Advanced);
    seed_blackjack_dealer(&store, "d2", ProficiencyLevel::Advanced);
    seed_table(&store, "t1", "BJ101", GameType::Blackjack);

    engine.assign("d1", "t1", true, AssignOptions::default(), ts(10, 0)).unwrap();
    engine.send_to_break("d2", BreakType::Break, 15, ts(10, 0)).unwrap();
    engine.assign("d2", "t1", false, AssignOptions::default(), ts(10, 5)).unwrap();

    assert!(engine.execute_push("t1", ts(10, 25)).unwrap());
    assert!(store.find_open_break("d2").unwrap().is_none());
    assert_eq!(store.find_dealer("d2").unwrap().unwrap().status, DealerStatus::Dealing);
}

#[test]
fn test_remove_dealer_twice_fails_second_time() {
    let (store, engine) = setup_engine();
    seed_blackjack_dealer(&store, "d1", ProficiencyLevel::Advanced);
    seed_table(&store, "t1", "BJ101", GameType::Blackjack);

    let a = engine.assign("d1", "t1", true, AssignOptions::default(), ts(10, 0)).unwrap();
    let removed = engine.remove_dealer(&a.assignment_id, ts(10, 10)).unwrap();
    assert_eq!(removed.end_time, Some(ts(10, 10)));
    assert_eq!(store.find_dealer("d1").unwrap().unwrap().status, DealerStatus::Available);

    let revision = store.find_dealer("d1").unwrap().unwrap().revision;
    assert!(matches!(
        engine.remove_dealer(&a.assignment_id, ts(10, 20)).unwrap_err(),
        EngineError::PreconditionFailed(_)
    ));
    assert!(matches!(
        engine.remove_dealer("missing", ts(10, 20)).unwrap_err(),
        EngineError::NotFound { .. }
    ));
    assert_eq!(store.find_dealer("d1").unwrap().unwrap().revision, revision);
}

#[test]
fn test_meal_break_ends_current_assignment() {
    let (store, engine) = setup_engine();
    seed_blackjack_dealer(&store, "d1", ProficiencyLevel::Advanced);
    seed_table(&store, "t1", "BJ101", GameType::Blackjack);

    let a = engine.assign("d1", "t1", true, AssignOptions::default(), ts(10, 0)).unwrap();
    let record = engine.send_to_break("d1", BreakType::Meal, 30, ts(12, 0)).unwrap();

    assert_eq!(record.break_type, BreakType::Meal);
    assert_eq!(record.expected_duration_minutes, 30);
    assert!(record.is_compliant);

    let dealer = store.find_dealer("d1").unwrap().unwrap();
    assert_eq!(dealer.status, DealerStatus::OnMeal);
    assert_eq!(dealer.last_break_time, Some(ts(12, 0)));
    assert_eq!(dealer.last_meal_time, Some(ts(12, 0)));

    let stored = store.find_assignment(&a.assignment_id).unwrap().unwrap();
    assert_eq!(stored.end_time, Some(ts(12, 0)));
}

#[test]
fn test_break_compliance_follows_break_interval() {
    let (store, engine) = setup_engine();
    seed_blackjack_dealer(&store, "d1", ProficiencyLevel::Advanced);

    engine.send_to_break("d1", BreakType::Break, 15, ts(8, 0)).unwrap();
    engine.return_from_break("d1", ts(8, 15)).unwrap();

    // 距上次休息 150 分钟 > 120
    let late = engine.send_to_break("d1", BreakType::Break, 15, ts(10, 30)).unwrap();
    assert!(!late.is_compliant);
    engine.return_from_break("d1", ts(10, 45)).unwrap();

    let on_time = engine.send_to_break("d1", BreakType::Break, 15, ts(12, 0)).unwrap();
    assert!(on_time.is_compliant);

    // 已在休息中不可重复安排
    assert!(matches!(
        engine.send_to_break("d1", BreakType::Meal, 30, ts(12, 5)).unwrap_err(),
        EngineError::PreconditionFailed(_)
    ));
}

#[test]
fn test_return_from_break_twice_is_noop() {
    let (store, engine) = setup_engine();
    seed_blackjack_dealer(&store, "d1", ProficiencyLevel::Advanced);

    engine.send_to_break("d1", BreakType::Break, 15, ts(10, 0)).unwrap();
    assert!(engine.return_from_break("d1", ts(10, 15)).unwrap());

    let after_first = store.find_dealer("d1").unwrap().unwrap();
    assert_eq!(after_first.status, DealerStatus::Available);

    assert!(!engine.return_from_break("d1", ts(10, 20)).unwrap());
    let after_second = store.find_dealer("d1").unwrap().unwrap();
    assert_eq!(after_second.revision, after_first.revision);
}

#[test]
fn test_send_home_releases_everything() {
    let (store, engine) = setup_engine();
    seed_blackjack_dealer(&store, "d1", ProficiencyLevel::Advanced);
    seed_table(&store, "t1", "BJ101", GameType::Blackjack);

    engine.assign("d1", "t1", true, AssignOptions::default(), ts(10, 0)).unwrap();
    let vacated = engine.send_home("d1", ts(11, 0)).unwrap().unwrap();
    assert_eq!(vacated.table_id, "t1");

    let dealer = store.find_dealer("d1").unwrap().unwrap();
    assert_eq!(dealer.status, DealerStatus::SentHome);
    assert!(store.find_open_assignment_for_dealer("d1").unwrap().is_none());
    assert!(engine.send_home("d1", ts(11, 5)).is_err());
}

#[test]
fn test_due_push_sweep() {
    let (store, engine) = setup_engine();
    for id in ["d1", "d2", "d3"] {
        seed_blackjack_dealer(&store, id, ProficiencyLevel::Advanced);
    }
    seed_table(&store, "t1", "BJ101", GameType::Blackjack);
    seed_table(&store, "t2", "BJ102", GameType::Blackjack);

    engine.assign("d1", "t1", true, AssignOptions::default(), ts(10, 0)).unwrap();
    engine.assign("d2", "t1", false, AssignOptions::default(), ts(10, 0)).unwrap();
    // BJ102 有现任但没有下一位，不计入
    engine.assign("d3", "t2", true, AssignOptions::default(), ts(9, 0)).unwrap();

    assert!(engine.tables_due_for_push(ts(10, 10)).unwrap().is_empty());

    let due = engine.tables_due_for_push(ts(10, 20)).unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].table_number, "BJ101");

    let report = engine.execute_due_pushes(ts(10, 20)).unwrap();
    assert_eq!(report.pushed, vec!["BJ101".to_string()]);
    assert!(report.failures.is_empty());
    assert_eq!(engine.current_assignment("d2").unwrap().unwrap().table_id, "t1");
    assert!(engine.current_assignment("d1").unwrap().is_none());
}

#[test]
fn test_dealers_on_break_lists_break_and_meal() {
    let (store, engine) = setup_engine();
    for id in ["d1", "d2", "d3"] {
        seed_blackjack_dealer(&store, id, ProficiencyLevel::Basic);
    }
    engine.send_to_break("d1", BreakType::Break, 15, ts(10, 0)).unwrap();
    engine.send_to_break("d2", BreakType::Meal, 30, ts(10, 0)).unwrap();

    let on_break = engine.dealers_on_break().unwrap();
    let ids: Vec<&str> = on_break.iter().map(|d| d.dealer_id.as_str()).collect();
    assert_eq!(ids, vec!["d1", "d2"]);
}
