use super::Scheduler;
use crate::config::RotationConfig;
use crate::domain::{BreakType, DealerStatus, GameType, ProficiencyLevel, TableStatus};
use crate::engine::rotation::AssignOptions;
use crate::engine::test_fixtures::{
    make_dealer, seed_blackjack_dealer, seed_table, setup_store, ts,
};
use crate::repository::{RosterStore, SqliteRosterStore};
use chrono::NaiveTime;
use std::sync::Arc;

fn setup_scheduler() -> (Arc<SqliteRosterStore>, Scheduler<SqliteRosterStore>) {
    let store = setup_store();
    let scheduler = Scheduler::new(store.clone(), RotationConfig::default());
    (store, scheduler)
}

// ==========================================
// generate_schedule
// ==========================================

#[test]
fn test_no_dealers_fails_fast() {
    let (store, scheduler) = setup_scheduler();
    seed_table(&store, "t1", "BJ101", GameType::Blackjack);
    seed_table(&store, "t2", "BJ102", GameType::Blackjack);
    seed_table(&store, "t3", "R201", GameType::Roulette);

    let result = scheduler.generate_schedule(ts(10, 0), 10).unwrap();
    assert!(!result.success);
    assert!(result.message.contains("No available dealers found"));
    assert!(result.assignments.is_empty());
}

#[test]
fn test_no_open_tables_fails_fast() {
    let (store, scheduler) = setup_scheduler();
    seed_blackjack_dealer(&store, "d1", ProficiencyLevel::Advanced);
    seed_table(&store, "t1", "BJ101", GameType::Blackjack);
    store.set_table_status("t1", TableStatus::Closed).unwrap();

    let result = scheduler.generate_schedule(ts(10, 0), 10).unwrap();
    assert!(!result.success);
    assert_eq!(result.message, "No open tables found");
}

#[test]
fn test_schedule_staffs_tables_from_shrinking_pool() {
    let (store, scheduler) = setup_scheduler();
    seed_blackjack_dealer(&store, "d1", ProficiencyLevel::Expert);
    seed_blackjack_dealer(&store, "d2", ProficiencyLevel::Basic);
    seed_table(&store, "t1", "BJ101", GameType::Blackjack);
    seed_table(&store, "t2", "BJ102", GameType::Blackjack);
    seed_table(&store, "t3", "BJ103", GameType::Blackjack);

    let result = scheduler.generate_schedule(ts(10, 0), 3).unwrap();
    assert!(result.success);
    assert_eq!(result.assignments.len(), 2);

    // 台号顺序 + 最高分优先
    assert_eq!(result.assignments[0].table_id, "t1");
    assert_eq!(result.assignments[0].dealer_id, "d1");
    assert_eq!(result.assignments[1].table_id, "t2");
    assert_eq!(result.assignments[1].dealer_id, "d2");
    assert!(result.assignments.iter().all(|a| a.is_current && a.is_ai_generated));
    assert!(result.assignments.iter().all(|a| a.start_time == ts(10, 0)));

    assert_eq!(result.warnings, vec!["Could not find qualified dealer for table BJ103".to_string()]);
    assert_eq!(result.metrics.total_assignments, 2);
    assert_eq!(result.metrics.tables_without_dealers, 1);
    assert_eq!(result.metrics.unused_dealers, 0);
    assert_eq!(result.metrics.horizon_end, Some(ts(11, 0)));

    // 只生成建议，不落库
    assert!(store.find_open_assignment_for_dealer("d1").unwrap().is_none());
}

#[test]
fn test_locked_table_is_skipped() {
    let (store, scheduler) = setup_scheduler();
    seed_blackjack_dealer(&store, "d1", ProficiencyLevel::Expert);
    seed_table(&store, "t1", "BJ101", GameType::Blackjack);
    seed_table(&store, "t2", "BJ102", GameType::Blackjack);
    store.set_table_locked("t1", true).unwrap();

    let result = scheduler.generate_schedule(ts(10, 0), 1).unwrap();
    assert!(result.success);
    assert_eq!(result.assignments.len(), 1);
    assert_eq!(result.assignments[0].table_id, "t2");
    assert!(result.warnings.iter().any(|w| w.contains("BJ101") && w.contains("locked")));
}

#[test]
fn test_apply_schedule_persists_each_table() {
    let (store, scheduler) = setup_scheduler();
    seed_blackjack_dealer(&store, "d1", ProficiencyLevel::Expert);
    seed_blackjack_dealer(&store, "d2", ProficiencyLevel::Basic);
    seed_table(&store, "t1", "BJ101", GameType::Blackjack);
    seed_table(&store, "t2", "BJ102", GameType::Blackjack);

    let result = scheduler.generate_schedule(ts(10, 0), 1).unwrap();
    // d2 在落库前请假，其对应台失败，其他台照常
    store.set_dealer_status("d2", DealerStatus::CalledIn).unwrap();

    let report = scheduler.apply_schedule(&result.assignments, ts(10, 0));
    assert_eq!(report.applied.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, "t2");

    assert_eq!(store.find_dealer("d1").unwrap().unwrap().status, DealerStatus::Dealing);
    let t1 = store.find_table("t1").unwrap().unwrap();
    assert_eq!(t1.active_current_assignment().unwrap().dealer_id, "d1");
}

#[test]
fn test_apply_keeps_dealer_already_seated_at_proposed_table() {
    let (store, scheduler) = setup_scheduler();
    seed_blackjack_dealer(&store, "d1", ProficiencyLevel::Expert);
    seed_table(&store, "t1", "BJ101", GameType::Blackjack);

    let seated = scheduler
        .engine()
        .assign("d1", "t1", true, AssignOptions::default(), ts(9, 0))
        .unwrap();

    // 在台荷官仍在候选池中，建议结果与现状一致
    let result = scheduler.generate_schedule(ts(10, 0), 1).unwrap();
    assert_eq!(result.assignments.len(), 1);
    assert_eq!(result.assignments[0].dealer_id, "d1");
    assert_eq!(result.assignments[0].table_id, "t1");

    let report = scheduler.apply_schedule(&result.assignments, ts(10, 0));
    assert!(report.applied.is_empty());
    assert!(report.failures.is_empty());
    assert_eq!(report.unchanged.len(), 1);
    assert_eq!(report.unchanged[0].assignment_id, seated.assignment_id);

    let t1 = store.find_table("t1").unwrap().unwrap();
    let current = t1.active_current_assignment().unwrap();
    assert_eq!(current.assignment_id, seated.assignment_id);
    assert_eq!(current.start_time, ts(9, 0));
}

// ==========================================
// recommend_next_dealer / handle_call_in
// ==========================================

#[test]
fn test_recommend_uses_available_and_on_break_pool() {
    let (store, scheduler) = setup_scheduler();
    seed_blackjack_dealer(&store, "d1", ProficiencyLevel::Expert);
    seed_blackjack_dealer(&store, "d2", ProficiencyLevel::Advanced);
    seed_blackjack_dealer(&store, "d3", ProficiencyLevel::Basic);
    seed_table(&store, "t1", "BJ101", GameType::Blackjack);
    seed_table(&store, "t2", "BJ102", GameType::Blackjack);

    // d1 在台，不在候选池中；d2 休息中仍可推荐
    scheduler
        .engine()
        .assign("d1", "t2", true, AssignOptions::default(), ts(9, 0))
        .unwrap();
    scheduler
        .engine()
        .send_to_break("d2", BreakType::Break, 15, ts(9, 30))
        .unwrap();

    let pick = scheduler.recommend_next_dealer("t1", ts(9, 40)).unwrap().unwrap();
    assert_eq!(pick.dealer_id, "d2");

    assert!(scheduler.recommend_next_dealer("missing", ts(9, 40)).is_err());
}

#[test]
fn test_call_in_assigns_replacement() {
    let (store, scheduler) = setup_scheduler();
    seed_blackjack_dealer(&store, "d1", ProficiencyLevel::Expert);
    seed_blackjack_dealer(&store, "d2", ProficiencyLevel::Advanced);
    seed_blackjack_dealer(&store, "d3", ProficiencyLevel::Basic);
    seed_table(&store, "t1", "BJ101", GameType::Blackjack);

    let original = scheduler
        .engine()
        .assign("d1", "t1", true, AssignOptions::default(), ts(10, 0))
        .unwrap();

    let outcome = scheduler.handle_call_in("d1", ts(10, 30)).unwrap();
    assert_eq!(outcome.vacated.unwrap().assignment_id, original.assignment_id);
    let replacement = outcome.replacement.unwrap();
    assert_eq!(replacement.dealer_id, "d2");
    assert!(replacement.is_ai_generated);
    assert!(outcome.warnings.is_empty());

    assert_eq!(store.find_dealer("d1").unwrap().unwrap().status, DealerStatus::CalledIn);
    assert_eq!(store.find_dealer("d2").unwrap().unwrap().status, DealerStatus::Dealing);
    let t1 = store.find_table("t1").unwrap().unwrap();
    assert_eq!(t1.active_current_assignment().unwrap().dealer_id, "d2");
}

#[test]
fn test_call_in_without_replacement_warns() {
    let (store, scheduler) = setup_scheduler();
    seed_blackjack_dealer(&store, "d1", ProficiencyLevel::Expert);
    seed_table(&store, "t1", "BJ101", GameType::Blackjack);
    store
        .insert_dealer(&make_dealer("d2", &[(GameType::Roulette, ProficiencyLevel::Expert)]))
        .unwrap();

    scheduler
        .engine()
        .assign("d1", "t1", true, AssignOptions::default(), ts(10, 0))
        .unwrap();

    let outcome = scheduler.handle_call_in("d1", ts(10, 30)).unwrap();
    assert!(outcome.replacement.is_none());
    assert_eq!(outcome.warnings.len(), 1);

    assert_eq!(store.find_dealer("d1").unwrap().unwrap().status, DealerStatus::CalledIn);
    assert!(store.find_table("t1").unwrap().unwrap().active_current_assignment().is_none());
}

#[test]
fn test_call_in_of_idle_dealer_needs_no_replacement() {
    let (store, scheduler) = setup_scheduler();
    seed_blackjack_dealer(&store, "d1", ProficiencyLevel::Expert);

    let outcome = scheduler.handle_call_in("d1", ts(10, 30)).unwrap();
    assert!(outcome.vacated.is_none());
    assert!(outcome.replacement.is_none());
    assert!(outcome.warnings.is_empty());
    assert_eq!(store.find_dealer("d1").unwrap().unwrap().status, DealerStatus::CalledIn);
}

// ==========================================
// 休息 / 用餐到期
// ==========================================

#[test]
fn test_break_due_checks() {
    let (store, scheduler) = setup_scheduler();
    let mut dealer = make_dealer("d1", &[(GameType::Blackjack, ProficiencyLevel::Basic)]);
    assert!(scheduler.needs_break(&dealer, ts(10, 0)));

    dealer.last_break_time = Some(ts(10, 0));
    assert!(!scheduler.needs_break(&dealer, ts(11, 59)));
    assert!(scheduler.needs_break(&dealer, ts(12, 0)));

    seed_blackjack_dealer(&store, "d1", ProficiencyLevel::Basic);
    seed_blackjack_dealer(&store, "d2", ProficiencyLevel::Basic);
    seed_table(&store, "t1", "BJ101", GameType::Blackjack);
    scheduler
        .engine()
        .assign("d1", "t1", true, AssignOptions::default(), ts(10, 0))
        .unwrap();

    // 只看在台荷官
    let due = scheduler.dealers_due_for_break(ts(10, 30)).unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].dealer_id, "d1");
}

#[test]
fn test_meal_deadline_checks() {
    let (_store, scheduler) = setup_scheduler();
    let mut dealer = make_dealer("d1", &[(GameType::Blackjack, ProficiencyLevel::Basic)]);

    // 08:00 上班，5 小时时限
    assert!(!scheduler.needs_meal(&dealer, ts(12, 59)));
    assert!(scheduler.needs_meal(&dealer, ts(13, 0)));

    dealer.last_meal_time = Some(ts(11, 0));
    assert!(!scheduler.needs_meal(&dealer, ts(13, 0)));

    // 跨夜班: 22:00 上班，次日 03:30 已满 5.5 小时
    let mut night = make_dealer("d2", &[(GameType::Blackjack, ProficiencyLevel::Basic)]);
    night.shift_start = NaiveTime::from_hms_opt(22, 0, 0).unwrap();
    assert!(scheduler.needs_meal(&night, ts(3, 30)));
    assert!(!scheduler.needs_meal(&night, ts(2, 30)));
}

