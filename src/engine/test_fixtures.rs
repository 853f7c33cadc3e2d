// ==========================================
// 引擎单元测试公共夹具
// ==========================================

use crate::config::RotationConfig;
use crate::domain::{
    Certification, CrapsRole, Dealer, DealerStatus, GameType, ProficiencyLevel, Table, TableStatus,
};
use crate::engine::rotation::RotationEngine;
use crate::repository::SqliteRosterStore;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

pub fn ts(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap().and_hms_opt(h, m, 0).unwrap()
}

pub fn setup_connection() -> Arc<Mutex<Connection>> {
    crate::db::open_in_memory().unwrap()
}

pub fn setup_store() -> Arc<SqliteRosterStore> {
    Arc::new(SqliteRosterStore::from_connection(setup_connection()))
}

pub fn setup_engine() -> (Arc<SqliteRosterStore>, RotationEngine<SqliteRosterStore>) {
    let store = setup_store();
    let engine = RotationEngine::new(store.clone(), RotationConfig::default());
    (store, engine)
}

pub fn make_dealer(id: &str, certs: &[(GameType, ProficiencyLevel)]) -> Dealer {
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
        certifications: certs
            .iter()
            .map(|(game_type, level)| Certification {
                certification_id: format!("cert-{}-{}", id, game_type),
                dealer_id: id.to_string(),
                game_type: *game_type,
                proficiency_level: *level,
                craps_role: CrapsRole::None,
                certified_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                expiration_date: None,
                is_active: true,
            })
            .collect(),
        assignment_history: Vec::new(),
        revision: 0,
    }
}

pub fn make_table(id: &str, number: &str, game_type: GameType) -> Table {
    Table {
        table_id: id.to_string(),
        table_number: number.to_string(),
        game_type,
        status: TableStatus::Open,
        pit: "PIT-A".to_string(),
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

/// 录入一名只持 21 点资质的荷官
pub fn seed_blackjack_dealer(store: &SqliteRosterStore, id: &str, level: ProficiencyLevel) {
    store
        .insert_dealer(&make_dealer(id, &[(GameType::Blackjack, level)]))
        .unwrap();
}

pub fn seed_table(store: &SqliteRosterStore, id: &str, number: &str, game_type: GameType) {
    store.insert_table(&make_table(id, number, game_type)).unwrap();
}
