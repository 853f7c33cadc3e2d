use super::core::StringRotationService;
use crate::domain::{Dealer, RotationString};
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::db_utils::to_storage_precision;
use crate::repository::error::RepositoryError;
use crate::repository::roster_store::RosterStore;
use chrono::NaiveDateTime;
use tracing::info;

impl<S> StringRotationService<S>
where
    S: RosterStore,
{
    // ==========================================
    // 轮换组管理
    // ==========================================

    /// 新建轮换组（名称唯一）
    pub fn create_string(&self, name: &str, description: &str, now: NaiveDateTime) -> EngineResult<RotationString> {
        match self.strings.create(name, description, to_storage_precision(now)) {
            Ok(string) => {
                info!(string = %name, priority = string.priority, "轮换组已创建");
                Ok(string)
            }
            Err(RepositoryError::UniqueConstraintViolation(_)) => Err(EngineError::precondition(format!(
                "轮换组名称已存在: {}",
                name
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// 加入荷官
    ///
    /// 荷官已是该组有效成员 → PreconditionFailed
    pub fn add_dealer(
        &self,
        string_id: &str,
        dealer_id: &str,
        rotation_order: i32,
        now: NaiveDateTime,
    ) -> EngineResult<()> {
        self.require_string(string_id)?;
        if self.store.find_dealer(dealer_id)?.is_none() {
            return Err(EngineError::not_found("Dealer", dealer_id));
        }

        if !self.strings.add_member(string_id, dealer_id, rotation_order, now)? {
            return Err(EngineError::precondition(format!(
                "荷官 {} 已在轮换组中",
                dealer_id
            )));
        }
        info!(string_id = %string_id, dealer_id = %dealer_id, rotation_order = rotation_order, "荷官加入轮换组");
        Ok(())
    }

    /// 移出荷官（停用成员关系）
    ///
    /// # 返回
    /// - `Ok(false)`: 荷官不是该组有效成员
    pub fn remove_dealer(&self, string_id: &str, dealer_id: &str, now: NaiveDateTime) -> EngineResult<bool> {
        self.require_string(string_id)?;
        let removed = self.strings.deactivate_member(string_id, dealer_id, now)?;
        if removed {
            info!(string_id = %string_id, dealer_id = %dealer_id, "荷官移出轮换组");
        }
        Ok(removed)
    }

    /// 设置组内赌台（整体替换）
    pub fn set_tables(&self, string_id: &str, table_ids: &[String], now: NaiveDateTime) -> EngineResult<()> {
        let known = self.store.list_tables_by_ids(table_ids)?;
        if let Some(missing) = table_ids
            .iter()
            .find(|id| !known.iter().any(|t| &t.table_id == *id))
        {
            return Err(EngineError::not_found("Table", missing));
        }

        self.strings.set_table_ids(string_id, table_ids, now)?;
        Ok(())
    }

    /// 有效轮换组，按优先级
    pub fn list_active_strings(&self) -> EngineResult<Vec<RotationString>> {
        Ok(self.strings.list_active()?)
    }

    /// 组内有效荷官，按轮换顺序
    pub fn dealers_in_string(&self, string_id: &str) -> EngineResult<Vec<Dealer>> {
        let string = self
            .strings
            .find_by_id(string_id)?
            .ok_or_else(|| EngineError::not_found("RotationString", string_id))?;

        let mut dealers = Vec::new();
        for member in string.active_members() {
            if let Some(dealer) = self.store.find_dealer(&member.dealer_id)? {
                dealers.push(dealer);
            }
        }
        Ok(dealers)
    }
}
