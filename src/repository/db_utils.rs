// ==========================================
// 赌台荷官轮换系统 - 数据库工具模块
// ==========================================
// 职责: IN 子句构建、时间字段的文本编解码
// 存储格式: 时间戳 "%Y-%m-%d %H:%M:%S"，日期 "%Y-%m-%d"，时刻 "%H:%M:%S"
// ==========================================

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, SubsecRound, Utc};
use rusqlite::types::Type;

pub const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// 构建 IN 子句的 SQL 片段
///
/// 空列表返回永假条件 "1 = 0"，保证 SQL 语法正确。
pub fn build_in_clause<T: AsRef<str>>(column_name: &str, values: &[T]) -> String {
    if values.is_empty() {
        return "1 = 0".to_string();
    }

    let placeholders = values.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
    format!("{} IN ({})", column_name, placeholders)
}

/// 截断到存储精度（整秒），保证返回给调用方的时间与落库一致
pub fn to_storage_precision(ts: NaiveDateTime) -> NaiveDateTime {
    ts.trunc_subsecs(0)
}

/// 当前 UTC 时间（整秒）
pub fn utc_now() -> NaiveDateTime {
    to_storage_precision(Utc::now().naive_utc())
}

pub fn fmt_ts(ts: NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

pub fn fmt_date(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

pub fn fmt_time(t: NaiveTime) -> String {
    t.format(TIME_FORMAT).to_string()
}

fn conversion_error<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

/// 解析时间戳列（idx 用于错误定位）
pub fn parse_ts(idx: usize, s: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TS_FORMAT).map_err(|e| conversion_error(idx, e))
}

pub fn parse_opt_ts(idx: usize, s: Option<String>) -> rusqlite::Result<Option<NaiveDateTime>> {
    s.map(|v| parse_ts(idx, &v)).transpose()
}

pub fn parse_date(idx: usize, s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| conversion_error(idx, e))
}

pub fn parse_time(idx: usize, s: &str) -> rusqlite::Result<NaiveTime> {
    NaiveTime::parse_from_str(s, TIME_FORMAT).map_err(|e| conversion_error(idx, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_in_clause() {
        let ids = vec!["a".to_string(), "b".to_string()];
        assert_eq!(build_in_clause("table_id", &ids), "table_id IN (?, ?)");

        let empty: Vec<String> = vec![];
        assert_eq!(build_in_clause("table_id", &empty), "1 = 0");
    }

    #[test]
    fn test_parse_ts_rejects_garbage() {
        assert!(parse_ts(0, "2025-13-40 99:00:00").is_err());
        let ts = parse_ts(0, "2025-03-01 10:20:00").unwrap();
        assert_eq!(fmt_ts(ts), "2025-03-01 10:20:00");
    }

    #[test]
    fn test_storage_precision_matches_round_trip() {
        let raw = parse_ts(0, "2025-03-01 09:00:00").unwrap() + chrono::Duration::milliseconds(750);
        let truncated = to_storage_precision(raw);
        assert_eq!(parse_ts(0, &fmt_ts(raw)).unwrap(), truncated);
        assert_eq!(fmt_ts(truncated), "2025-03-01 09:00:00");
        let now = utc_now();
        assert_eq!(now, to_storage_precision(now));
    }
}
