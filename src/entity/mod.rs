//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。

pub mod prelude;

pub mod progress_entries;
pub mod students;
pub mod teachers;
pub mod teaching_plans;
pub mod users;

use chrono::{DateTime, NaiveDate, Utc};

/// 日期列的存储格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn timestamp_to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}

pub(crate) fn parse_date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).unwrap_or_default()
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_columns() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(format_date(date), "2025-03-10");
        assert_eq!(parse_date("2025-03-10"), date);
        assert_eq!(parse_date("garbage"), NaiveDate::default());
    }
}
