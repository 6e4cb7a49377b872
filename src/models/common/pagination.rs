use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 分页查询参数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/pagination.ts")]
pub struct PaginationQuery {
    #[serde(
        default = "default_page",
        deserialize_with = "deserialize_string_to_i64"
    )]
    pub page: i64,
    #[serde(
        default = "default_size",
        deserialize_with = "deserialize_string_to_i64"
    )]
    pub size: i64,
}

// 分页响应信息
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/pagination.ts")]
pub struct PaginationInfo {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

// 自定义反序列化函数，支持字符串到i64的转换
fn deserialize_string_to_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{Error, Unexpected, Visitor};
    use std::fmt;

    struct I64Visitor;

    impl<'de> Visitor<'de> for I64Visitor {
        type Value = i64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an integer or a string containing an integer")
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(value)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            if value <= i64::MAX as u64 {
                Ok(value as i64)
            } else {
                Err(Error::invalid_value(Unexpected::Unsigned(value), &self))
            }
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: Error,
        {
            value
                .parse()
                .map_err(|_| Error::invalid_value(Unexpected::Str(value), &self))
        }
    }

    deserializer.deserialize_any(I64Visitor)
}

fn default_page() -> i64 {
    1
}

fn default_size() -> i64 {
    10
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self { page: 1, size: 10 }
    }
}

/// 页码上限，保证 `(page - 1) * size` 不会溢出
pub const MAX_PAGE: i64 = 1_000_000;

impl PaginationQuery {
    /// 规范化为 (页码, 每页数量)，页码 1..=MAX_PAGE，每页 1..=100
    pub fn normalized(page: Option<i64>, size: Option<i64>) -> (u64, u64) {
        let page = page.unwrap_or(1).clamp(1, MAX_PAGE) as u64;
        let size = size.unwrap_or(10).clamp(1, 100) as u64;
        (page, size)
    }

    /// 第 `page` 页之前的条目数
    pub fn offset(page: u64, size: u64) -> u64 {
        page.saturating_sub(1).saturating_mul(size)
    }
}

/// 已在内存中的结果分页
pub fn paginate_in_memory<T>(items: Vec<T>, page: u64, size: u64) -> Vec<T> {
    let skip = usize::try_from(PaginationQuery::offset(page, size)).unwrap_or(usize::MAX);
    let take = usize::try_from(size).unwrap_or(usize::MAX);
    items.into_iter().skip(skip).take(take).collect()
}

impl PaginationInfo {
    pub fn new(page: u64, page_size: u64, total: u64, total_pages: u64) -> Self {
        Self {
            page: page as i64,
            page_size: page_size as i64,
            total: total as i64,
            total_pages: total_pages as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_clamps() {
        assert_eq!(PaginationQuery::normalized(None, None), (1, 10));
        assert_eq!(PaginationQuery::normalized(Some(0), Some(1000)), (1, 100));
        assert_eq!(PaginationQuery::normalized(Some(-3), Some(0)), (1, 1));
        assert_eq!(PaginationQuery::normalized(Some(4), Some(25)), (4, 25));
    }

    #[test]
    fn test_extreme_page_does_not_overflow() {
        let (page, size) = PaginationQuery::normalized(Some(i64::MAX), Some(100));
        assert_eq!(page, MAX_PAGE as u64);
        assert_eq!(PaginationQuery::offset(page, size), 99_999_900);

        assert_eq!(PaginationQuery::offset(u64::MAX, 100), u64::MAX);
        assert_eq!(PaginationQuery::offset(0, 10), 0);

        let items: Vec<i32> = (1..=25).collect();
        assert_eq!(paginate_in_memory(items.clone(), 3, 10), vec![21, 22, 23, 24, 25]);
        assert!(paginate_in_memory(items.clone(), page, size).is_empty());
        assert!(paginate_in_memory(items, u64::MAX, u64::MAX).is_empty());
    }

    #[test]
    fn test_query_accepts_string_numbers() {
        let query: PaginationQuery = serde_json::from_str(r#"{"page":"2","size":20}"#).unwrap();
        assert_eq!(query.page, 2);
        assert_eq!(query.size, 20);

        let query: PaginationQuery = serde_json::from_str("{}").unwrap();
        assert_eq!((query.page, query.size), (1, 10));
    }
}
