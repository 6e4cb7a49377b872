//! 缓存层
//!
//! 以字符串形式缓存对象（JSON），后端通过插件注册表选择（moka / redis）。

pub mod object_cache;
pub mod register;
pub mod traits;

pub use traits::{CacheResult, ObjectCache, ObjectCacheExt};

/// 仪表盘统计缓存键，学生/教师/记录写入后需失效
pub const DASHBOARD_STATS_KEY: &str = "dashboard:stats";

/// 声明缓存插件，在程序加载时自动注册到插件表
#[macro_export]
macro_rules! declare_object_cache_plugin {
    ($name:literal, $ty:ty) => {
        #[ctor::ctor]
        unsafe fn __register_object_cache_plugin() {
            $crate::cache::register::register_object_cache_plugin(
                $name,
                std::sync::Arc::new(|| {
                    Box::pin(async {
                        let cache = <$ty>::new()
                            .map_err($crate::errors::PreschoolError::cache_connection)?;
                        Ok(Box::new(cache) as Box<dyn $crate::cache::ObjectCache>)
                    })
                }),
            );
        }
    };
}
