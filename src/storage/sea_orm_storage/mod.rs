//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod dashboard;
mod plans;
mod progress;
mod students;
mod teachers;
mod users;

use crate::config::AppConfig;
use crate::errors::{PreschoolError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 按全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        Self::connect(&AppConfig::get().database.url).await
    }

    /// 连接指定数据库并执行迁移
    pub async fn connect(url: &str) -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM storage initialized, database: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| PreschoolError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| PreschoolError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| PreschoolError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(PreschoolError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    common::ClassLevel,
    dashboard::responses::DashboardStatsResponse,
    plans::{
        entities::TeachingPlan,
        requests::{CreatePlanRequest, PlanListQuery, UpdatePlanRequest},
        responses::PlanListResponse,
    },
    progress::{
        entities::ProgressEntry,
        requests::{CreateProgressRequest, ProgressListQuery, UpdateProgressRequest},
        responses::ProgressListResponse,
    },
    students::{
        entities::Student,
        requests::{CreateStudentRequest, StudentListQuery, UpdateStudentRequest},
        responses::StudentListResponse,
    },
    teachers::{
        entities::Teacher,
        requests::{CreateTeacherRequest, TeacherListQuery, UpdateTeacherRequest},
        responses::TeacherListResponse,
    },
    users::{
        entities::User,
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 教师模块
    async fn create_teacher(&self, teacher: CreateTeacherRequest) -> Result<Teacher> {
        self.create_teacher_impl(teacher).await
    }

    async fn get_teacher_by_id(&self, id: i64) -> Result<Option<Teacher>> {
        self.get_teacher_by_id_impl(id).await
    }

    async fn get_teacher_by_user_id(&self, user_id: i64) -> Result<Option<Teacher>> {
        self.get_teacher_by_user_id_impl(user_id).await
    }

    async fn list_teachers_with_pagination(
        &self,
        query: TeacherListQuery,
    ) -> Result<TeacherListResponse> {
        self.list_teachers_with_pagination_impl(query).await
    }

    async fn list_all_teachers(&self) -> Result<Vec<Teacher>> {
        self.list_all_teachers_impl().await
    }

    async fn update_teacher(
        &self,
        id: i64,
        update: UpdateTeacherRequest,
    ) -> Result<Option<Teacher>> {
        self.update_teacher_impl(id, update).await
    }

    async fn delete_teacher(&self, id: i64) -> Result<bool> {
        self.delete_teacher_impl(id).await
    }

    // 学生模块
    async fn create_student(&self, student: CreateStudentRequest) -> Result<Student> {
        self.create_student_impl(student).await
    }

    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>> {
        self.get_student_by_id_impl(id).await
    }

    async fn list_students_with_pagination(
        &self,
        query: StudentListQuery,
    ) -> Result<StudentListResponse> {
        self.list_students_with_pagination_impl(query).await
    }

    async fn list_all_students(&self) -> Result<Vec<Student>> {
        self.list_all_students_impl().await
    }

    async fn list_students_for_export(
        &self,
        class_level: Option<ClassLevel>,
        teacher_id: Option<i64>,
        limit: u64,
    ) -> Result<Vec<Student>> {
        self.list_students_for_export_impl(class_level, teacher_id, limit)
            .await
    }

    async fn update_student(
        &self,
        id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>> {
        self.update_student_impl(id, update).await
    }

    async fn set_student_teacher(&self, id: i64, teacher_id: Option<i64>) -> Result<bool> {
        self.set_student_teacher_impl(id, teacher_id).await
    }

    async fn delete_student(&self, id: i64) -> Result<bool> {
        self.delete_student_impl(id).await
    }

    // 成长记录模块
    async fn create_progress_entry(
        &self,
        teacher_id: i64,
        entry: CreateProgressRequest,
    ) -> Result<ProgressEntry> {
        self.create_progress_entry_impl(teacher_id, entry).await
    }

    async fn get_progress_entry_by_id(&self, id: i64) -> Result<Option<ProgressEntry>> {
        self.get_progress_entry_by_id_impl(id).await
    }

    async fn list_progress_with_pagination(
        &self,
        query: ProgressListQuery,
    ) -> Result<ProgressListResponse> {
        self.list_progress_with_pagination_impl(query).await
    }

    async fn list_progress_for_student(
        &self,
        student_id: i64,
        limit: u64,
    ) -> Result<Vec<ProgressEntry>> {
        self.list_progress_for_student_impl(student_id, limit).await
    }

    async fn update_progress_entry(
        &self,
        id: i64,
        update: UpdateProgressRequest,
    ) -> Result<Option<ProgressEntry>> {
        self.update_progress_entry_impl(id, update).await
    }

    async fn delete_progress_entry(&self, id: i64) -> Result<bool> {
        self.delete_progress_entry_impl(id).await
    }

    // 教学计划模块
    async fn create_plan(&self, teacher_id: i64, plan: CreatePlanRequest) -> Result<TeachingPlan> {
        self.create_plan_impl(teacher_id, plan).await
    }

    async fn get_plan_by_id(&self, id: i64) -> Result<Option<TeachingPlan>> {
        self.get_plan_by_id_impl(id).await
    }

    async fn list_plans_with_pagination(&self, query: PlanListQuery) -> Result<PlanListResponse> {
        self.list_plans_with_pagination_impl(query).await
    }

    async fn update_plan(
        &self,
        id: i64,
        update: UpdatePlanRequest,
    ) -> Result<Option<TeachingPlan>> {
        self.update_plan_impl(id, update).await
    }

    async fn delete_plan(&self, id: i64) -> Result<bool> {
        self.delete_plan_impl(id).await
    }

    // 统计模块
    async fn get_dashboard_stats(&self) -> Result<DashboardStatsResponse> {
        self.get_dashboard_stats_impl().await
    }
}

/// 测试用的临时 SQLite 数据库，每次调用一个新文件
#[cfg(test)]
pub(crate) async fn temp_storage() -> std::sync::Arc<dyn Storage> {
    use std::sync::atomic::{AtomicUsize, Ordering};
    static NEXT: AtomicUsize = AtomicUsize::new(0);

    let path = std::env::temp_dir().join(format!(
        "preschool-test-{}-{}.db",
        std::process::id(),
        NEXT.fetch_add(1, Ordering::Relaxed)
    ));
    let _ = std::fs::remove_file(&path);
    let storage = SeaOrmStorage::connect(&path.to_string_lossy())
        .await
        .unwrap();
    std::sync::Arc::new(storage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("preschool.db").unwrap(),
            "sqlite://preschool.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("sqlite://data/app.sqlite").unwrap(),
            "sqlite://data/app.sqlite"
        );
        assert!(SeaOrmStorage::build_database_url("postgres://u:p@localhost/db").is_ok());
        assert!(SeaOrmStorage::build_database_url("ftp://nowhere").is_err());
    }
}
