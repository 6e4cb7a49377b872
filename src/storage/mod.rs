use std::sync::Arc;

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

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 更新用户信息
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    // 删除用户
    async fn delete_user(&self, id: i64) -> Result<bool>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;

    /// 教师管理方法
    async fn create_teacher(&self, teacher: CreateTeacherRequest) -> Result<Teacher>;
    async fn get_teacher_by_id(&self, id: i64) -> Result<Option<Teacher>>;
    // 账号关联的教师档案
    async fn get_teacher_by_user_id(&self, user_id: i64) -> Result<Option<Teacher>>;
    async fn list_teachers_with_pagination(
        &self,
        query: TeacherListQuery,
    ) -> Result<TeacherListResponse>;
    // 全部教师，按 ID 升序
    async fn list_all_teachers(&self) -> Result<Vec<Teacher>>;
    async fn update_teacher(&self, id: i64, update: UpdateTeacherRequest)
    -> Result<Option<Teacher>>;
    async fn delete_teacher(&self, id: i64) -> Result<bool>;

    /// 学生管理方法
    async fn create_student(&self, student: CreateStudentRequest) -> Result<Student>;
    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>>;
    async fn list_students_with_pagination(
        &self,
        query: StudentListQuery,
    ) -> Result<StudentListResponse>;
    // 全部学生，按 ID 升序
    async fn list_all_students(&self) -> Result<Vec<Student>>;
    // 导出用，最多 limit 条
    async fn list_students_for_export(
        &self,
        class_level: Option<ClassLevel>,
        teacher_id: Option<i64>,
        limit: u64,
    ) -> Result<Vec<Student>>;
    async fn update_student(&self, id: i64, update: UpdateStudentRequest)
    -> Result<Option<Student>>;
    // 修改负责教师，学生不存在时返回 false；教师不可带该班级时返回 Assignment 错误
    async fn set_student_teacher(&self, id: i64, teacher_id: Option<i64>) -> Result<bool>;
    async fn delete_student(&self, id: i64) -> Result<bool>;

    /// 成长记录方法
    async fn create_progress_entry(
        &self,
        teacher_id: i64,
        entry: CreateProgressRequest,
    ) -> Result<ProgressEntry>;
    async fn get_progress_entry_by_id(&self, id: i64) -> Result<Option<ProgressEntry>>;
    async fn list_progress_with_pagination(
        &self,
        query: ProgressListQuery,
    ) -> Result<ProgressListResponse>;
    // 某个学生的记录，按日期升序，最多 limit 条
    async fn list_progress_for_student(
        &self,
        student_id: i64,
        limit: u64,
    ) -> Result<Vec<ProgressEntry>>;
    async fn update_progress_entry(
        &self,
        id: i64,
        update: UpdateProgressRequest,
    ) -> Result<Option<ProgressEntry>>;
    async fn delete_progress_entry(&self, id: i64) -> Result<bool>;

    /// 教学计划方法
    async fn create_plan(&self, teacher_id: i64, plan: CreatePlanRequest) -> Result<TeachingPlan>;
    async fn get_plan_by_id(&self, id: i64) -> Result<Option<TeachingPlan>>;
    async fn list_plans_with_pagination(&self, query: PlanListQuery) -> Result<PlanListResponse>;
    async fn update_plan(&self, id: i64, update: UpdatePlanRequest)
    -> Result<Option<TeachingPlan>>;
    async fn delete_plan(&self, id: i64) -> Result<bool>;

    /// 统计
    async fn get_dashboard_stats(&self) -> Result<DashboardStatsResponse>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
