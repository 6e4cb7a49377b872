//! 数据模型定义
//!
//! 每个资源分为 entities（业务实体）、requests（请求参数）、responses（响应结构）。

pub mod assignments;
pub mod auth;
pub mod common;
pub mod dashboard;
pub mod plans;
pub mod progress;
pub mod students;
pub mod suggestions;
pub mod teachers;
pub mod users;

pub use common::{ApiResponse, PaginationInfo, PaginationQuery};

use ts_rs::TS;

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// API 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/api.ts")]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1xxx
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1002,
    NotFound = 1003,
    InternalServerError = 1004,
    RateLimitExceeded = 1005,
    ExportFailed = 1006,

    // 认证 2xxx
    AuthFailed = 2000,

    // 账号 3xxx
    UserNotFound = 3000,
    UserAlreadyExists = 3001,
    UserNameInvalid = 3002,
    UserEmailInvalid = 3003,
    UserPasswordInvalid = 3004,
    UserCreationFailed = 3005,
    UserUpdateFailed = 3006,
    UserDeleteFailed = 3007,
    CanNotDeleteCurrentUser = 3008,
    UserLinkedToTeacher = 3009,

    // 教师 4xxx
    TeacherNotFound = 4000,
    TeacherInvalid = 4001,

    // 学生 5xxx
    StudentNotFound = 5000,
    StudentInvalid = 5001,

    // 师生分配 6xxx
    AssignmentIneligible = 6000,
    AssignmentUnknownStudent = 6001,
    AssignmentLoadFailed = 6002,

    // 成长记录 7xxx
    ProgressNotFound = 7000,
    ProgressInvalid = 7001,
    ProgressPermissionDenied = 7002,

    // 教学计划 8xxx
    PlanNotFound = 8000,
    PlanInvalid = 8001,
    PlanPermissionDenied = 8002,

    // 活动建议 9xxx
    SuggestionsUnavailable = 9000,
    SuggestionsUpstreamFailed = 9001,
    SuggestionsInvalid = 9002,
}
