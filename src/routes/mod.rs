pub mod assignments;
pub mod auth;
pub mod dashboard;
pub mod plans;
pub mod progress;
pub mod students;
pub mod suggestions;
pub mod teachers;
pub mod users;

pub use assignments::configure_assignment_routes;
pub use auth::configure_auth_routes;
pub use dashboard::configure_dashboard_routes;
pub use plans::configure_plan_routes;
pub use progress::configure_progress_routes;
pub use students::configure_student_routes;
pub use suggestions::configure_suggestion_routes;
pub use teachers::configure_teacher_routes;
pub use users::configure_user_routes;

use actix_web::web;

/// 注册全部 API 路由
pub fn configure_api_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_auth_routes)
        .configure(configure_user_routes)
        .configure(configure_teacher_routes)
        .configure(configure_student_routes)
        .configure(configure_progress_routes)
        .configure(configure_plan_routes)
        .configure(configure_assignment_routes)
        .configure(configure_dashboard_routes)
        .configure(configure_suggestion_routes);
}
