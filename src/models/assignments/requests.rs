use serde::Deserialize;
use ts_rs::TS;

// 单条拟定分配，teacher_id 为 null 表示取消分配
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct ProposedAssignment {
    pub student_id: i64,
    pub teacher_id: Option<i64>,
}

// 批量分配保存请求，未列出的学生保持不变
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct ReconcileRequest {
    pub assignments: Vec<ProposedAssignment>,
}
