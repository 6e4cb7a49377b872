use serde::Serialize;
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::assignment::{AssignmentRejection, PersistReport, SessionState};
use crate::models::common::ClassLevel;

// 分配页面中的学生
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct AssignmentStudent {
    pub id: i64,
    pub name: String,
    pub class_level: ClassLevel,
    pub teacher_id: Option<i64>,
}

// 分配页面中的教师
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct AssignmentTeacher {
    pub id: i64,
    pub name: String,
    pub class_levels: Vec<ClassLevel>,
}

// 分配页面初始数据
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct AssignmentSnapshotResponse {
    pub students: Vec<AssignmentStudent>,
    pub teachers: Vec<AssignmentTeacher>,
    /// 每个班级可选的教师 ID（升序）
    pub eligible_teachers: BTreeMap<ClassLevel, Vec<i64>>,
}

// 批量分配的最终状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub enum ReconcileState {
    SavedClean,
    SavedWithErrors,
    /// 没有任何改动，未写存储
    Unchanged,
}

impl ReconcileState {
    pub fn from_session(state: SessionState) -> Self {
        match state {
            SessionState::SavedClean => ReconcileState::SavedClean,
            SessionState::SavedWithErrors => ReconcileState::SavedWithErrors,
            _ => ReconcileState::Unchanged,
        }
    }
}

// 批量分配结果
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct ReconcileResponse {
    pub state: ReconcileState,
    pub report: PersistReport,
}

// 分配校验失败
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct ReconcileRejectedResponse {
    pub violations: Vec<AssignmentRejection>,
}
