//! 师生分配核对
//!
//! 批量编辑"学生 → 负责教师"映射，并只把有变化的条目写回存储：
//!
//! - [`EligibilityIndex`]：教师可任教班级的索引，O(1) 判断能否带某班学生
//! - [`AssignmentStore`]：编辑期间的拟定映射，边界处校验班级资格
//! - [`compute_diff`]：对比初始映射与拟定映射，得到最小变更集
//! - [`Persister`]：逐条顺序写回，单条失败不影响后续条目
//! - [`AssignmentSession`]：把以上组件串成 `Loaded → Editing → Saving → Saved*` 的编辑会话

pub mod backend;
pub mod diff;
pub mod eligibility;
pub mod persister;
pub mod session;
pub mod store;

pub use backend::{StorageAssignmentBackend, load_snapshot};
pub use diff::compute_diff;
pub use eligibility::EligibilityIndex;
pub use persister::{AssignmentBackend, ItemOutcome, ItemResult, PersistReport, Persister};
pub use session::{AssignmentSession, AssignmentSnapshot, SessionState};
pub use store::AssignmentStore;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use ts_rs::TS;

use crate::models::common::ClassLevel;

pub type StudentId = i64;
pub type TeacherId = i64;

/// 学生 → 教师（None 为未分配），按学生 ID 升序
pub type AssignmentMap = BTreeMap<StudentId, Option<TeacherId>>;

/// 一条待写回的分配变更
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct AssignmentChange {
    pub student_id: StudentId,
    pub teacher_id: Option<TeacherId>,
}

/// 分配被拒绝的原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub enum AssignmentRejection {
    NotInitialized,
    AlreadyInitialized,
    UnknownStudent {
        student_id: StudentId,
    },
    Ineligible {
        student_id: StudentId,
        teacher_id: TeacherId,
        class_level: ClassLevel,
    },
    InvalidState {
        state: SessionState,
    },
}

impl fmt::Display for AssignmentRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentRejection::NotInitialized => write!(f, "assignment store is not initialized"),
            AssignmentRejection::AlreadyInitialized => {
                write!(f, "assignment store is already initialized")
            }
            AssignmentRejection::UnknownStudent { student_id } => {
                write!(f, "student {student_id} is not part of this session")
            }
            AssignmentRejection::Ineligible {
                student_id,
                teacher_id,
                class_level,
            } => write!(
                f,
                "teacher {teacher_id} cannot take student {student_id} in class level {class_level}"
            ),
            AssignmentRejection::InvalidState { state } => {
                write!(f, "operation not allowed in session state {state:?}")
            }
        }
    }
}

impl std::error::Error for AssignmentRejection {}

/// 会话开始前加载快照失败
#[derive(Debug)]
pub enum AssignmentError {
    Load(String),
}

impl fmt::Display for AssignmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentError::Load(reason) => write!(f, "failed to load assignment snapshot: {reason}"),
        }
    }
}

impl std::error::Error for AssignmentError {}

impl From<AssignmentError> for crate::errors::PreschoolError {
    fn from(err: AssignmentError) -> Self {
        crate::errors::PreschoolError::assignment(err.to_string())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::collections::BTreeSet;

    use crate::models::common::ClassLevel;
    use crate::models::students::entities::{LearningAbility, Student, WritingSpeed};
    use crate::models::teachers::entities::Teacher;

    pub fn teacher(id: i64, levels: &[ClassLevel]) -> Teacher {
        Teacher {
            id,
            name: format!("Teacher {id}"),
            email: None,
            phone: None,
            class_levels: levels.iter().copied().collect::<BTreeSet<_>>(),
            user_id: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    pub fn student(id: i64, level: ClassLevel, teacher_id: Option<i64>) -> Student {
        Student {
            id,
            name: format!("Student {id}"),
            age: 4,
            class_level: level,
            learning_ability: LearningAbility::Average,
            writing_speed: WritingSpeed::Average,
            photo_url: None,
            teacher_id,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }
}
