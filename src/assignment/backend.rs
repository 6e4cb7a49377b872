use async_trait::async_trait;
use std::sync::Arc;
use tracing::error;

use super::{AssignmentBackend, AssignmentError, AssignmentSnapshot, StudentId, TeacherId};
use crate::errors::{PreschoolError, Result};
use crate::storage::Storage;

/// 基于 [`Storage`] 的写回端
pub struct StorageAssignmentBackend {
    storage: Arc<dyn Storage>,
}

impl StorageAssignmentBackend {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl AssignmentBackend for StorageAssignmentBackend {
    async fn set_student_teacher(
        &self,
        student_id: StudentId,
        teacher_id: Option<TeacherId>,
    ) -> Result<()> {
        if self
            .storage
            .set_student_teacher(student_id, teacher_id)
            .await?
        {
            Ok(())
        } else {
            Err(PreschoolError::not_found(format!(
                "学生 {student_id} 不存在"
            )))
        }
    }
}

/// 读取全部学生与教师
pub async fn load_snapshot(
    storage: &dyn Storage,
) -> std::result::Result<AssignmentSnapshot, AssignmentError> {
    let students = storage.list_all_students().await.map_err(|e| {
        error!("Failed to load students for assignment: {}", e);
        AssignmentError::Load(e.to_string())
    })?;
    let teachers = storage.list_all_teachers().await.map_err(|e| {
        error!("Failed to load teachers for assignment: {}", e);
        AssignmentError::Load(e.to_string())
    })?;

    Ok(AssignmentSnapshot { students, teachers })
}
