use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;
use ts_rs::TS;

use super::{
    AssignmentBackend, AssignmentChange, AssignmentRejection, AssignmentStore, EligibilityIndex,
    PersistReport, Persister, StudentId, TeacherId, compute_diff,
};
use crate::models::students::entities::Student;
use crate::models::teachers::entities::Teacher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub enum SessionState {
    Loaded,
    Editing,
    Saving,
    SavedClean,
    SavedWithErrors,
}

/// 一次编辑会话所需的数据
#[derive(Debug, Clone, Default)]
pub struct AssignmentSnapshot {
    pub students: Vec<Student>,
    pub teachers: Vec<Teacher>,
}

/// 分配编辑会话
///
/// 由单个请求独占，不在请求之间共享。保存后必须 [`reload`](Self::reload)
/// 才能继续编辑。
#[derive(Debug)]
pub struct AssignmentSession {
    index: EligibilityIndex,
    store: AssignmentStore,
    state: SessionState,
}

impl AssignmentSession {
    pub fn load(snapshot: &AssignmentSnapshot) -> Result<Self, AssignmentRejection> {
        let mut store = AssignmentStore::new();
        store.initialize(&snapshot.students)?;

        Ok(Self {
            index: EligibilityIndex::build(&snapshot.teachers),
            store,
            state: SessionState::Loaded,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn store(&self) -> &AssignmentStore {
        &self.store
    }

    pub fn propose(
        &mut self,
        student_id: StudentId,
        teacher_id: Option<TeacherId>,
    ) -> Result<(), AssignmentRejection> {
        match self.state {
            SessionState::Loaded | SessionState::Editing => {}
            state => return Err(AssignmentRejection::InvalidState { state }),
        }

        self.store.propose(&self.index, student_id, teacher_id)?;
        self.state = SessionState::Editing;
        Ok(())
    }

    pub fn has_changes(&self) -> bool {
        self.store.has_changes()
    }

    pub fn pending_changes(&self) -> Vec<AssignmentChange> {
        compute_diff(self.store.seed(), self.store.proposed())
    }

    /// 写回变更。没有改动时直接返回空报告，不访问存储端，状态不变。
    pub async fn save<B: AssignmentBackend + ?Sized>(
        &mut self,
        backend: &B,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<PersistReport, AssignmentRejection> {
        match self.state {
            SessionState::Loaded | SessionState::Editing => {}
            state => return Err(AssignmentRejection::InvalidState { state }),
        }

        if !self.has_changes() {
            return Ok(PersistReport::default());
        }

        let changes = self.pending_changes();
        self.state = SessionState::Saving;

        let report = Persister::new(backend, timeout)
            .apply_changes(&changes, cancel)
            .await;

        self.state = if report.is_clean() {
            SessionState::SavedClean
        } else {
            SessionState::SavedWithErrors
        };
        info!(
            "Assignment save finished: {} succeeded, {} failed, {} skipped",
            report.succeeded, report.failed, report.skipped
        );

        Ok(report)
    }

    /// 保存后以最新数据重新开始
    pub fn reload(&mut self, snapshot: &AssignmentSnapshot) -> Result<(), AssignmentRejection> {
        match self.state {
            SessionState::SavedClean | SessionState::SavedWithErrors => {}
            state => return Err(AssignmentRejection::InvalidState { state }),
        }

        self.store.dispose();
        self.store.initialize(&snapshot.students)?;
        self.index = EligibilityIndex::build(&snapshot.teachers);
        self.state = SessionState::Loaded;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::fixtures::{student, teacher};
    use crate::assignment::persister::tests::FakeBackend;
    use crate::assignment::{ItemOutcome, StorageAssignmentBackend};
    use crate::models::common::ClassLevel;
    use std::collections::HashSet;

    const TIMEOUT: Duration = Duration::from_secs(1);

    fn teachers() -> Vec<Teacher> {
        vec![
            teacher(1, &[ClassLevel::Lkg, ClassLevel::Ukg]),
            teacher(2, &[ClassLevel::Lkg]),
        ]
    }

    /// 以存储端当前数据构造快照
    fn snapshot_from(backend: &FakeBackend, levels: &[(i64, ClassLevel)]) -> AssignmentSnapshot {
        AssignmentSnapshot {
            students: levels
                .iter()
                .map(|&(id, level)| student(id, level, backend.current(id)))
                .collect(),
            teachers: teachers(),
        }
    }

    #[tokio::test]
    async fn test_reassign_and_assign_unassigned() {
        let backend = FakeBackend::with(&[(1, Some(1)), (2, None)]);
        let levels = [(1, ClassLevel::Lkg), (2, ClassLevel::Lkg)];
        let mut session = AssignmentSession::load(&snapshot_from(&backend, &levels)).unwrap();

        session.propose(1, Some(2)).unwrap();
        session.propose(2, Some(1)).unwrap();
        assert_eq!(session.state(), SessionState::Editing);
        assert_eq!(
            session.pending_changes(),
            vec![
                AssignmentChange {
                    student_id: 1,
                    teacher_id: Some(2)
                },
                AssignmentChange {
                    student_id: 2,
                    teacher_id: Some(1)
                },
            ]
        );

        let report = session
            .save(&backend, TIMEOUT, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(report.succeeded, 2);
        assert_eq!(session.state(), SessionState::SavedClean);

        // 重新加载后没有待保存的改动
        session.reload(&snapshot_from(&backend, &levels)).unwrap();
        assert_eq!(session.state(), SessionState::Loaded);
        assert!(!session.has_changes());
        assert_eq!(session.store().seed().get(&1), Some(&Some(2)));
    }

    #[tokio::test]
    async fn test_revert_is_net_no_op() {
        let backend = FakeBackend::with(&[(1, Some(1)), (2, None)]);
        let levels = [(1, ClassLevel::Lkg), (2, ClassLevel::Lkg)];
        let mut session = AssignmentSession::load(&snapshot_from(&backend, &levels)).unwrap();

        session.propose(1, Some(2)).unwrap();
        session.propose(1, Some(1)).unwrap();
        session.propose(2, Some(2)).unwrap();

        let changes = session.pending_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].student_id, 2);
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_failed_student_unchanged() {
        let backend = FakeBackend {
            failing: HashSet::from([2]),
            ..FakeBackend::with(&[(1, None), (2, Some(2)), (3, None)])
        };
        let levels = [
            (1, ClassLevel::Lkg),
            (2, ClassLevel::Lkg),
            (3, ClassLevel::Ukg),
        ];
        let mut session = AssignmentSession::load(&snapshot_from(&backend, &levels)).unwrap();

        session.propose(1, Some(2)).unwrap();
        session.propose(2, Some(1)).unwrap();
        session.propose(3, Some(1)).unwrap();

        let report = session
            .save(&backend, TIMEOUT, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!((report.succeeded, report.failed), (2, 1));
        assert_eq!(session.state(), SessionState::SavedWithErrors);

        session.reload(&snapshot_from(&backend, &levels)).unwrap();
        assert_eq!(session.store().seed().get(&2), Some(&Some(2)));
        assert_eq!(session.store().seed().get(&1), Some(&Some(2)));
        assert_eq!(session.store().seed().get(&3), Some(&Some(1)));
    }

    #[tokio::test]
    async fn test_save_without_changes_never_calls_backend() {
        let backend = FakeBackend::with(&[(1, Some(1))]);
        let levels = [(1, ClassLevel::Lkg)];
        let mut session = AssignmentSession::load(&snapshot_from(&backend, &levels)).unwrap();

        assert!(!session.has_changes());
        let report = session
            .save(&backend, TIMEOUT, &CancellationToken::new())
            .await
            .unwrap();

        assert!(report.is_empty());
        assert!(backend.calls().is_empty());
        assert_eq!(session.state(), SessionState::Loaded);
    }

    #[tokio::test]
    async fn test_propose_rejected_after_save_until_reload() {
        let backend = FakeBackend::with(&[(1, None)]);
        let levels = [(1, ClassLevel::Ukg)];
        let mut session = AssignmentSession::load(&snapshot_from(&backend, &levels)).unwrap();

        session.propose(1, Some(1)).unwrap();
        session
            .save(&backend, TIMEOUT, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            session.propose(1, None),
            Err(AssignmentRejection::InvalidState {
                state: SessionState::SavedClean
            })
        );
        assert!(
            session
                .save(&backend, TIMEOUT, &CancellationToken::new())
                .await
                .is_err()
        );

        session.reload(&snapshot_from(&backend, &levels)).unwrap();
        session.propose(1, None).unwrap();
        assert_eq!(session.state(), SessionState::Editing);
    }

    #[tokio::test]
    async fn test_reload_only_after_save() {
        let backend = FakeBackend::default();
        let snapshot = snapshot_from(&backend, &[(1, ClassLevel::Lkg)]);
        let mut session = AssignmentSession::load(&snapshot).unwrap();

        assert_eq!(
            session.reload(&snapshot),
            Err(AssignmentRejection::InvalidState {
                state: SessionState::Loaded
            })
        );
    }

    #[tokio::test]
    async fn test_ineligible_proposal_keeps_state() {
        let backend = FakeBackend::default();
        let snapshot = snapshot_from(&backend, &[(1, ClassLevel::Nursery)]);
        let mut session = AssignmentSession::load(&snapshot).unwrap();

        assert!(matches!(
            session.propose(1, Some(1)),
            Err(AssignmentRejection::Ineligible { .. })
        ));
        assert_eq!(session.state(), SessionState::Loaded);
        assert!(!session.has_changes());
    }

    #[tokio::test]
    async fn test_cancelled_save_reports_errors() {
        let backend = FakeBackend::with(&[(1, None)]);
        let levels = [(1, ClassLevel::Lkg)];
        let mut session = AssignmentSession::load(&snapshot_from(&backend, &levels)).unwrap();
        session.propose(1, Some(2)).unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let report = session.save(&backend, TIMEOUT, &cancel).await.unwrap();

        assert_eq!(report.items[0].outcome, ItemOutcome::Skipped);
        assert_eq!(session.state(), SessionState::SavedWithErrors);
        assert_eq!(backend.current(1), None);
    }

    #[test]
    fn test_storage_backend_is_object_safe() {
        fn assert_backend<B: AssignmentBackend + ?Sized>() {}
        assert_backend::<StorageAssignmentBackend>();
        assert_backend::<dyn AssignmentBackend>();
    }
}
