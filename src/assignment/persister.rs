use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use ts_rs::TS;

use super::{AssignmentChange, StudentId, TeacherId};
use crate::errors::Result;

/// 分配写回的存储端
#[async_trait]
pub trait AssignmentBackend: Send + Sync {
    async fn set_student_teacher(
        &self,
        student_id: StudentId,
        teacher_id: Option<TeacherId>,
    ) -> Result<()>;
}

/// 单条变更的写回结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(tag = "status", rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub enum ItemOutcome {
    Applied,
    Failed { reason: String },
    /// 批次被取消，未尝试
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct ItemResult {
    pub student_id: StudentId,
    pub teacher_id: Option<TeacherId>,
    pub outcome: ItemOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct PersistReport {
    pub items: Vec<ItemResult>,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl PersistReport {
    fn record(&mut self, change: &AssignmentChange, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Applied => self.succeeded += 1,
            ItemOutcome::Failed { .. } => self.failed += 1,
            ItemOutcome::Skipped => self.skipped += 1,
        }
        self.items.push(ItemResult {
            student_id: change.student_id,
            teacher_id: change.teacher_id,
            outcome,
        });
    }

    /// 没有失败也没有跳过
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// 顺序写回变更集
///
/// 每条变更等待完成后才发起下一条；单条失败或超时只记入报告，不中断批次。
pub struct Persister<'a, B: AssignmentBackend + ?Sized> {
    backend: &'a B,
    timeout: Duration,
}

impl<'a, B: AssignmentBackend + ?Sized> Persister<'a, B> {
    pub fn new(backend: &'a B, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub async fn apply_changes(
        &self,
        changes: &[AssignmentChange],
        cancel: &CancellationToken,
    ) -> PersistReport {
        let mut report = PersistReport::default();

        for change in changes {
            if cancel.is_cancelled() {
                report.record(change, ItemOutcome::Skipped);
                continue;
            }

            let update = tokio::time::timeout(
                self.timeout,
                self.backend
                    .set_student_teacher(change.student_id, change.teacher_id),
            );

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => ItemOutcome::Failed {
                    reason: "cancelled before the update completed".to_string(),
                },
                result = update => match result {
                    Ok(Ok(())) => ItemOutcome::Applied,
                    Ok(Err(e)) => ItemOutcome::Failed { reason: e.to_string() },
                    Err(_) => ItemOutcome::Failed {
                        reason: format!("timed out after {}ms", self.timeout.as_millis()),
                    },
                },
            };

            match &outcome {
                ItemOutcome::Applied => debug!(
                    "Student {} assigned to {:?}",
                    change.student_id, change.teacher_id
                ),
                ItemOutcome::Failed { reason } => warn!(
                    "Failed to assign student {} to {:?}: {}",
                    change.student_id, change.teacher_id, reason
                ),
                ItemOutcome::Skipped => {}
            }
            report.record(change, outcome);
        }

        report
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::errors::PreschoolError;
    use std::collections::{BTreeMap, HashSet};
    use std::sync::Mutex;

    /// 内存存储端，可指定失败、挂起的学生
    #[derive(Default)]
    pub struct FakeBackend {
        pub assignments: Mutex<BTreeMap<i64, Option<i64>>>,
        pub calls: Mutex<Vec<i64>>,
        pub failing: HashSet<i64>,
        pub hanging: HashSet<i64>,
    }

    impl FakeBackend {
        pub fn with(pairs: &[(i64, Option<i64>)]) -> Self {
            Self {
                assignments: Mutex::new(pairs.iter().copied().collect()),
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<i64> {
            self.calls.lock().unwrap().clone()
        }

        pub fn current(&self, student_id: i64) -> Option<i64> {
            self.assignments
                .lock()
                .unwrap()
                .get(&student_id)
                .copied()
                .flatten()
        }
    }

    #[async_trait]
    impl AssignmentBackend for FakeBackend {
        async fn set_student_teacher(
            &self,
            student_id: i64,
            teacher_id: Option<i64>,
        ) -> Result<()> {
            self.calls.lock().unwrap().push(student_id);
            if self.hanging.contains(&student_id) {
                std::future::pending::<()>().await;
            }
            if self.failing.contains(&student_id) {
                return Err(PreschoolError::database_operation("write rejected"));
            }
            self.assignments
                .lock()
                .unwrap()
                .insert(student_id, teacher_id);
            Ok(())
        }
    }

    fn changes(pairs: &[(i64, Option<i64>)]) -> Vec<AssignmentChange> {
        pairs
            .iter()
            .map(|&(student_id, teacher_id)| AssignmentChange {
                student_id,
                teacher_id,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_batch() {
        let backend = FakeBackend {
            failing: HashSet::from([2]),
            ..FakeBackend::with(&[(1, None), (2, Some(1)), (3, None)])
        };
        let persister = Persister::new(&backend, Duration::from_secs(1));

        let report = persister
            .apply_changes(
                &changes(&[(1, Some(1)), (2, Some(2)), (3, Some(1))]),
                &CancellationToken::new(),
            )
            .await;

        assert_eq!((report.succeeded, report.failed, report.skipped), (2, 1, 0));
        assert!(!report.is_clean());
        assert!(matches!(report.items[1].outcome, ItemOutcome::Failed { .. }));
        assert_eq!(backend.calls(), vec![1, 2, 3]);
        assert_eq!(backend.current(2), Some(1));
        assert_eq!(backend.current(3), Some(1));
    }

    #[tokio::test]
    async fn test_timeout_recorded_and_batch_continues() {
        let backend = FakeBackend {
            hanging: HashSet::from([1]),
            ..Default::default()
        };
        let persister = Persister::new(&backend, Duration::from_millis(20));

        let report = persister
            .apply_changes(&changes(&[(1, Some(1)), (2, None)]), &CancellationToken::new())
            .await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.succeeded, 1);
        match &report.items[0].outcome {
            ItemOutcome::Failed { reason } => assert!(reason.contains("timed out")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancelled_batch_skips_remaining() {
        let backend = FakeBackend::default();
        let persister = Persister::new(&backend, Duration::from_secs(1));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = persister
            .apply_changes(&changes(&[(1, Some(1)), (2, Some(1))]), &cancel)
            .await;

        assert_eq!(report.skipped, 2);
        assert!(report.items.iter().all(|i| i.outcome == ItemOutcome::Skipped));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_during_hanging_update() {
        let backend = FakeBackend {
            hanging: HashSet::from([1]),
            ..Default::default()
        };
        let persister = Persister::new(&backend, Duration::from_secs(30));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let report = persister
            .apply_changes(&changes(&[(1, Some(1)), (2, Some(1)), (3, None)]), &cancel)
            .await;

        assert_eq!((report.succeeded, report.failed, report.skipped), (0, 1, 2));
        assert_eq!(backend.calls(), vec![1]);
    }

    #[test]
    fn test_report_serializes_tagged_outcomes() {
        let mut report = PersistReport::default();
        report.record(
            &AssignmentChange {
                student_id: 1,
                teacher_id: None,
            },
            ItemOutcome::Failed {
                reason: "boom".into(),
            },
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["failed"], 1);
        assert_eq!(json["items"][0]["outcome"]["status"], "failed");
        assert_eq!(json["items"][0]["outcome"]["reason"], "boom");
    }
}
