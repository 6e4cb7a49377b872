use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use preschool_records::assignment::{
    AssignmentBackend, AssignmentRejection, AssignmentSession, AssignmentSnapshot, ItemOutcome,
    SessionState,
};
use preschool_records::errors::{PreschoolError, Result};
use preschool_records::models::common::ClassLevel;
use preschool_records::models::students::entities::{LearningAbility, Student, WritingSpeed};
use preschool_records::models::teachers::entities::Teacher;

/// 内存中的学生表，可指定某些学生写入失败
struct Roster {
    levels: BTreeMap<i64, ClassLevel>,
    assignments: Mutex<BTreeMap<i64, Option<i64>>>,
    broken: HashSet<i64>,
}

impl Roster {
    fn new(rows: &[(i64, ClassLevel, Option<i64>)]) -> Self {
        Self {
            levels: rows.iter().map(|&(id, level, _)| (id, level)).collect(),
            assignments: Mutex::new(rows.iter().map(|&(id, _, t)| (id, t)).collect()),
            broken: HashSet::new(),
        }
    }

    fn students(&self) -> Vec<Student> {
        let assignments = self.assignments.lock().unwrap();
        self.levels
            .iter()
            .map(|(&id, &level)| Student {
                id,
                name: format!("Child {id}"),
                age: 4,
                class_level: level,
                learning_ability: LearningAbility::Average,
                writing_speed: WritingSpeed::Average,
                photo_url: None,
                teacher_id: assignments.get(&id).copied().flatten(),
                created_at: chrono::Utc::now(),
                updated_at: chrono::Utc::now(),
            })
            .collect()
    }

    fn snapshot(&self, teachers: &[Teacher]) -> AssignmentSnapshot {
        AssignmentSnapshot {
            students: self.students(),
            teachers: teachers.to_vec(),
        }
    }
}

#[async_trait]
impl AssignmentBackend for Roster {
    async fn set_student_teacher(&self, student_id: i64, teacher_id: Option<i64>) -> Result<()> {
        if self.broken.contains(&student_id) {
            return Err(PreschoolError::database_operation("disk full"));
        }
        self.assignments
            .lock()
            .unwrap()
            .insert(student_id, teacher_id);
        Ok(())
    }
}

fn teacher(id: i64, levels: &[ClassLevel]) -> Teacher {
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

const TIMEOUT: Duration = Duration::from_secs(1);

#[tokio::test]
async fn edit_save_and_reload_round_trip() {
    let teachers = vec![
        teacher(1, &[ClassLevel::Nursery, ClassLevel::Lkg]),
        teacher(2, &[ClassLevel::Lkg, ClassLevel::Ukg]),
    ];
    let roster = Roster::new(&[
        (10, ClassLevel::Nursery, None),
        (11, ClassLevel::Lkg, Some(1)),
        (12, ClassLevel::Ukg, Some(2)),
    ]);

    let mut session = AssignmentSession::load(&roster.snapshot(&teachers)).unwrap();
    assert_eq!(session.state(), SessionState::Loaded);
    assert!(!session.has_changes());

    session.propose(10, Some(1)).unwrap();
    session.propose(11, Some(2)).unwrap();
    // 改回原值不产生差异
    session.propose(12, Some(2)).unwrap();
    assert_eq!(session.pending_changes().len(), 2);

    let report = session
        .save(&roster, TIMEOUT, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!((report.succeeded, report.failed, report.skipped), (2, 0, 0));
    assert_eq!(session.state(), SessionState::SavedClean);

    session.reload(&roster.snapshot(&teachers)).unwrap();
    assert_eq!(session.state(), SessionState::Loaded);
    assert!(!session.has_changes());
    assert_eq!(session.store().seed().get(&10), Some(&Some(1)));
}

#[tokio::test]
async fn ineligible_proposals_never_reach_the_backend() {
    let teachers = vec![teacher(1, &[ClassLevel::Nursery])];
    let roster = Roster::new(&[(10, ClassLevel::Ukg, None)]);

    let mut session = AssignmentSession::load(&roster.snapshot(&teachers)).unwrap();
    let err = session.propose(10, Some(1)).unwrap_err();
    assert_eq!(
        err,
        AssignmentRejection::Ineligible {
            student_id: 10,
            teacher_id: 1,
            class_level: ClassLevel::Ukg,
        }
    );
    assert!(!session.has_changes());

    let report = session
        .save(&roster, TIMEOUT, &CancellationToken::new())
        .await
        .unwrap();
    assert!(report.is_empty());
    assert_eq!(roster.assignments.lock().unwrap()[&10], None);
}

#[tokio::test]
async fn partial_failure_keeps_going_and_leaves_failed_item_pending() {
    let teachers = vec![teacher(1, &[ClassLevel::Lkg])];
    let mut roster = Roster::new(&[
        (10, ClassLevel::Lkg, None),
        (11, ClassLevel::Lkg, None),
        (12, ClassLevel::Lkg, None),
    ]);
    roster.broken.insert(11);

    let mut session = AssignmentSession::load(&roster.snapshot(&teachers)).unwrap();
    for id in [10, 11, 12] {
        session.propose(id, Some(1)).unwrap();
    }

    let report = session
        .save(&roster, TIMEOUT, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(session.state(), SessionState::SavedWithErrors);
    assert_eq!((report.succeeded, report.failed), (2, 1));
    assert!(matches!(report.items[1].outcome, ItemOutcome::Failed { .. }));

    // 保存后必须先 reload 才能继续编辑
    assert!(matches!(
        session.propose(11, Some(1)),
        Err(AssignmentRejection::InvalidState { .. })
    ));

    session.reload(&roster.snapshot(&teachers)).unwrap();
    session.propose(11, Some(1)).unwrap();
    assert_eq!(session.pending_changes().len(), 1);
}

#[tokio::test]
async fn cancelled_batch_is_skipped_entirely() {
    let teachers = vec![teacher(1, &[ClassLevel::Nursery])];
    let roster = Roster::new(&[(10, ClassLevel::Nursery, None), (11, ClassLevel::Nursery, None)]);

    let mut session = AssignmentSession::load(&roster.snapshot(&teachers)).unwrap();
    session.propose(10, Some(1)).unwrap();
    session.propose(11, Some(1)).unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let report = session.save(&roster, TIMEOUT, &cancel).await.unwrap();

    assert_eq!(report.skipped, 2);
    assert_eq!(session.state(), SessionState::SavedWithErrors);
    assert!(roster.assignments.lock().unwrap().values().all(Option::is_none));
}
