use std::collections::HashMap;

use super::{AssignmentMap, AssignmentRejection, EligibilityIndex, StudentId, TeacherId};
use crate::models::common::ClassLevel;
use crate::models::students::entities::Student;

/// 编辑期间的分配映射
///
/// `seed` 是加载时的持久化状态，`proposed` 是当前拟定状态。
/// 纯内存结构，不访问存储。
#[derive(Debug, Default)]
pub struct AssignmentStore {
    seed: AssignmentMap,
    proposed: AssignmentMap,
    class_levels: HashMap<StudentId, ClassLevel>,
    initialized: bool,
}

impl AssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以学生当前的负责教师作为初始映射
    pub fn initialize(&mut self, students: &[Student]) -> Result<(), AssignmentRejection> {
        if self.initialized {
            return Err(AssignmentRejection::AlreadyInitialized);
        }

        for student in students {
            self.seed.insert(student.id, student.teacher_id);
            self.class_levels.insert(student.id, student.class_level);
        }
        self.proposed = self.seed.clone();
        self.initialized = true;
        Ok(())
    }

    pub fn dispose(&mut self) {
        self.seed.clear();
        self.proposed.clear();
        self.class_levels.clear();
        self.initialized = false;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// 拟定一条分配。被拒绝时映射保持不变。
    pub fn propose(
        &mut self,
        index: &EligibilityIndex,
        student_id: StudentId,
        teacher_id: Option<TeacherId>,
    ) -> Result<(), AssignmentRejection> {
        if !self.initialized {
            return Err(AssignmentRejection::NotInitialized);
        }

        let class_level = *self
            .class_levels
            .get(&student_id)
            .ok_or(AssignmentRejection::UnknownStudent { student_id })?;

        if let Some(teacher_id) = teacher_id
            && !index.is_eligible(teacher_id, class_level)
        {
            return Err(AssignmentRejection::Ineligible {
                student_id,
                teacher_id,
                class_level,
            });
        }

        self.proposed.insert(student_id, teacher_id);
        Ok(())
    }

    pub fn has_changes(&self) -> bool {
        self.proposed
            .iter()
            .any(|(id, teacher)| self.seed.get(id).copied().flatten() != *teacher)
    }

    pub fn seed(&self) -> &AssignmentMap {
        &self.seed
    }

    pub fn proposed(&self) -> &AssignmentMap {
        &self.proposed
    }

    pub fn class_level_of(&self, student_id: StudentId) -> Option<ClassLevel> {
        self.class_levels.get(&student_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::fixtures::{student, teacher};

    fn setup() -> (EligibilityIndex, AssignmentStore) {
        let index = EligibilityIndex::build(&[
            teacher(1, &[ClassLevel::Nursery, ClassLevel::Lkg]),
            teacher(2, &[ClassLevel::Lkg]),
            teacher(3, &[]),
        ]);
        let mut store = AssignmentStore::new();
        store
            .initialize(&[
                student(10, ClassLevel::Lkg, Some(1)),
                student(11, ClassLevel::Nursery, None),
            ])
            .unwrap();
        (index, store)
    }

    #[test]
    fn test_initialize_seeds_both_maps() {
        let (_, store) = setup();

        assert_eq!(store.seed(), store.proposed());
        assert_eq!(store.seed().get(&10), Some(&Some(1)));
        assert_eq!(store.seed().get(&11), Some(&None));
        assert_eq!(store.class_level_of(11), Some(ClassLevel::Nursery));
        assert!(!store.has_changes());
    }

    #[test]
    fn test_second_initialize_rejected_until_dispose() {
        let (_, mut store) = setup();

        assert_eq!(
            store.initialize(&[student(12, ClassLevel::Ukg, None)]),
            Err(AssignmentRejection::AlreadyInitialized)
        );
        assert!(store.seed().get(&12).is_none());

        store.dispose();
        assert!(!store.is_initialized());
        assert!(store.seed().is_empty());
        store
            .initialize(&[student(12, ClassLevel::Ukg, None)])
            .unwrap();
        assert_eq!(store.seed().len(), 1);
    }

    #[test]
    fn test_propose_before_initialize() {
        let index = EligibilityIndex::default();
        let mut store = AssignmentStore::new();

        assert_eq!(
            store.propose(&index, 10, None),
            Err(AssignmentRejection::NotInitialized)
        );
    }

    #[test]
    fn test_propose_stores_value_verbatim() {
        let (index, mut store) = setup();

        store.propose(&index, 10, Some(2)).unwrap();
        store.propose(&index, 11, Some(1)).unwrap();

        assert_eq!(store.proposed().get(&10), Some(&Some(2)));
        assert_eq!(store.proposed().get(&11), Some(&Some(1)));
        assert!(store.has_changes());

        store.propose(&index, 10, None).unwrap();
        assert_eq!(store.proposed().get(&10), Some(&None));
    }

    #[test]
    fn test_ineligible_proposal_leaves_store_untouched() {
        let (index, mut store) = setup();

        // 教师 2 只带 LKG，学生 11 在小班
        assert_eq!(
            store.propose(&index, 11, Some(2)),
            Err(AssignmentRejection::Ineligible {
                student_id: 11,
                teacher_id: 2,
                class_level: ClassLevel::Nursery,
            })
        );
        // 空集合教师与未知教师
        assert!(store.propose(&index, 10, Some(3)).is_err());
        assert!(store.propose(&index, 10, Some(99)).is_err());

        assert_eq!(store.proposed(), store.seed());
        assert!(!store.has_changes());
    }

    #[test]
    fn test_unknown_student_rejected() {
        let (index, mut store) = setup();

        assert_eq!(
            store.propose(&index, 404, Some(1)),
            Err(AssignmentRejection::UnknownStudent { student_id: 404 })
        );
        assert!(!store.proposed().contains_key(&404));
    }

    #[test]
    fn test_revert_clears_changes() {
        let (index, mut store) = setup();

        store.propose(&index, 10, Some(2)).unwrap();
        assert!(store.has_changes());
        store.propose(&index, 10, Some(1)).unwrap();
        assert!(!store.has_changes());
    }
}
