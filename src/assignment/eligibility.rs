use std::collections::HashMap;

use super::TeacherId;
use crate::models::common::ClassLevel;
use crate::models::teachers::entities::Teacher;

/// 班级位掩码，每个 ClassLevel 占一位
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct LevelMask(u8);

impl LevelMask {
    fn bit(level: ClassLevel) -> u8 {
        match level {
            ClassLevel::Nursery => 0b001,
            ClassLevel::Lkg => 0b010,
            ClassLevel::Ukg => 0b100,
        }
    }

    fn insert(&mut self, level: ClassLevel) {
        self.0 |= Self::bit(level);
    }

    fn contains(self, level: ClassLevel) -> bool {
        self.0 & Self::bit(level) != 0
    }
}

/// 教师任教资格索引
///
/// 构建时拷贝每位教师的班级集合，之后对教师资料的修改不会影响已构建的索引。
/// 未知教师、班级集合为空的教师对任何班级都不具备资格。
#[derive(Debug, Clone, Default)]
pub struct EligibilityIndex {
    levels: HashMap<TeacherId, LevelMask>,
}

impl EligibilityIndex {
    pub fn build(teachers: &[Teacher]) -> Self {
        let mut levels = HashMap::with_capacity(teachers.len());
        for teacher in teachers {
            let mut mask = LevelMask::default();
            for level in &teacher.class_levels {
                mask.insert(*level);
            }
            levels.insert(teacher.id, mask);
        }
        Self { levels }
    }

    pub fn is_eligible(&self, teacher_id: TeacherId, level: ClassLevel) -> bool {
        self.levels
            .get(&teacher_id)
            .is_some_and(|mask| mask.contains(level))
    }

    /// 可带该班级的教师，按 ID 升序
    pub fn eligible_teachers(&self, level: ClassLevel) -> Vec<TeacherId> {
        let mut ids: Vec<TeacherId> = self
            .levels
            .iter()
            .filter(|(_, mask)| mask.contains(level))
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn contains_teacher(&self, teacher_id: TeacherId) -> bool {
        self.levels.contains_key(&teacher_id)
    }

    pub fn teacher_count(&self) -> usize {
        self.levels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::fixtures::teacher;

    #[test]
    fn test_membership_matches_teacher_levels() {
        let index = EligibilityIndex::build(&[
            teacher(1, &[ClassLevel::Nursery, ClassLevel::Lkg]),
            teacher(2, &[ClassLevel::Ukg]),
        ]);

        for &level in ClassLevel::ALL {
            assert_eq!(
                index.is_eligible(1, level),
                matches!(level, ClassLevel::Nursery | ClassLevel::Lkg)
            );
            assert_eq!(index.is_eligible(2, level), level == ClassLevel::Ukg);
        }
    }

    #[test]
    fn test_empty_set_and_unknown_teacher_are_ineligible() {
        let index = EligibilityIndex::build(&[teacher(7, &[])]);

        assert!(index.contains_teacher(7));
        for &level in ClassLevel::ALL {
            assert!(!index.is_eligible(7, level));
            assert!(!index.is_eligible(99, level));
        }
    }

    #[test]
    fn test_eligible_teachers_sorted() {
        let index = EligibilityIndex::build(&[
            teacher(30, &[ClassLevel::Lkg]),
            teacher(4, &[ClassLevel::Lkg, ClassLevel::Ukg]),
            teacher(12, &[ClassLevel::Lkg]),
            teacher(8, &[ClassLevel::Nursery]),
        ]);

        assert_eq!(index.eligible_teachers(ClassLevel::Lkg), vec![4, 12, 30]);
        assert_eq!(index.eligible_teachers(ClassLevel::Ukg), vec![4]);
        assert_eq!(index.eligible_teachers(ClassLevel::Nursery), vec![8]);
        assert_eq!(index.teacher_count(), 4);
    }

    #[test]
    fn test_index_is_a_snapshot() {
        let mut t = teacher(1, &[ClassLevel::Lkg]);
        let index = EligibilityIndex::build(std::slice::from_ref(&t));

        t.class_levels.clear();
        assert!(index.is_eligible(1, ClassLevel::Lkg));
    }
}
