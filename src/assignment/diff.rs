use super::{AssignmentChange, AssignmentMap};

/// 计算最小变更集
///
/// 只包含拟定值与初始值不同的学生（含分配与取消分配），按学生 ID 升序。
/// 不在 `proposed` 中的学生视为未变化，不在 `seed` 中的学生按"未分配"比较。
pub fn compute_diff(seed: &AssignmentMap, proposed: &AssignmentMap) -> Vec<AssignmentChange> {
    proposed
        .iter()
        .filter(|(id, teacher)| seed.get(*id).copied().flatten() != **teacher)
        .map(|(id, teacher)| AssignmentChange {
            student_id: *id,
            teacher_id: *teacher,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(i64, Option<i64>)]) -> AssignmentMap {
        pairs.iter().copied().collect()
    }

    fn change(student_id: i64, teacher_id: Option<i64>) -> AssignmentChange {
        AssignmentChange {
            student_id,
            teacher_id,
        }
    }

    #[test]
    fn test_identical_maps_produce_no_changes() {
        let seed = map(&[(1, Some(1)), (2, None), (3, Some(2))]);
        assert!(compute_diff(&seed, &seed).is_empty());
    }

    #[test]
    fn test_reassign_and_assign_from_unassigned() {
        let seed = map(&[(1, Some(1)), (2, None)]);
        let proposed = map(&[(1, Some(2)), (2, Some(1))]);

        assert_eq!(
            compute_diff(&seed, &proposed),
            vec![change(1, Some(2)), change(2, Some(1))]
        );
    }

    #[test]
    fn test_unassign_is_a_change() {
        let seed = map(&[(5, Some(3))]);
        let proposed = map(&[(5, None)]);

        assert_eq!(compute_diff(&seed, &proposed), vec![change(5, None)]);
    }

    #[test]
    fn test_missing_keys() {
        let seed = map(&[(1, Some(1)), (2, Some(2))]);
        // 学生 2 不在拟定映射中：视为未变化
        // 学生 3、4 不在初始映射中：按未分配比较
        let proposed = map(&[(1, Some(1)), (3, Some(7)), (4, None)]);

        assert_eq!(compute_diff(&seed, &proposed), vec![change(3, Some(7))]);
    }

    #[test]
    fn test_diff_is_exactly_the_differing_keys() {
        let seed = map(&[(9, Some(1)), (1, None), (4, Some(2)), (6, Some(3)), (2, None)]);
        let proposed = map(&[(9, None), (1, None), (4, Some(3)), (6, Some(3)), (2, Some(2))]);

        let diff = compute_diff(&seed, &proposed);
        let ids: Vec<i64> = diff.iter().map(|c| c.student_id).collect();
        assert_eq!(ids, vec![2, 4, 9]);

        for (id, teacher) in &proposed {
            let differs = seed.get(id).copied().flatten() != *teacher;
            assert_eq!(diff.iter().any(|c| c.student_id == *id), differs);
        }
    }
}
