use std::collections::BTreeMap;

use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::entity::{format_date, progress_entries, students, teaching_plans};
use crate::errors::{PreschoolError, Result};
use crate::models::{
    common::ClassLevel,
    dashboard::responses::{DashboardStatsResponse, TeacherLoad},
    plans::entities::PlanStatus,
    progress::entities::ProgressArea,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect};

/// 成长记录统计窗口
const RECENT_DAYS: i64 = 30;

fn db_err(what: &str) -> impl FnOnce(sea_orm::DbErr) -> PreschoolError + '_ {
    move |e| PreschoolError::database_operation(format!("{what}失败: {e}"))
}

impl SeaOrmStorage {
    pub async fn get_dashboard_stats_impl(&self) -> Result<DashboardStatsResponse> {
        let total_students = Students::find()
            .count(&self.db)
            .await
            .map_err(db_err("统计学生数量"))?;
        let total_teachers = Teachers::find()
            .count(&self.db)
            .await
            .map_err(db_err("统计教师数量"))?;
        let unassigned_students = Students::find()
            .filter(students::Column::TeacherId.is_null())
            .count(&self.db)
            .await
            .map_err(db_err("统计未分配学生"))?;

        let mut students_per_class_level = BTreeMap::new();
        for level in ClassLevel::ALL {
            let count = Students::find()
                .filter(students::Column::ClassLevel.eq(level.as_str()))
                .count(&self.db)
                .await
                .map_err(db_err("统计班级人数"))?;
            students_per_class_level.insert(*level, count as i64);
        }

        // 每位教师名下的学生数
        let counts: BTreeMap<i64, i64> = Students::find()
            .select_only()
            .column(students::Column::TeacherId)
            .column_as(students::Column::Id.count(), "student_count")
            .filter(students::Column::TeacherId.is_not_null())
            .group_by(students::Column::TeacherId)
            .into_tuple::<(Option<i64>, i64)>()
            .all(&self.db)
            .await
            .map_err(db_err("统计教师带班人数"))?
            .into_iter()
            .filter_map(|(teacher_id, count)| teacher_id.map(|id| (id, count)))
            .collect();

        let teacher_loads = self
            .list_all_teachers_impl()
            .await?
            .into_iter()
            .map(|t| TeacherLoad {
                student_count: counts.get(&t.id).copied().unwrap_or(0),
                teacher_id: t.id,
                name: t.name,
            })
            .collect();

        let since = chrono::Utc::now().date_naive() - chrono::Duration::days(RECENT_DAYS);
        let recent_progress_entries = ProgressEntries::find()
            .filter(progress_entries::Column::RecordedOn.gte(format_date(since)))
            .count(&self.db)
            .await
            .map_err(db_err("统计成长记录"))?;

        // 按 (领域, 分值) 分组计数，结果行数与记录总数无关
        let ratings = ProgressEntries::find()
            .select_only()
            .column(progress_entries::Column::Area)
            .column(progress_entries::Column::Rating)
            .column_as(progress_entries::Column::Id.count(), "entry_count")
            .group_by(progress_entries::Column::Area)
            .group_by(progress_entries::Column::Rating)
            .into_tuple::<(String, i32, i64)>()
            .all(&self.db)
            .await
            .map_err(db_err("统计评分分布"))?;

        let published_plans = TeachingPlans::find()
            .filter(teaching_plans::Column::Status.eq(PlanStatus::Published.as_str()))
            .count(&self.db)
            .await
            .map_err(db_err("统计教学计划"))?;

        Ok(DashboardStatsResponse {
            total_students: total_students as i64,
            total_teachers: total_teachers as i64,
            unassigned_students: unassigned_students as i64,
            students_per_class_level,
            teacher_loads,
            recent_progress_entries: recent_progress_entries as i64,
            average_rating_by_area: average_by_area(&ratings),
            published_plans: published_plans as i64,
            generated_at: chrono::Utc::now(),
        })
    }
}

/// 由 (领域, 分值, 条数) 分布求各领域平均分，保留两位小数；无法识别的领域忽略
fn average_by_area(distribution: &[(String, i32, i64)]) -> BTreeMap<ProgressArea, f64> {
    let mut sums: BTreeMap<ProgressArea, (i64, i64)> = BTreeMap::new();
    for (area, rating, count) in distribution {
        if *count > 0
            && let Ok(area) = area.parse::<ProgressArea>()
        {
            let entry = sums.entry(area).or_default();
            entry.0 += i64::from(*rating) * count;
            entry.1 += count;
        }
    }

    sums.into_iter()
        .map(|(area, (sum, count))| {
            let avg = sum as f64 / count as f64;
            (area, (avg * 100.0).round() / 100.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_by_area() {
        let ratings = vec![
            ("literacy".to_string(), 4, 1),
            ("literacy".to_string(), 5, 1),
            ("numeracy".to_string(), 2, 1),
            ("numeracy".to_string(), 3, 2),
            ("cooking".to_string(), 1, 7),
            ("social".to_string(), 5, 0),
        ];

        let averages = average_by_area(&ratings);
        assert_eq!(averages.len(), 2);
        assert_eq!(averages[&ProgressArea::Literacy], 4.5);
        assert_eq!(averages[&ProgressArea::Numeracy], 2.67);
    }
}
