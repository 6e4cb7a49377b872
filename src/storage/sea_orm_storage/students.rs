use super::SeaOrmStorage;
use crate::entity::students::{ActiveModel, Column, Entity as Students};
use crate::entity::teachers::{Entity as Teachers, decode_class_levels};
use crate::errors::{PreschoolError, Result};
use crate::models::{
    PaginationInfo, PaginationQuery,
    common::ClassLevel,
    students::{
        entities::Student,
        requests::{CreateStudentRequest, StudentListQuery, UpdateStudentRequest},
        responses::StudentListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, sea_query::Expr,
};

impl SeaOrmStorage {
    pub async fn create_student_impl(&self, req: CreateStudentRequest) -> Result<Student> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            name: Set(req.name),
            age: Set(req.age),
            class_level: Set(req.class_level.to_string()),
            learning_ability: Set(req.learning_ability.to_string()),
            writing_speed: Set(req.writing_speed.to_string()),
            photo_url: Set(req.photo_url),
            teacher_id: Set(req.teacher_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("创建学生失败: {e}")))?;

        Ok(result.into_student())
    }

    pub async fn get_student_by_id_impl(&self, id: i64) -> Result<Option<Student>> {
        let result = Students::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("查询学生失败: {e}")))?;

        Ok(result.map(|m| m.into_student()))
    }

    pub async fn list_students_with_pagination_impl(
        &self,
        query: StudentListQuery,
    ) -> Result<StudentListResponse> {
        let (page, size) = PaginationQuery::normalized(query.page, query.size);

        let mut select = Students::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select.filter(Column::Name.contains(escape_like_pattern(search.trim())));
        }

        if let Some(level) = query.class_level {
            select = select.filter(Column::ClassLevel.eq(level.to_string()));
        }

        // unassigned 优先于 teacher_id
        if query.unassigned.unwrap_or(false) {
            select = select.filter(Column::TeacherId.is_null());
        } else if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }

        select = select.order_by_asc(Column::Name).order_by_asc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| PreschoolError::database_operation(format!("查询学生总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| PreschoolError::database_operation(format!("查询学生页数失败: {e}")))?;
        let students = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("查询学生列表失败: {e}")))?;

        Ok(StudentListResponse {
            items: students.into_iter().map(|m| m.into_student()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn list_all_students_impl(&self) -> Result<Vec<Student>> {
        let students = Students::find()
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("查询学生列表失败: {e}")))?;

        Ok(students.into_iter().map(|m| m.into_student()).collect())
    }

    pub async fn list_students_for_export_impl(
        &self,
        class_level: Option<ClassLevel>,
        teacher_id: Option<i64>,
        limit: u64,
    ) -> Result<Vec<Student>> {
        let mut select = Students::find();

        if let Some(level) = class_level {
            select = select.filter(Column::ClassLevel.eq(level.to_string()));
        }
        if let Some(teacher_id) = teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }

        let students = select
            .order_by_asc(Column::ClassLevel)
            .order_by_asc(Column::Name)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("查询导出学生失败: {e}")))?;

        Ok(students.into_iter().map(|m| m.into_student()).collect())
    }

    pub async fn update_student_impl(
        &self,
        id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>> {
        if self.get_student_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(age) = update.age {
            model.age = Set(age);
        }
        if let Some(level) = update.class_level {
            model.class_level = Set(level.to_string());
        }
        if let Some(ability) = update.learning_ability {
            model.learning_ability = Set(ability.to_string());
        }
        if let Some(speed) = update.writing_speed {
            model.writing_speed = Set(speed.to_string());
        }
        if let Some(photo_url) = update.photo_url {
            model.photo_url = Set(photo_url);
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("更新学生失败: {e}")))?;

        self.get_student_by_id_impl(id).await
    }

    /// 只写 teacher_id 一列，不影响其他字段
    ///
    /// 在同一事务中重新读取学生班级与教师可带班级，不可带时返回 `Assignment` 错误；
    /// 条件更新要求班级未变，期间被改过班级同样视为不可分配。
    pub async fn set_student_teacher_impl(&self, id: i64, teacher_id: Option<i64>) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PreschoolError::database_operation(format!("开启事务失败: {e}")))?;

        let Some(student) = Students::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("查询学生失败: {e}")))?
        else {
            return Ok(false);
        };

        if let Some(tid) = teacher_id {
            let teacher = Teachers::find_by_id(tid)
                .one(&txn)
                .await
                .map_err(|e| PreschoolError::database_operation(format!("查询教师失败: {e}")))?
                .ok_or_else(|| PreschoolError::not_found(format!("教师 {tid} 不存在")))?;

            let level: ClassLevel = student.class_level.parse().map_err(|_| {
                PreschoolError::validation(format!("无法识别的班级: {}", student.class_level))
            })?;
            if !decode_class_levels(&teacher.class_levels).contains(&level) {
                return Err(PreschoolError::assignment(format!(
                    "教师 {tid} 不能带 {level} 班"
                )));
            }
        }

        let result = Students::update_many()
            .col_expr(Column::TeacherId, Expr::value(teacher_id))
            .col_expr(
                Column::UpdatedAt,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::Id.eq(id))
            .filter(Column::ClassLevel.eq(student.class_level.as_str()))
            .exec(&txn)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("更新负责教师失败: {e}")))?;

        if result.rows_affected == 0 {
            return Err(PreschoolError::assignment(format!("学生 {id} 的班级已变更")));
        }

        txn.commit()
            .await
            .map_err(|e| PreschoolError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(true)
    }

    pub async fn delete_student_impl(&self, id: i64) -> Result<bool> {
        let result = Students::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| PreschoolError::database_operation(format!("删除学生失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::temp_storage;
    use crate::errors::PreschoolError;
    use crate::models::common::ClassLevel;
    use crate::models::students::entities::{LearningAbility, WritingSpeed};
    use crate::models::students::requests::{CreateStudentRequest, UpdateStudentRequest};
    use crate::models::teachers::requests::{CreateTeacherRequest, UpdateTeacherRequest};

    fn new_student(level: ClassLevel) -> CreateStudentRequest {
        CreateStudentRequest {
            name: "Asha".to_string(),
            age: 4,
            class_level: level,
            learning_ability: LearningAbility::Average,
            writing_speed: WritingSpeed::Average,
            photo_url: None,
            teacher_id: None,
        }
    }

    fn new_teacher(levels: &[ClassLevel]) -> CreateTeacherRequest {
        CreateTeacherRequest {
            name: "Ms. Rao".to_string(),
            email: None,
            phone: None,
            class_levels: levels.iter().copied().collect(),
            user_id: None,
        }
    }

    #[tokio::test]
    async fn test_set_teacher_rechecks_eligibility() {
        let storage = temp_storage().await;
        let teacher = storage
            .create_teacher(new_teacher(&[ClassLevel::Lkg]))
            .await
            .unwrap();
        let student = storage.create_student(new_student(ClassLevel::Lkg)).await.unwrap();

        assert!(storage.set_student_teacher(student.id, Some(teacher.id)).await.unwrap());

        // 教师改为只带大班之后再次分配
        storage
            .update_teacher(
                teacher.id,
                UpdateTeacherRequest {
                    name: None,
                    email: None,
                    phone: None,
                    class_levels: Some([ClassLevel::Ukg].into_iter().collect()),
                    user_id: None,
                },
            )
            .await
            .unwrap();
        storage.set_student_teacher(student.id, None).await.unwrap();

        let err = storage
            .set_student_teacher(student.id, Some(teacher.id))
            .await
            .unwrap_err();
        assert!(matches!(err, PreschoolError::Assignment(_)));

        let stored = storage.get_student_by_id(student.id).await.unwrap().unwrap();
        assert_eq!(stored.teacher_id, None);
    }

    #[tokio::test]
    async fn test_set_teacher_missing_rows() {
        let storage = temp_storage().await;
        let student = storage.create_student(new_student(ClassLevel::Nursery)).await.unwrap();

        assert!(!storage.set_student_teacher(999, None).await.unwrap());
        let err = storage
            .set_student_teacher(student.id, Some(999))
            .await
            .unwrap_err();
        assert!(matches!(err, PreschoolError::NotFound(_)));

        // 换班后只能分配给能带新班级的教师
        let teacher = storage
            .create_teacher(new_teacher(&[ClassLevel::Nursery]))
            .await
            .unwrap();
        storage
            .update_student(
                student.id,
                UpdateStudentRequest {
                    name: None,
                    age: None,
                    class_level: Some(ClassLevel::Ukg),
                    learning_ability: None,
                    writing_speed: None,
                    photo_url: None,
                },
            )
            .await
            .unwrap();
        assert!(matches!(
            storage.set_student_teacher(student.id, Some(teacher.id)).await,
            Err(PreschoolError::Assignment(_))
        ));
    }
}
