//! 预导入模块，方便使用

pub use super::progress_entries::{
    ActiveModel as ProgressEntryActiveModel, Entity as ProgressEntries,
    Model as ProgressEntryModel,
};
pub use super::students::{
    ActiveModel as StudentActiveModel, Entity as Students, Model as StudentModel,
};
pub use super::teachers::{
    ActiveModel as TeacherActiveModel, Entity as Teachers, Model as TeacherModel,
};
pub use super::teaching_plans::{
    ActiveModel as TeachingPlanActiveModel, Entity as TeachingPlans, Model as TeachingPlanModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
