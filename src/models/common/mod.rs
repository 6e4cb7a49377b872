pub mod class_level;
pub mod pagination;
pub mod response;
pub mod string_enum;

pub use class_level::ClassLevel;
pub use pagination::{PaginationInfo, PaginationQuery};
pub use response::ApiResponse;
