use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::ClassLevel;
use crate::models::progress::entities::ProgressArea;
use crate::models::students::entities::LearningAbility;

/// 单次建议数量上限
pub const MAX_SUGGESTIONS: u8 = 10;

// 活动建议请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/suggestion.ts")]
pub struct ActivitySuggestionRequest {
    pub class_level: ClassLevel,
    pub area: ProgressArea,
    pub learning_ability: Option<LearningAbility>,
    pub count: Option<u8>,
}

impl ActivitySuggestionRequest {
    /// 实际请求数量，默认 5，范围 1..=10
    pub fn effective_count(&self) -> usize {
        self.count.unwrap_or(5).clamp(1, MAX_SUGGESTIONS) as usize
    }
}
