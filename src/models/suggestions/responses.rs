use serde::Serialize;
use ts_rs::TS;

// 活动建议响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/suggestion.ts")]
pub struct ActivitySuggestionResponse {
    pub activities: Vec<String>,
    pub model: String,
}
