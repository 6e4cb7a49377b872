use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::AiConfig;
use crate::errors::{PreschoolError, Result};
use crate::models::suggestions::requests::ActivitySuggestionRequest;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: String,
}

const SYSTEM_PROMPT: &str = "You are an experienced pre-primary teacher. \
Reply with short classroom activities, one per line, without numbering or commentary.";

pub fn build_prompt(req: &ActivitySuggestionRequest, count: usize) -> String {
    let ability = req
        .learning_ability
        .map(|a| format!(" The children are {a} learners."))
        .unwrap_or_default();
    format!(
        "Suggest {count} activities for the {} class focusing on {}.{ability} \
         Give one activity per line.",
        req.class_level,
        req.area.as_str().replace('_', " ")
    )
}

/// 去掉列表符号、编号和空行，最多保留 count 条
pub fn parse_activities(reply: &str, count: usize) -> Vec<String> {
    reply
        .lines()
        .map(|line| {
            let line = line.trim();
            let line = line.trim_start_matches(['-', '*', '•']).trim_start();
            let digits = line.chars().take_while(char::is_ascii_digit).count();
            let rest = &line[digits..];
            if digits > 0 && (rest.starts_with('.') || rest.starts_with(')')) {
                rest[1..].trim().to_string()
            } else {
                line.to_string()
            }
        })
        .filter(|line| !line.is_empty())
        .take(count)
        .collect()
}

/// chat-completions 客户端，连接池随实例复用
pub struct CompletionClient {
    http_client: reqwest::Client,
    config: AiConfig,
}

impl CompletionClient {
    pub fn new(config: &AiConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PreschoolError::upstream(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            config: config.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.7,
        };

        let response = self
            .http_client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PreschoolError::upstream(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PreschoolError::upstream(format!(
                "Suggestion service returned HTTP {status}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| PreschoolError::upstream(format!("Malformed reply: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| PreschoolError::upstream("Reply contained no choices"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::ClassLevel;
    use crate::models::progress::entities::ProgressArea;
    use crate::models::students::entities::LearningAbility;

    #[test]
    fn test_parse_strips_bullets_and_numbers() {
        let reply = "1. Leaf rubbing\n\n- Bead threading\n* Clay snakes\n3) Sand tray tracing\n  • Puzzle pairs  \n";
        assert_eq!(
            parse_activities(reply, 10),
            vec![
                "Leaf rubbing",
                "Bead threading",
                "Clay snakes",
                "Sand tray tracing",
                "Puzzle pairs"
            ]
        );
    }

    #[test]
    fn test_parse_caps_count_and_keeps_plain_numbers() {
        let reply = "10 green bottles song\nCounting beans\nShape hunt";
        assert_eq!(
            parse_activities(reply, 2),
            vec!["10 green bottles song", "Counting beans"]
        );
    }

    #[test]
    fn test_prompt_mentions_level_and_area() {
        let req = ActivitySuggestionRequest {
            class_level: ClassLevel::Ukg,
            area: ProgressArea::MotorSkills,
            learning_ability: Some(LearningAbility::Slow),
            count: None,
        };
        let prompt = build_prompt(&req, req.effective_count());
        assert!(prompt.starts_with("Suggest 5 activities for the ukg class focusing on motor skills."));
        assert!(prompt.contains("slow learners"));
    }

    #[test]
    fn test_client_keeps_config() {
        let config = AiConfig {
            endpoint: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            api_key: "key".to_string(),
            model: "local-model".to_string(),
            timeout_secs: 3,
        };
        let client = CompletionClient::new(&config).unwrap();
        assert_eq!(client.model(), "local-model");
    }
}
