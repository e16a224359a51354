use std::time::Duration;

use db::types::Difficulty;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const FALLBACK_SUMMARY_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("no AI provider configured")]
    NotConfigured,
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned no completion")]
    EmptyCompletion,
    #[error("could not parse provider output: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtaskSuggestion {
    pub title: String,
    pub estimated_minutes: i32,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyPlan {
    pub overview: String,
    pub steps: Vec<String>,
    pub techniques: Vec<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Thin client over the OpenAI chat completions API. Fallible `try_*`
/// methods surface provider errors to callers that degrade gracefully;
/// the `*_or_fallback` variants never fail and hand back a canned result
/// when the provider is unavailable.
#[derive(Clone)]
pub struct AiService {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    model: String,
    timeout: Duration,
}

impl AiService {
    pub fn new(api_key: Option<SecretString>, model: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            timeout,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn chat(&self, system: &str, user: String) -> Result<String, AiError> {
        let api_key = self.api_key.as_ref().ok_or(AiError::NotConfigured)?;
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.7,
        };
        let response: ChatResponse = self
            .client
            .post(OPENAI_CHAT_URL)
            .bearer_auth(api_key.expose_secret())
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(AiError::EmptyCompletion)?;
        if content.trim().is_empty() {
            return Err(AiError::EmptyCompletion);
        }
        Ok(content)
    }

    pub async fn try_summarize(&self, text: &str, max_sentences: u8) -> Result<String, AiError> {
        let content = self
            .chat(
                "You are a study assistant. Summarize the given text clearly and concisely.",
                format!("Summarize the following in at most {max_sentences} sentences:\n\n{text}"),
            )
            .await?;
        Ok(content.trim().to_string())
    }

    pub async fn try_breakdown(
        &self,
        title: &str,
        description: Option<&str>,
        estimated_minutes: Option<i32>,
    ) -> Result<Vec<SubtaskSuggestion>, AiError> {
        let mut prompt = format!(
            "Break the task \"{title}\" into 3-5 concrete subtasks. Respond with a JSON array \
             of objects with fields: title, estimated_minutes (integer), difficulty \
             (easy|medium|hard), dependencies (array of subtask titles)."
        );
        if let Some(description) = description {
            prompt.push_str(&format!("\nTask description: {description}"));
        }
        if let Some(estimated) = estimated_minutes {
            prompt.push_str(&format!("\nTotal time available: {estimated} minutes."));
        }
        let content = self
            .chat("You are a study planning assistant. Respond with JSON only.", prompt)
            .await?;
        parse_json_payload(&content)
    }

    pub async fn try_quiz(&self, topic: &str, count: u8) -> Result<Vec<QuizQuestion>, AiError> {
        let content = self
            .chat(
                "You are a tutor writing practice quizzes. Respond with JSON only.",
                format!(
                    "Write {count} multiple-choice questions about \"{topic}\". Respond with a \
                     JSON array of objects with fields: question, options (array of 4 strings), \
                     answer (one of the options)."
                ),
            )
            .await?;
        parse_json_payload(&content)
    }

    pub async fn try_flashcards(&self, topic: &str, count: u8) -> Result<Vec<Flashcard>, AiError> {
        let content = self
            .chat(
                "You are a tutor writing flashcards. Respond with JSON only.",
                format!(
                    "Write {count} flashcards about \"{topic}\". Respond with a JSON array of \
                     objects with fields: front, back."
                ),
            )
            .await?;
        parse_json_payload(&content)
    }

    pub async fn try_study_plan(
        &self,
        goal: &str,
        available_hours_per_day: Option<f64>,
    ) -> Result<StudyPlan, AiError> {
        let mut prompt = format!(
            "Create a study plan for the goal \"{goal}\". Respond with a JSON object with \
             fields: overview (string), steps (array of strings), techniques (array of strings)."
        );
        if let Some(hours) = available_hours_per_day {
            prompt.push_str(&format!("\nThe student can study {hours} hours per day."));
        }
        let content = self
            .chat("You are a study planning assistant. Respond with JSON only.", prompt)
            .await?;
        parse_json_payload(&content)
    }

    pub async fn summarize_or_fallback(&self, text: &str, max_sentences: u8) -> String {
        match self.try_summarize(text, max_sentences).await {
            Ok(summary) => summary,
            Err(error) => {
                warn!(%error, "summarize fell back to truncation");
                fallback_summary(text)
            }
        }
    }

    pub async fn breakdown_or_fallback(
        &self,
        title: &str,
        description: Option<&str>,
        estimated_minutes: Option<i32>,
    ) -> Vec<SubtaskSuggestion> {
        match self.try_breakdown(title, description, estimated_minutes).await {
            Ok(subtasks) => subtasks,
            Err(error) => {
                warn!(%error, "breakdown fell back to generic subtasks");
                fallback_breakdown(title, estimated_minutes)
            }
        }
    }

    pub async fn quiz_or_fallback(&self, topic: &str, count: u8) -> Vec<QuizQuestion> {
        match self.try_quiz(topic, count).await {
            Ok(questions) => questions,
            Err(error) => {
                warn!(%error, "quiz fell back to a single generic question");
                vec![QuizQuestion {
                    question: format!("What is the main concept of {topic}?"),
                    options: vec![
                        "Review your notes to answer".to_string(),
                        "Not covered".to_string(),
                        "Unrelated".to_string(),
                        "None of the above".to_string(),
                    ],
                    answer: "Review your notes to answer".to_string(),
                }]
            }
        }
    }

    pub async fn flashcards_or_fallback(&self, topic: &str, count: u8) -> Vec<Flashcard> {
        match self.try_flashcards(topic, count).await {
            Ok(cards) => cards,
            Err(error) => {
                warn!(%error, "flashcards fell back to a single generic card");
                vec![Flashcard {
                    front: topic.to_string(),
                    back: format!("Review your notes on {topic}"),
                }]
            }
        }
    }

    pub async fn study_plan_or_fallback(
        &self,
        goal: &str,
        available_hours_per_day: Option<f64>,
    ) -> StudyPlan {
        match self.try_study_plan(goal, available_hours_per_day).await {
            Ok(plan) => plan,
            Err(error) => {
                warn!(%error, "study plan fell back to a generic plan");
                StudyPlan {
                    overview: format!("A simple plan for: {goal}"),
                    steps: vec![
                        format!("Collect materials for {goal}"),
                        format!("Study {goal} in focused sessions"),
                        format!("Review and self-test on {goal}"),
                    ],
                    techniques: vec![
                        "Pomodoro technique".to_string(),
                        "Active recall".to_string(),
                        "Spaced repetition".to_string(),
                    ],
                }
            }
        }
    }
}

fn fallback_summary(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= FALLBACK_SUMMARY_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(FALLBACK_SUMMARY_CHARS).collect();
    format!("{}...", cut.trim_end())
}

fn fallback_breakdown(title: &str, estimated_minutes: Option<i32>) -> Vec<SubtaskSuggestion> {
    let each = estimated_minutes.map(|total| (total / 2).max(5)).unwrap_or(30);
    vec![
        SubtaskSuggestion {
            title: format!("Research {title}"),
            estimated_minutes: each,
            difficulty: Difficulty::Easy,
            dependencies: Vec::new(),
        },
        SubtaskSuggestion {
            title: format!("Plan approach for {title}"),
            estimated_minutes: each,
            difficulty: Difficulty::Medium,
            dependencies: vec![format!("Research {title}")],
        },
    ]
}

/// Models wrap JSON in markdown fences or prose more often than not.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

fn parse_json_payload<T: DeserializeOwned>(raw: &str) -> Result<T, AiError> {
    let cleaned = strip_code_fences(raw);
    if let Ok(value) = serde_json::from_str(cleaned) {
        return Ok(value);
    }
    // Salvage the first JSON value embedded in surrounding prose.
    let start = cleaned.find(['[', '{']);
    let end = cleaned.rfind([']', '}']);
    if let (Some(start), Some(end)) = (start, end)
        && start < end
    {
        return serde_json::from_str(&cleaned[start..=end])
            .map_err(|e| AiError::Parse(e.to_string()));
    }
    Err(AiError::Parse("no JSON value in completion".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown_fences() {
        let raw = "```json\n[{\"front\": \"a\", \"back\": \"b\"}]\n```";
        let cards: Vec<Flashcard> = parse_json_payload(raw).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].front, "a");
    }

    #[test]
    fn salvages_json_from_surrounding_prose() {
        let raw = "Here you go:\n[{\"question\": \"q\", \"options\": [\"x\"], \"answer\": \"x\"}]\nHope that helps!";
        let questions: Vec<QuizQuestion> = parse_json_payload(raw).unwrap();
        assert_eq!(questions[0].answer, "x");
    }

    #[test]
    fn rejects_completions_without_json() {
        let result: Result<Vec<Flashcard>, _> = parse_json_payload("I cannot help with that.");
        assert!(matches!(result, Err(AiError::Parse(_))));
    }

    #[test]
    fn fallback_summary_truncates_long_text() {
        let text = "word ".repeat(100);
        let summary = fallback_summary(&text);
        assert!(summary.ends_with("..."));
        assert!(summary.chars().count() <= FALLBACK_SUMMARY_CHARS + 3);
        assert_eq!(fallback_summary("short"), "short");
    }

    #[test]
    fn fallback_breakdown_splits_estimate() {
        let subtasks = fallback_breakdown("essay", Some(60));
        assert_eq!(subtasks.len(), 2);
        assert!(subtasks.iter().all(|s| s.estimated_minutes == 30));
        assert_eq!(subtasks[1].dependencies, vec!["Research essay"]);
    }

    #[tokio::test]
    async fn unconfigured_service_uses_fallbacks() {
        let ai = AiService::new(None, "gpt-4o-mini".into(), Duration::from_secs(1));
        assert!(!ai.is_configured());
        assert!(matches!(
            ai.try_summarize("text", 2).await,
            Err(AiError::NotConfigured)
        ));
        let plan = ai.study_plan_or_fallback("calculus", None).await;
        assert_eq!(plan.techniques.len(), 3);
    }
}
