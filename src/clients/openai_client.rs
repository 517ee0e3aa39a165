use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::service::openai_service::SuggestionError;

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}

const SYSTEM_MESSAGE: &str = "You are SchedulAI, a weekly schedule planner. Reply with plain text only: \
     no markdown, no bullet characters, no code fences.";

pub fn build_schedule_prompt(preferences: &str) -> String {
    format!(
        "Task: Propose a weekly schedule that satisfies the user's preferences below.\n\
         Rules:\n\
         - Output one line per recurring block, in exactly this shape:\n\
           <title>: <days> <start> - <end>\n\
         - <days> is one of M, Tu, W, Th, F, MWF, TTh, or a full weekday name such as Saturday.\n\
           Several codes may be joined with commas and no spaces, e.g. M,Th.\n\
         - <start> and <end> are 12-hour times with lowercase am/pm and no space, e.g. 9:00am or 2:15pm.\n\
         - The end time must be later than the start time on the same day.\n\
         - Do not add any other text before or after the lines.\n\
         Example:\n\
         Math 101: MWF 9:00am - 9:50am\n\
         Art History: Tu 2:15pm - 3:30pm\n\
         User preferences: \"{preferences}\"",
        preferences = preferences.trim()
    )
}

pub async fn request_schedule(
    http: &reqwest::Client,
    api_url: &str,
    api_key: &str,
    model: &str,
    preferences: &str,
) -> Result<String, SuggestionError> {
    let request = OpenAIRequest {
        model: model.to_string(),
        messages: vec![
            OpenAIMessage {
                role: "system".to_string(),
                content: SYSTEM_MESSAGE.to_string(),
            },
            OpenAIMessage {
                role: "user".to_string(),
                content: build_schedule_prompt(preferences),
            },
        ],
        max_tokens: 1500,
        temperature: 0.2,
    };

    debug!(model, "requesting schedule suggestion");
    let response = http
        .post(api_url)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?; // read the body once

    if !status.is_success() {
        warn!(%status, body = %text, "suggestion request rejected");
        return Err(SuggestionError::Status(status.as_u16()));
    }

    parse_completion(&text)
}

pub fn parse_completion(body: &str) -> Result<String, SuggestionError> {
    let parsed: OpenAIResponse =
        serde_json::from_str(body).map_err(|e| SuggestionError::Decode(e.to_string()))?;

    match parsed.choices.into_iter().next() {
        Some(choice) if !choice.message.content.trim().is_empty() => Ok(choice.message.content),
        _ => {
            warn!(body, "no usable choice in completion");
            Err(SuggestionError::EmptyResponse)
        }
    }
}
