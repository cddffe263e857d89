//! Transcript normalization
//!
//! The calling SDK delivers the full transcript-so-far on every `update`
//! event, either as a preformatted string or as a list of utterance
//! records. Both shapes are flattened into display text here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Label prefixed to agent utterances
pub const AGENT_LABEL: &str = "Agent";

/// Label prefixed to every non-agent utterance
pub const USER_LABEL: &str = "You";

/// Who spoke an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Agent,
    User,
}

impl Speaker {
    /// Any role other than `agent` is the human on the call
    pub fn from_role(role: &str) -> Self {
        if role == "agent" {
            Speaker::Agent
        } else {
            Speaker::User
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Speaker::Agent => AGENT_LABEL,
            Speaker::User => USER_LABEL,
        }
    }
}

/// One speech turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub speaker: Speaker,
    pub text: String,
}

impl Utterance {
    pub fn render(&self) -> String {
        format!("{}: {}", self.speaker.label(), self.text)
    }
}

/// Utterance record as sent by the SDK
#[derive(Debug, Clone, Deserialize)]
pub struct UtteranceRecord {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl From<&UtteranceRecord> for Utterance {
    fn from(record: &UtteranceRecord) -> Self {
        Self {
            speaker: Speaker::from_role(record.role.as_deref().unwrap_or_default()),
            text: record.content.clone().unwrap_or_default(),
        }
    }
}

/// Accepted shapes of the `transcript` field
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TranscriptField {
    Text(String),
    Utterances(Vec<UtteranceRecord>),
}

impl TranscriptField {
    pub fn render(&self) -> String {
        match self {
            TranscriptField::Text(text) => text.clone(),
            TranscriptField::Utterances(records) => {
                let utterances: Vec<Utterance> = records.iter().map(Utterance::from).collect();
                render_utterances(&utterances)
            }
        }
    }
}

/// Join utterances one per line, in order
pub fn render_utterances(utterances: &[Utterance]) -> String {
    utterances
        .iter()
        .map(Utterance::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extract display text from an `update` payload.
///
/// Returns `None` when the payload has no recognizable `transcript` field,
/// in which case the caller must keep its previous transcript.
pub fn normalize_update(update: &Value) -> Option<String> {
    let field = update.get("transcript")?;
    TranscriptField::deserialize(field)
        .ok()
        .map(|parsed| parsed.render())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_mapping() {
        assert_eq!(Speaker::from_role("agent"), Speaker::Agent);
        assert_eq!(Speaker::from_role("user"), Speaker::User);
        assert_eq!(Speaker::from_role("Agent"), Speaker::User);
        assert_eq!(Speaker::from_role(""), Speaker::User);
    }

    #[test]
    fn test_missing_content_renders_empty() {
        let update = json!({"transcript": [{"role": "agent"}]});
        assert_eq!(normalize_update(&update).as_deref(), Some("Agent: "));
    }

    #[test]
    fn test_null_transcript_is_unrecognized() {
        assert_eq!(normalize_update(&json!({"transcript": null})), None);
        assert_eq!(normalize_update(&json!({"transcript": 42})), None);
    }
}
