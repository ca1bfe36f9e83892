use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// One assistant turn as answered by the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatTurnResponse {
    AiMessage {
        #[serde(rename = "ai_message", default)]
        text: String,
    },
    ShowCalculationForm {
        #[serde(rename = "ai_message", default)]
        text: String,
    },
    Error {
        #[serde(rename = "error_message", default)]
        message: String,
    },
    #[serde(other)]
    Unrecognized,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub revenue: f64,
    pub months_worked: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationFigures {
    pub ipn: f64,
    pub sn: f64,
    pub total_tax: f64,
    pub opv: f64,
    pub so: f64,
    pub vosms: f64,
    pub total_social: f64,
    pub limit_percentage: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub warnings: Vec<String>,
}

/// Raw calculation endpoint body; every field may be missing on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculationResponse {
    #[serde(default)]
    pub calculation: Option<CalculationFigures>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub disclaimer: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalculationResult {
    pub calculation: CalculationFigures,
    pub explanation: String,
    pub disclaimer: String,
}

impl CalculationResponse {
    /// Returns `None` when `calculation` or a non-empty `explanation` is missing.
    pub fn into_result(self) -> Option<CalculationResult> {
        let calculation = self.calculation?;
        let explanation = self.explanation.filter(|text| !text.is_empty())?;
        Some(CalculationResult {
            calculation,
            explanation,
            disclaimer: self.disclaimer.unwrap_or_default(),
        })
    }
}

/// Diagnostic body the service attaches to non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl ErrorBody {
    pub fn best_message(&self) -> Option<&str> {
        [&self.error, &self.message, &self.error_message]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn is_up(&self) -> bool {
        self.status.eq_ignore_ascii_case("up")
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
