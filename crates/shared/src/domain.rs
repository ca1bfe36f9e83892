use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

/// Display-ready calculation result. Every figure is already formatted for
/// the active locale; text blocks are carried verbatim and must never be
/// interpreted as markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationView {
    pub ipn: String,
    pub sn: String,
    pub total_tax: String,
    pub opv: String,
    pub so: String,
    pub vosms: String,
    pub total_social: String,
    pub limit_percentage: String,
    /// `None` when the result carried no warnings; the block is omitted.
    pub warnings: Option<Vec<String>>,
    pub explanation: String,
    pub disclaimer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum MessageContent {
    Text(String),
    Calculation(Box<CalculationView>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub content: MessageContent,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::text(Sender::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text(Sender::Assistant, text)
    }

    pub fn calculation(view: CalculationView) -> Self {
        Self {
            sender: Sender::Assistant,
            content: MessageContent::Calculation(Box::new(view)),
            sent_at: Utc::now(),
        }
    }

    fn text(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            content: MessageContent::Text(text.into()),
            sent_at: Utc::now(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) => Some(text),
            MessageContent::Calculation(_) => None,
        }
    }
}

impl fmt::Display for CalculationView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ИПН: {}", self.ipn)?;
        writeln!(f, "СН: {}", self.sn)?;
        writeln!(f, "Итого налог: {}", self.total_tax)?;
        writeln!(f, "ОПВ: {}", self.opv)?;
        writeln!(f, "СО: {}", self.so)?;
        writeln!(f, "ВОСМС: {}", self.vosms)?;
        writeln!(f, "Итого соц. платежи: {}", self.total_social)?;
        writeln!(f, "Доход от лимита: {}%", self.limit_percentage)?;
        if let Some(warnings) = &self.warnings {
            for warning in warnings {
                writeln!(f, "! {warning}")?;
            }
        }
        writeln!(f)?;
        writeln!(f, "{}", self.explanation)?;
        write!(f, "{}", self.disclaimer)
    }
}

impl fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let who = match self.sender {
            Sender::User => "you",
            Sender::Assistant => "salyq",
        };
        match &self.content {
            MessageContent::Text(text) => write!(f, "{who}: {text}"),
            MessageContent::Calculation(view) => write!(f, "{who}:\n{view}"),
        }
    }
}
