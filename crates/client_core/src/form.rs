use shared::{
    error::{ApiError, ApiErrorKind},
    protocol::CalculationRequest,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::texts;

pub const MONTHS_WORKED_RANGE: std::ops::RangeInclusive<u8> = 1..=6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPhase {
    #[default]
    Closed,
    Open,
    Submitting,
}

/// Validated calculation form contents; lives for one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormInput {
    pub revenue: f64,
    pub months_worked: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormValidationError {
    #[error("{}", texts::INVALID_REVENUE)]
    InvalidRevenue,
    #[error("{}", texts::INVALID_MONTHS_WORKED)]
    InvalidMonthsWorked,
}

impl FormInput {
    /// Revenue is checked before months worked; the first failure wins.
    pub fn parse(raw_revenue: &str, raw_months_worked: &str) -> Result<Self, FormValidationError> {
        let revenue = parse_decimal(raw_revenue)
            .filter(|revenue| *revenue >= 0.0)
            // "-0" is accepted as zero, never sent with its sign.
            .map(f64::abs)
            .ok_or(FormValidationError::InvalidRevenue)?;
        let months_worked = raw_months_worked
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|months| MONTHS_WORKED_RANGE.contains(months))
            .ok_or(FormValidationError::InvalidMonthsWorked)?;

        Ok(Self {
            revenue,
            months_worked,
        })
    }
}

impl From<FormInput> for CalculationRequest {
    fn from(input: FormInput) -> Self {
        Self {
            revenue: input.revenue,
            months_worked: input.months_worked,
        }
    }
}

/// Accepts grouping spaces and a decimal comma as typed in the ru-RU locale.
fn parse_decimal(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}'))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Lifecycle of the embedded calculation form.
///
/// `Closed -> Open -> Submitting -> {Closed | Open}`; cancelling returns an
/// open form to `Closed`. While the form is active, free-text chat input is
/// disabled.
#[derive(Debug, Clone, Default)]
pub struct FormSessionManager {
    phase: FormPhase,
    inline_error: Option<String>,
}

impl FormSessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    /// Open or submitting.
    pub fn is_active(&self) -> bool {
        self.phase != FormPhase::Closed
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == FormPhase::Submitting
    }

    pub fn submit_enabled(&self) -> bool {
        self.phase == FormPhase::Open
    }

    pub fn inline_error(&self) -> Option<&str> {
        self.inline_error.as_deref()
    }

    pub fn show(&mut self) {
        if self.is_active() {
            debug!(phase = ?self.phase, "form: already open");
            return;
        }
        self.phase = FormPhase::Open;
        self.inline_error = None;
        info!("form: opened, chat input disabled");
    }

    /// Only an open form can be cancelled; a submission in flight runs to
    /// completion first.
    pub fn cancel(&mut self) -> bool {
        if self.phase != FormPhase::Open {
            debug!(phase = ?self.phase, "form: cancel ignored");
            return false;
        }
        self.close();
        true
    }

    pub fn close(&mut self) {
        if self.phase == FormPhase::Closed {
            return;
        }
        self.phase = FormPhase::Closed;
        self.inline_error = None;
        info!("form: closed, chat input enabled");
    }

    /// Validates raw field text. On success the form moves to `Submitting`
    /// and the caller must issue the calculation; on failure the form stays
    /// open with an inline error.
    pub fn begin_submit(&mut self, raw_revenue: &str, raw_months_worked: &str) -> Option<FormInput> {
        if self.phase != FormPhase::Open {
            debug!(phase = ?self.phase, "form: submit ignored");
            return None;
        }

        self.inline_error = None;
        match FormInput::parse(raw_revenue, raw_months_worked) {
            Ok(input) => {
                self.phase = FormPhase::Submitting;
                debug!(months_worked = input.months_worked, "form: submitting");
                Some(input)
            }
            Err(err) => {
                debug!(error = ?err, "form: validation failed");
                self.inline_error = Some(err.to_string());
                None
            }
        }
    }

    pub fn finish_success(&mut self) {
        self.close();
    }

    pub fn finish_failure(&mut self, error: &ApiError) {
        self.phase = FormPhase::Open;
        let inner = match error.kind {
            ApiErrorKind::Server => texts::CALCULATION_SERVER_ERROR_PREFIX,
            ApiErrorKind::Transport | ApiErrorKind::MalformedResponse => "",
        };
        self.inline_error = Some(format!("{}{inner}{error}", texts::FORM_ERROR_PREFIX));
    }
}
