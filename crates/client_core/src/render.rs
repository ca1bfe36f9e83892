use shared::{domain::CalculationView, protocol::CalculationResult};
use tracing::warn;

use crate::{conversation::ConversationController, disclaimer::DisclaimerGate};

const CURRENCY_DECIMALS: usize = 2;
const PERCENTAGE_DECIMALS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberLocale {
    pub grouping: char,
    pub decimal: char,
}

impl NumberLocale {
    pub const RU_RU: Self = Self {
        grouping: '\u{a0}',
        decimal: ',',
    };
    pub const EN_US: Self = Self {
        grouping: ',',
        decimal: '.',
    };

    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_ascii_lowercase().replace('_', "-");
        let language = tag.split('-').next().unwrap_or_default();
        match language {
            "ru" | "kk" => Some(Self::RU_RU),
            "en" => Some(Self::EN_US),
            _ => None,
        }
    }

    /// Fixed number of fraction digits, integer part grouped by thousands.
    pub fn format(&self, value: f64, decimals: usize) -> String {
        if !value.is_finite() {
            return value.to_string();
        }

        let fixed = format!("{:.*}", decimals, value.abs());
        let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
        let negative = value < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9'));

        let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 * 2 + 1);
        if negative {
            out.push('-');
        }
        for (idx, digit) in int_part.chars().enumerate() {
            if idx > 0 && (int_part.len() - idx) % 3 == 0 {
                out.push(self.grouping);
            }
            out.push(digit);
        }
        if !frac_part.is_empty() {
            out.push(self.decimal);
            out.push_str(frac_part);
        }
        out
    }
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self::RU_RU
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResultRenderer {
    locale: NumberLocale,
}

impl ResultRenderer {
    pub fn new(locale: NumberLocale) -> Self {
        Self { locale }
    }

    pub fn for_locale_tag(tag: &str) -> Self {
        let locale = NumberLocale::from_tag(tag).unwrap_or_else(|| {
            warn!(tag, "render: unsupported locale, falling back to ru-RU");
            NumberLocale::RU_RU
        });
        Self::new(locale)
    }

    pub fn locale(&self) -> NumberLocale {
        self.locale
    }

    pub fn currency(&self, value: f64) -> String {
        self.locale.format(value, CURRENCY_DECIMALS)
    }

    pub fn percentage(&self, value: f64) -> String {
        self.locale.format(value, PERCENTAGE_DECIMALS)
    }

    pub fn render(&self, result: &CalculationResult) -> CalculationView {
        let calc = &result.calculation;
        CalculationView {
            ipn: self.currency(calc.ipn),
            sn: self.currency(calc.sn),
            total_tax: self.currency(calc.total_tax),
            opv: self.currency(calc.opv),
            so: self.currency(calc.so),
            vosms: self.currency(calc.vosms),
            total_social: self.currency(calc.total_social),
            limit_percentage: self.percentage(calc.limit_percentage),
            warnings: (!calc.warnings.is_empty()).then(|| calc.warnings.clone()),
            explanation: result.explanation.clone(),
            disclaimer: result.disclaimer.clone(),
        }
    }

    /// Appends the rendered result to the transcript and surfaces the
    /// result's disclaimer the first time one is shown.
    pub fn present(
        &self,
        result: &CalculationResult,
        conversation: &mut ConversationController,
        disclaimer: &mut DisclaimerGate,
    ) {
        conversation.append_calculation(self.render(result));
        if !conversation.disclaimer_shown() {
            disclaimer.show(&result.disclaimer);
            conversation.mark_disclaimer_shown();
        }
    }
}
