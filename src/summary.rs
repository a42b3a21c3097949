//! Summary types - the requests sent to the completion API and what comes back.

use clap::ValueEnum;
use std::fmt;
use std::time::Duration;

/// Summarisation mode selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SummaryStyle {
    /// A few lines
    Short,
    /// Longer, explains the key concepts
    Detailed,
    /// Bullet points
    Bullets,
    /// Generic summary
    #[default]
    Default,
}

impl SummaryStyle {
    pub const ALL: [SummaryStyle; 4] = [
        SummaryStyle::Short,
        SummaryStyle::Detailed,
        SummaryStyle::Bullets,
        SummaryStyle::Default,
    ];

    /// Instruction placed at the top of the prompt
    pub fn instruction(self) -> &'static str {
        match self {
            SummaryStyle::Short => "Provide a short summary in 5-6 lines.",
            SummaryStyle::Detailed => "Provide a detailed summary explaining key concepts.",
            SummaryStyle::Bullets => "Provide a bullet-point summary.",
            SummaryStyle::Default => "Summarize clearly.",
        }
    }

    /// Map a submitted form value to a style; unknown values use the generic one
    pub fn from_form_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "short" => SummaryStyle::Short,
            "detailed" => SummaryStyle::Detailed,
            "bullets" => SummaryStyle::Bullets,
            _ => SummaryStyle::Default,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SummaryStyle::Short => "short",
            SummaryStyle::Detailed => "detailed",
            SummaryStyle::Bullets => "bullets",
            SummaryStyle::Default => "default",
        }
    }
}

impl fmt::Display for SummaryStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the summariser needs for one call
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub text: String,
    pub style: SummaryStyle,
    pub model: String,
}

impl SummaryRequest {
    pub fn new(text: impl Into<String>, style: SummaryStyle, model: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style,
            model: model.into(),
        }
    }
}

/// Generated summary and how long the completion call took
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryResult {
    pub text: String,
    pub elapsed: Duration,
}

impl SummaryResult {
    /// Elapsed time in seconds, rounded to two decimals
    pub fn elapsed_seconds(&self) -> f64 {
        (self.elapsed.as_secs_f64() * 100.0).round() / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instructions_are_distinct() {
        let instructions: Vec<&str> = SummaryStyle::ALL.iter().map(|s| s.instruction()).collect();
        for (i, a) in instructions.iter().enumerate() {
            for b in &instructions[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_ne!(
            SummaryStyle::Short.instruction(),
            SummaryStyle::Bullets.instruction()
        );
    }

    #[test]
    fn test_unknown_form_value_falls_back() {
        assert_eq!(SummaryStyle::from_form_value("other"), SummaryStyle::Default);
        assert_eq!(SummaryStyle::from_form_value(""), SummaryStyle::Default);
        assert_eq!(SummaryStyle::from_form_value("haiku"), SummaryStyle::Default);
        assert_eq!(
            SummaryStyle::from_form_value("other").instruction(),
            "Summarize clearly."
        );
    }

    #[test]
    fn test_known_form_values() {
        assert_eq!(SummaryStyle::from_form_value("short"), SummaryStyle::Short);
        assert_eq!(SummaryStyle::from_form_value("Detailed"), SummaryStyle::Detailed);
        assert_eq!(SummaryStyle::from_form_value(" bullets "), SummaryStyle::Bullets);
    }

    #[test]
    fn test_elapsed_rounding() {
        let result = SummaryResult {
            text: String::new(),
            elapsed: Duration::from_millis(1234),
        };
        assert_eq!(result.elapsed_seconds(), 1.23);
    }
}
