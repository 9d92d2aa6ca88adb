/// Requested reasoning depth for a model, parsed from the `/model
/// <model>[/<level>]` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThinkingLevel {
    None,
    Low,
    Med,
    High,
}

impl ThinkingLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(ThinkingLevel::None),
            "low" => Some(ThinkingLevel::Low),
            "med" | "medium" => Some(ThinkingLevel::Med),
            "high" => Some(ThinkingLevel::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThinkingLevel::None => "none",
            ThinkingLevel::Low => "low",
            ThinkingLevel::Med => "med",
            ThinkingLevel::High => "high",
        }
    }
}

/// Provider inferred from a model name's prefix.
fn infer_provider(model: &str) -> &'static str {
    if model.starts_with("claude-") {
        "anthropic"
    } else if model.starts_with("gpt-") || model.starts_with("o1") || model.starts_with("o3") {
        "openai"
    } else if model.starts_with("gemini-") {
        "google"
    } else {
        "unknown"
    }
}

/// How a provider expresses a non-`none` thinking level back to the user,
/// used by `/model`'s confirmation line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThinkingUnit {
    /// OpenAI's `reasoning_effort` knob: "low"/"medium"/"high" effort.
    Effort,
    /// A token budget, reported in absolute tokens (Gemini 2.x family).
    TokenBudget(u32),
    /// A coarse level with no numeric budget (Gemini 3.x, or any model not
    /// present in the capability table).
    Level,
}

/// A tiny static table of (provider, model) capability entries, standing in
/// for the full model-capability service a real deployment would query.
pub struct ModelCatalog;

impl ModelCatalog {
    /// Provider for a model name.
    pub fn provider_for(model: &str) -> &'static str {
        infer_provider(model)
    }

    /// Whether `model` supports non-`none` thinking levels at all. Every
    /// provider supports `None`; this gates `Low`/`Med`/`High`.
    pub fn supports_thinking(model: &str, level: ThinkingLevel) -> bool {
        if level == ThinkingLevel::None {
            return true;
        }
        !matches!(model, "gpt-3.5-turbo" | "text-davinci-003")
    }

    /// How this model reports a thinking level in user-visible text.
    pub fn thinking_unit_for(model: &str) -> ThinkingUnit {
        match model {
            "gemini-2.5-flash" | "gemini-2.5-pro" => ThinkingUnit::TokenBudget(8192),
            _ if model.starts_with("gpt-5") => ThinkingUnit::Effort,
            _ => ThinkingUnit::Level,
        }
    }

    /// Renders `level` the way `model`'s provider would express it, for the
    /// confirmation line `/model` and `/fork` print on a supported switch.
    pub fn describe_thinking(model: &str, level: ThinkingLevel) -> String {
        if level == ThinkingLevel::None {
            return "none".to_string();
        }
        match Self::thinking_unit_for(model) {
            ThinkingUnit::Effort => format!("reasoning_effort={}", level.as_str()),
            ThinkingUnit::TokenBudget(budget) => format!("thinking_budget={budget} tokens"),
            ThinkingUnit::Level => level.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_provider_from_prefix() {
        assert_eq!(ModelCatalog::provider_for("claude-sonnet-4-5"), "anthropic");
        assert_eq!(ModelCatalog::provider_for("gpt-5"), "openai");
        assert_eq!(ModelCatalog::provider_for("gemini-2.5-flash"), "google");
        assert_eq!(ModelCatalog::provider_for("llama-3"), "unknown");
    }

    #[test]
    fn thinking_level_parses_case_sensitively() {
        assert_eq!(ThinkingLevel::parse("high"), Some(ThinkingLevel::High));
        assert_eq!(ThinkingLevel::parse("invalid"), None);
    }

    #[test]
    fn thinking_unit_varies_by_model_family() {
        assert_eq!(
            ModelCatalog::thinking_unit_for("gemini-2.5-flash"),
            ThinkingUnit::TokenBudget(8192)
        );
        assert_eq!(
            ModelCatalog::thinking_unit_for("gpt-5"),
            ThinkingUnit::Effort
        );
        assert_eq!(
            ModelCatalog::thinking_unit_for("gemini-3.0-flash"),
            ThinkingUnit::Level
        );
        assert_eq!(
            ModelCatalog::thinking_unit_for("claude-3-5-sonnet-20241022"),
            ThinkingUnit::Level
        );
    }

    #[test]
    fn describe_thinking_matches_the_model_s_unit() {
        assert_eq!(
            ModelCatalog::describe_thinking("gemini-2.5-flash", ThinkingLevel::High),
            "thinking_budget=8192 tokens"
        );
        assert_eq!(
            ModelCatalog::describe_thinking("gpt-5", ThinkingLevel::Low),
            "reasoning_effort=low"
        );
        assert_eq!(
            ModelCatalog::describe_thinking("claude-3-5-sonnet-20241022", ThinkingLevel::Med),
            "med"
        );
        assert_eq!(
            ModelCatalog::describe_thinking("gpt-5", ThinkingLevel::None),
            "none"
        );
    }
}
