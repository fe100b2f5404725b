use std::fmt::Write;

use serde::Serialize;

use super::context::JarvisContext;
use super::{ChatMessage, HISTORY_WINDOW};

const PERSONA: &str = "You are Jarvis, a wise and calm trading coach for a discretionary swing trader.
Your goal is to help the trader maintain discipline, follow their process, and reflect on their decisions.
You prioritize \"Calm over Hype\" and \"Process over Outcome\".";

const GUIDELINES: &str = "Guidelines:
1. Be concise but warm.
2. If the trader is showing signs of FOMO or emotional trading, gently remind them of their rules.
3. Use the data provided to give specific feedback (e.g., \"I noticed your last trade on AAPL was a SELL...\").
4. Do not give financial advice or predict the market. Focus on psychology and process.
5. If the user asks about their canvas, refer to the \"Active Canvas\" data.";

/// Persona, rendered workspace context, guidelines, then the trader's own
/// customization if any.
pub fn build_system_prompt(ctx: &JarvisContext, customization: Option<&str>) -> String {
    let mut prompt = String::with_capacity(2048);
    prompt.push_str(PERSONA);
    prompt.push_str("\n\nHere is the current context of the trader's workspace:\n");

    let _ = writeln!(prompt, "Current Date: {}", ctx.current_date.to_rfc3339());
    let _ = writeln!(prompt, "Active Canvas: {}", to_json(&ctx.active_canvas));
    let _ = writeln!(prompt, "Recent Trades: {}", to_json(&ctx.recent_trades));
    let _ = writeln!(prompt, "Recent Journal Entries: {}", to_json(&ctx.journal_entries));
    let _ = writeln!(prompt, "Watchlist: {}", to_json(&ctx.watchlist));
    let _ = writeln!(prompt, "Stock Notes: {}", to_json(&ctx.notes));
    let _ = writeln!(prompt, "Active Rules: {}", to_json(&ctx.active_rules));

    prompt.push('\n');
    prompt.push_str(GUIDELINES);

    if let Some(extra) = customization.map(str::trim).filter(|c| !c.is_empty()) {
        prompt.push_str("\n\nAdditional instructions from the trader:\n");
        prompt.push_str(extra);
    }

    prompt
}

/// The trailing window of the conversation.
pub fn trim_history(messages: &[ChatMessage]) -> &[ChatMessage] {
    let start = messages.len().saturating_sub(HISTORY_WINDOW);
    &messages[start..]
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jarvis::ChatRole;

    #[test]
    fn history_keeps_trailing_window() {
        let messages: Vec<ChatMessage> = (0..45)
            .map(|i| ChatMessage::user(format!("message {i}")))
            .collect();

        let trimmed = trim_history(&messages);
        assert_eq!(trimmed.len(), HISTORY_WINDOW);
        assert_eq!(trimmed[0].content, "message 15");
        assert_eq!(trimmed.last().unwrap().content, "message 44");

        let short = vec![ChatMessage::assistant("hi")];
        assert_eq!(trim_history(&short).len(), 1);
        assert_eq!(trim_history(&short)[0].role, ChatRole::Assistant);
    }

    #[test]
    fn prompt_renders_context_and_customization() {
        let ctx = JarvisContext {
            active_rules: vec!["Max two trades a day".into()],
            ..Default::default()
        };

        let prompt = build_system_prompt(&ctx, Some("  Answer in Spanish. "));
        assert!(prompt.starts_with("You are Jarvis"));
        assert!(prompt.contains("Active Canvas: null"));
        assert!(prompt.contains(r#"Active Rules: ["Max two trades a day"]"#));
        assert!(prompt.ends_with("Additional instructions from the trader:\nAnswer in Spanish."));
    }

    #[test]
    fn blank_customization_is_ignored() {
        let prompt = build_system_prompt(&JarvisContext::default(), Some("   "));
        assert!(!prompt.contains("Additional instructions"));
        assert!(prompt.trim_end().ends_with("refer to the \"Active Canvas\" data."));
    }
}
