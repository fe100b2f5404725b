use serde_json::Value;

/// Character cap for note and journal snippets sent to the model.
pub const CONTEXT_SNIPPET_CHARS: usize = 220;
/// Character cap for the dashboard's latest-journal excerpt.
pub const EXCERPT_CHARS: usize = 160;

/// Plain text of a rich-text block tree, capped at `cap` characters.
///
/// Each block contributes its inline `content`: either an array of text
/// children, or a bare string. Nested `children` blocks follow their parent.
/// Non-empty pieces are joined with single spaces.
pub fn plain_text_snippet(blocks: &Value, cap: usize) -> String {
    let mut pieces = Vec::new();
    collect_text(blocks, &mut pieces);
    truncate_chars(&pieces.join(" "), cap)
}

/// Snippet of content stored as serialized JSON. Content that is not a JSON
/// block tree is treated as plain text.
pub fn snippet_from_stored(raw: &str, cap: usize) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Array(_)) => plain_text_snippet(&value, cap),
        _ => truncate_chars(raw, cap),
    }
}

fn collect_text(node: &Value, out: &mut Vec<String>) {
    match node {
        Value::Array(blocks) => {
            for block in blocks {
                collect_text(block, out);
            }
        }
        Value::Object(block) => {
            match block.get("content") {
                Some(Value::Array(children)) => {
                    let line: Vec<&str> = children
                        .iter()
                        .filter_map(|child| child.get("text").and_then(Value::as_str))
                        .filter(|text| !text.trim().is_empty())
                        .collect();
                    if !line.is_empty() {
                        out.push(line.join(" "));
                    }
                }
                Some(Value::String(text)) if !text.trim().is_empty() => out.push(text.clone()),
                _ => {}
            }

            if let Some(children) = block.get("children") {
                collect_text(children, out);
            }
        }
        Value::String(text) if !text.trim().is_empty() => out.push(text.clone()),
        _ => {}
    }
}

fn truncate_chars(text: &str, cap: usize) -> String {
    text.chars().take(cap).collect::<String>().trim().to_string()
}
