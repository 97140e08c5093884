//! Text transform tool definition.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use super::ToolDefinition;
use crate::domains::tools::error::HandlerError;
use crate::domains::tools::registry::ToolContext;
use crate::domains::tools::schema::{ParameterSpec, ValidatedArgs};

const OPERATIONS: &[&str] = &[
    Operation::Uppercase.as_str(),
    Operation::Lowercase.as_str(),
    Operation::Titlecase.as_str(),
    Operation::Reverse.as_str(),
    Operation::WordCount.as_str(),
    Operation::CharCount.as_str(),
    Operation::Slugify.as_str(),
];

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Operation {
    Uppercase,
    Lowercase,
    Titlecase,
    Reverse,
    WordCount,
    CharCount,
    Slugify,
}

impl Operation {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Uppercase => "uppercase",
            Self::Lowercase => "lowercase",
            Self::Titlecase => "titlecase",
            Self::Reverse => "reverse",
            Self::WordCount => "word_count",
            Self::CharCount => "char_count",
            Self::Slugify => "slugify",
        }
    }
}

#[derive(Debug, Deserialize)]
struct TextTransformParams {
    text: String,
    operation: Operation,
}

/// Text transform tool - case changes, counts and slugs.
pub struct TextTransformTool;

impl ToolDefinition for TextTransformTool {
    const NAME: &'static str = "text_transform";

    const DESCRIPTION: &'static str =
        "Transform text: uppercase, lowercase, titlecase, reverse, word count, character count, or slugify.";

    fn parameters() -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::string("text", "Text to transform").required(),
            ParameterSpec::string("operation", "Transformation to apply")
                .required()
                .one_of(OPERATIONS),
        ]
    }

    #[instrument(skip_all)]
    fn handle(_ctx: &ToolContext, args: &ValidatedArgs) -> Result<Value, HandlerError> {
        let params: TextTransformParams = args.decode()?;
        let text = params.text.as_str();

        let result = match params.operation {
            Operation::Uppercase => json!(text.to_uppercase()),
            Operation::Lowercase => json!(text.to_lowercase()),
            Operation::Titlecase => json!(titlecase(text)),
            Operation::Reverse => json!(text.chars().rev().collect::<String>()),
            Operation::WordCount => json!(text.split_whitespace().count()),
            Operation::CharCount => json!(text.chars().count()),
            Operation::Slugify => json!(slugify(text)),
        };

        Ok(json!({ "operation": params.operation.as_str(), "result": result }))
    }
}

/// Upper-case the first letter of every run of letters, lower-case the rest.
fn titlecase(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Lower-case, replace runs outside `[a-z0-9]` with `-`, trim dashes.
fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_dash = false;
    for c in lowered.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c);
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::notes::MemoryNoteStore;
    use serde_json::Map;
    use std::sync::Arc;

    fn run(text: &str, operation: &str) -> Value {
        let ctx = ToolContext::new(Arc::new(MemoryNoteStore::new()));
        let mut raw = Map::new();
        raw.insert("text".into(), json!(text));
        raw.insert("operation".into(), json!(operation));
        let args = TextTransformTool::spec().validate(&raw).unwrap();
        TextTransformTool::handle(&ctx, &args).unwrap()
    }

    #[test]
    fn test_operations_names_match_serde() {
        for name in OPERATIONS {
            let parsed: Operation = serde_json::from_value(json!(name)).unwrap();
            assert_eq!(parsed.as_str(), *name);
        }
    }

    #[test]
    fn test_case_operations() {
        assert_eq!(run("Hello World", "uppercase")["result"], "HELLO WORLD");
        assert_eq!(run("Hello World", "lowercase")["result"], "hello world");
        assert_eq!(run("hELLO wORLD", "titlecase")["result"], "Hello World");
        assert_eq!(run("they're bill's", "titlecase")["result"], "They'Re Bill'S");
    }

    #[test]
    fn test_reverse_and_counts() {
        assert_eq!(run("abc", "reverse")["result"], "cba");
        assert_eq!(run("héllo", "reverse")["result"], "olléh");
        assert_eq!(run("  one two\tthree\n", "word_count")["result"], 3);
        assert_eq!(run("héllo", "char_count")["result"], 5);
    }

    #[test]
    fn test_slugify() {
        let payload = run("  Hello, World! 2024 ", "slugify");
        assert_eq!(payload["operation"], "slugify");
        assert_eq!(payload["result"], "hello-world-2024");
        assert_eq!(run("---", "slugify")["result"], "");
        assert_eq!(run("Crème brûlée", "slugify")["result"], "cr-me-br-l-e");
    }
}
