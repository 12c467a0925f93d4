//! System instruction and structured-output schema
//!
//! Kept apart from the generator so the wording can be versioned and
//! tested without touching control flow.
//!
//! Author: hephaex@gmail.com

use astro_core::FunctionSpec;
use serde_json::json;

/// Name of the function the model must call.
pub const FUNCTION_NAME: &str = "astroguide_response";

/// Sentence the model is told to give for off-topic questions.
pub const REFUSAL_ANSWER: &str =
    "I specialize in space and astronomy questions. Please ask something related to space.";

/// Fixed system instruction opening every conversation context.
pub const SYSTEM_INSTRUCTION: &str = "You are AstroGuide, an expert space and astronomy tutor.

Rules:
1. Only answer questions related to space or astronomy.
2. If the question is NOT about space or astronomy, say:
   'I specialize in space and astronomy questions. Please ask something related to space.'
3. Adjust your explanation based on the user's level:
   - beginner: simple, intuitive, minimal jargon
   - advanced: more technical, precise terminology

After answering, include 2-3 reputable sources in the 'sources' field.
Each source must be a full https URL to a reliable site
(e.g., NASA, ESA, HubbleSite, major observatories).
If no appropriate sources exist, return an empty array.

You must respond by calling the function with structured data";

/// Schema of the `astroguide_response` function call.
pub fn function_spec() -> FunctionSpec {
    FunctionSpec {
        name: FUNCTION_NAME.to_string(),
        description: "Return a structured astronomy answer with sources".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "answer": {
                    "type": "string",
                    "description": "The main answer to the user's question"
                },
                "sources": {
                    "type": "array",
                    "items": {
                        "type": "string",
                        "description": "A valid https URL"
                    }
                }
            },
            "required": ["answer", "sources"]
        }),
    }
}

/// Final user turn carrying the level and the question.
pub fn question_turn(level: &str, message: &str) -> String {
    format!("Level: {level}\nQuestion: {message}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_rules() {
        assert!(SYSTEM_INSTRUCTION.contains("Only answer questions related to space or astronomy"));
        assert!(SYSTEM_INSTRUCTION.contains(REFUSAL_ANSWER));
        assert!(SYSTEM_INSTRUCTION.contains("beginner:"));
        assert!(SYSTEM_INSTRUCTION.contains("advanced:"));
        assert!(SYSTEM_INSTRUCTION.contains("2-3 reputable sources"));
        assert!(SYSTEM_INSTRUCTION.contains("empty array"));
        assert!(SYSTEM_INSTRUCTION.contains("calling the function"));
    }

    #[test]
    fn test_function_spec_schema() {
        let spec = function_spec();
        assert_eq!(spec.name, "astroguide_response");

        let params = &spec.parameters;
        assert_eq!(params["type"], "object");
        assert_eq!(params["properties"]["answer"]["type"], "string");
        assert_eq!(params["properties"]["sources"]["type"], "array");
        assert_eq!(params["properties"]["sources"]["items"]["type"], "string");
        assert_eq!(params["required"], json!(["answer", "sources"]));
    }

    #[test]
    fn test_question_turn_format() {
        assert_eq!(
            question_turn("advanced", "What is a magnetar?"),
            "Level: advanced\nQuestion: What is a magnetar?"
        );
    }
}
