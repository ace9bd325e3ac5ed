//! Plain-text rendering of backend answers for the terminal.

use domain_chat::QueryAnswer;
use domain_completion::{AvailableLlms, Message, Role};

fn speaker(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "you",
        Role::Assistant => "assistant",
    }
}

pub fn prompt_label(role: Role) -> String {
    format!("{}> ", speaker(role))
}

pub fn message(message: &Message) -> String {
    format!("{}{}", prompt_label(message.role), message.content)
}

pub fn status(api_up: bool, key_valid: bool) -> String {
    let state = |ok: bool, yes: &str, no: &str| if ok { yes } else { no }.to_string();
    format!(
        "api:        {}\nopenai key: {}",
        state(api_up, "up", "unreachable"),
        state(key_valid, "valid", "invalid or unchecked"),
    )
}

pub fn collections(names: &[String]) -> String {
    if names.is_empty() {
        return "no collections (or the backend is unreachable)".to_string();
    }
    names.join("\n")
}

pub fn models(llms: &AvailableLlms) -> String {
    if llms.is_empty() {
        return "no models (or the backend is unreachable)".to_string();
    }
    llms.0
        .values()
        .map(|info| {
            let marker = if info.is_default { " (default)" } else { "" };
            format!("{} [{}]{}", info.model_name, info.provider, marker)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn query_answer(answer: &QueryAnswer) -> String {
    let mut out = answer.answer.clone();
    if !answer.references.is_empty() {
        out.push_str("\n\nReferences:");
        for (i, reference) in answer.references.iter().enumerate() {
            out.push_str(&format!(
                "\n[{}] score {:.3}: {}",
                i + 1,
                reference.score,
                reference.text.trim()
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_chat::QueryReference;
    use domain_completion::LlmInfo;

    #[test]
    fn test_status_lines() {
        assert_eq!(status(true, false), "api:        up\nopenai key: invalid or unchecked");
        assert!(status(false, true).contains("unreachable"));
    }

    #[test]
    fn test_transcript_message() {
        assert_eq!(message(&Message::user("Refunds?")), "you> Refunds?");
        assert_eq!(
            message(&Message::assistant("Within 30 days.")),
            "assistant> Within 30 days."
        );
    }

    #[test]
    fn test_models_marks_default() {
        let llms: AvailableLlms = [
            LlmInfo {
                model_name: "gpt-4o-mini".into(),
                provider: "openai".into(),
                is_default: true,
            },
            LlmInfo {
                model_name: "gpt-4o".into(),
                provider: "openai".into(),
                is_default: false,
            },
        ]
        .into_iter()
        .collect();

        assert_eq!(
            models(&llms),
            "gpt-4o [openai]\ngpt-4o-mini [openai] (default)"
        );
    }

    #[test]
    fn test_empty_lists_explain_themselves() {
        assert!(collections(&[]).starts_with("no collections"));
        assert!(models(&AvailableLlms::default()).starts_with("no models"));
    }

    #[test]
    fn test_query_answer_lists_references_in_order() {
        let answer = QueryAnswer {
            answer: "Within 30 days.".into(),
            references: vec![
                QueryReference {
                    text: "Refunds are accepted within 30 days.\n".into(),
                    score: 0.88,
                },
                QueryReference {
                    text: "Keep the receipt.".into(),
                    score: 0.61,
                },
            ],
        };

        assert_eq!(
            query_answer(&answer),
            "Within 30 days.\n\nReferences:\n\
             [1] score 0.880: Refunds are accepted within 30 days.\n\
             [2] score 0.610: Keep the receipt."
        );
    }
}
