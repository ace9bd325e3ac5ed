use crate::models::SourceNode;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You answer questions about the user's documents. \
Use only the context you are given. If it does not contain the answer, say that you do not know.";

/// Answer returned when retrieval finds nothing to ground on.
pub const EMPTY_RESPONSE: &str = "Empty Response";

const SEPARATOR: &str = "---------------------";

/// Build the user prompt: retrieved chunks in rank order, then the question.
pub fn grounded_prompt(question: &str, nodes: &[SourceNode]) -> String {
    let context = nodes
        .iter()
        .map(|n| n.node.text.trim())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Context information is below.\n{SEPARATOR}\n{context}\n{SEPARATOR}\n\
         Given the context information and not prior knowledge, answer the query.\n\
         Query: {question}\nAnswer: "
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeContent;

    fn node(text: &str) -> SourceNode {
        SourceNode {
            node: NodeContent {
                id: "n".into(),
                text: text.into(),
            },
            score: 0.5,
        }
    }

    #[test]
    fn test_prompt_keeps_rank_order_and_question() {
        let prompt = grounded_prompt(
            "What is the refund policy?",
            &[node("Refunds within 30 days. "), node("Receipts are required.")],
        );

        let first = prompt.find("Refunds within 30 days.").unwrap();
        let second = prompt.find("Receipts are required.").unwrap();
        assert!(first < second);
        assert!(prompt.ends_with("Query: What is the refund policy?\nAnswer: "));
    }
}
