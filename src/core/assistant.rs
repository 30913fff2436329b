use crate::core::errors::IntelliTaskError;
use crate::core::models::todo::Todo;
use crate::infrastructure::ai::{ChatMessage, ChatModel, Embedder};
use crate::infrastructure::vector::{TodoMetadata, VectorIndex, VectorMatch, VectorRecord};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_TOP_K: usize = 5;
pub const SYSTEM_PROMPT: &str = "You are a helpful Todo Assistant.";
pub const OUT_OF_SCOPE_REPLY: &str = "I'm sorry, but I can only assist with tasks and information related to this Todo application. That's outside my current scope.";
pub const NO_CONTEXT: &str = "No relevant todos found.";

/// Answers questions about the caller's own todos from a vector index.
pub struct RetrievalAssistant {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    chat: Arc<dyn ChatModel>,
    top_k: usize,
}

impl RetrievalAssistant {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        chat: Arc<dyn ChatModel>,
        top_k: usize,
    ) -> Self {
        RetrievalAssistant {
            embedder,
            index,
            chat,
            top_k: top_k.max(1),
        }
    }

    pub async fn index_todo(&self, todo: &Todo) -> Result<(), IntelliTaskError> {
        let values = self.embedder.embed(&todo.embedding_text()).await?;
        self.index
            .upsert(VectorRecord {
                id: todo.id.clone(),
                values,
                metadata: TodoMetadata {
                    user_id: todo.user_id.clone(),
                    email: todo.email.clone(),
                    title: todo.title.clone(),
                    description: todo.description.clone(),
                },
            })
            .await
    }

    pub async fn forget_todo(&self, todo_id: &str) -> Result<(), IntelliTaskError> {
        self.index.delete(todo_id).await
    }

    pub async fn retrieve(&self, owner_id: &str, query: &str) -> Result<Vec<VectorMatch>, IntelliTaskError> {
        let vector = self.embedder.embed(query).await?;
        self.index.query(&vector, self.top_k, owner_id).await
    }

    pub async fn answer(&self, owner_id: &str, query: &str) -> Result<String, IntelliTaskError> {
        let matches = self.retrieve(owner_id, query).await?;
        debug!(owner_id, matches = matches.len(), "retrieved todo context");

        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_prompt(query, &format_context(&matches))),
        ];
        self.chat.complete(&messages).await
    }
}

pub fn format_context(matches: &[VectorMatch]) -> String {
    if matches.is_empty() {
        return NO_CONTEXT.to_string();
    }
    matches
        .iter()
        .map(|m| {
            format!(
                "- Title: {}\n  Description: {}",
                m.metadata.title, m.metadata.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_prompt(query: &str, context: &str) -> String {
    format!(
        r#"You are IntelliTask, an assistant dedicated to this Todo application. You only help the user with their todos and with using this application.

USER QUERY: "{query}"

RELEVANT TODO CONTEXT:
{context}

RULES:
1. If the query is not about the user's todos, their todo list, or how to use this application (for example general knowledge, geography or sports), politely decline with exactly: "{OUT_OF_SCOPE_REPLY}"
2. If the user asks how to create, edit or delete a task, describe the steps in the app: fill in a title and description in the form and press "Add Todo"; use the edit and delete actions on a todo card to change or remove it.
3. Answer questions about existing todos only from the context above.
4. Be professional, friendly and concise."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matched(title: &str, description: &str) -> VectorMatch {
        VectorMatch {
            id: "id".to_string(),
            score: 1.0,
            metadata: TodoMetadata {
                user_id: "u".to_string(),
                email: "a@x.com".to_string(),
                title: title.to_string(),
                description: description.to_string(),
            },
        }
    }

    #[test]
    fn test_context_lists_matches() {
        let context = format_context(&[matched("Buy milk", "2 liters"), matched("Call mom", "Sunday")]);
        assert_eq!(
            context,
            "- Title: Buy milk\n  Description: 2 liters\n\n- Title: Call mom\n  Description: Sunday"
        );
    }

    #[test]
    fn test_empty_context() {
        assert_eq!(format_context(&[]), NO_CONTEXT);
    }

    #[test]
    fn test_prompt_embeds_query_context_and_refusal() {
        let prompt = build_prompt("what is due?", "- Title: Buy milk");
        assert!(prompt.contains("USER QUERY: \"what is due?\""));
        assert!(prompt.contains("- Title: Buy milk"));
        assert!(prompt.contains(OUT_OF_SCOPE_REPLY));
    }
}
