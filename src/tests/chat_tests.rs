use crate::core::assistant::NO_CONTEXT;
use crate::core::errors::IntelliTaskError;
use crate::tests::{
    create_test_service, create_test_service_with_assistant, create_test_service_with_embedder, signed_up,
    slow_embedder,
};
use std::time::Duration;

#[tokio::test]
async fn test_chat_context_is_owner_scoped() {
    let (service, _index) = create_test_service_with_assistant();
    let alice = signed_up(&service, "alice@example.com", "+15551234567").await;
    let bob = signed_up(&service, "bob@example.com", "+15557654321").await;

    service.create_todo(&alice, Some("Buy milk"), Some("2 liters")).await.unwrap();
    service.create_todo(&bob, Some("Secret plan"), Some("bob only")).await.unwrap();

    let reply = service.chat(&alice, Some("What do I need to buy?")).await.unwrap();
    assert!(reply.contains("What do I need to buy?"));
    assert!(reply.contains("Buy milk"));
    assert!(!reply.contains("Secret plan"));
}

#[tokio::test]
async fn test_chat_without_todos_reports_no_context() {
    let (service, _index) = create_test_service_with_assistant();
    let alice = signed_up(&service, "alice@example.com", "+15551234567").await;

    let reply = service.chat(&alice, Some("anything due?")).await.unwrap();
    assert!(reply.contains(NO_CONTEXT));
}

#[tokio::test]
async fn test_todo_changes_follow_into_the_index() {
    let (service, index) = create_test_service_with_assistant();
    let alice = signed_up(&service, "alice@example.com", "+15551234567").await;

    let todo = service.create_todo(&alice, Some("Buy milk"), Some("2 liters")).await.unwrap();
    assert_eq!(index.len().await, 1);

    service
        .update_todo(&alice, &todo.id, Some("Buy bread"), Some("whole wheat"))
        .await
        .unwrap();
    assert_eq!(index.len().await, 1);
    let reply = service.chat(&alice, Some("what should I buy?")).await.unwrap();
    assert!(reply.contains("Buy bread"));
    assert!(!reply.contains("Buy milk"));

    service.delete_todo(&alice, &todo.id).await.unwrap();
    assert!(index.is_empty().await);
    let reply = service.chat(&alice, Some("what should I buy?")).await.unwrap();
    assert!(reply.contains(NO_CONTEXT));
}

#[tokio::test]
async fn test_chat_requires_message() {
    let (service, _index) = create_test_service_with_assistant();
    let alice = signed_up(&service, "alice@example.com", "+15551234567").await;

    match service.chat(&alice, Some("   ")).await {
        Err(IntelliTaskError::MissingFields(msg)) => assert_eq!(msg, "Message is required"),
        other => panic!("expected MissingFields, got {:?}", other),
    }
}

#[tokio::test]
async fn test_chat_without_assistant_is_not_configured() {
    let service = create_test_service();
    let alice = signed_up(&service, "alice@example.com", "+15551234567").await;

    assert!(!service.assistant_enabled());
    let result = service.chat(&alice, Some("hello")).await;
    assert!(matches!(result, Err(IntelliTaskError::AssistantNotConfigured)));
    // Todos still work without an assistant.
    service.create_todo(&alice, Some("Buy milk"), Some("2 liters")).await.unwrap();
}

#[tokio::test]
async fn test_delete_during_update_sync_leaves_no_vector() {
    let (service, index) =
        create_test_service_with_embedder(slow_embedder("Buy bread", Duration::from_millis(100)));
    let alice = signed_up(&service, "alice@example.com", "+15551234567").await;
    let todo = service.create_todo(&alice, Some("Buy milk"), Some("2 liters")).await.unwrap();

    // The update's storage write lands first, then its embedding stalls while the delete completes.
    let (updated, deleted) = tokio::join!(
        service.update_todo(&alice, &todo.id, Some("Buy bread"), Some("whole wheat")),
        async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            service.delete_todo(&alice, &todo.id).await
        }
    );
    assert_eq!(updated.unwrap().title, "Buy bread");
    assert_eq!(deleted.unwrap().id, todo.id);

    assert!(service.list_todos(&alice).await.unwrap().is_empty());
    assert!(index.is_empty().await);
    let reply = service.chat(&alice, Some("what should I buy?")).await.unwrap();
    assert!(!reply.contains("Buy bread"));
    assert!(reply.contains(NO_CONTEXT));
}
