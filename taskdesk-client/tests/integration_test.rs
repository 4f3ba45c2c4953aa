//! End-to-end tests: view model over the HTTP repository over a live service
//!
//! These exercise the full create/update/delete cycle with refetch after every
//! successful mutation, the way the `taskdesk` binary drives it.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::TestContext;
use taskdesk_client::{
    notification::{self, Notification, NotificationLevel},
    presentation,
    repository::HttpTaskRepository,
    view_model::{ListView, TaskViewModel, ViewState, EMPTY_STATE_MESSAGE},
};
use taskdesk_shared::models::task::{TaskFields, TaskPriority, TaskStatus};

#[tokio::test]
async fn test_write_spec_lifecycle() {
    let ctx = TestContext::signed_in().await.unwrap();
    let (tx, mut rx) = notification::channel();
    let mut vm = TaskViewModel::new(HttpTaskRepository::new(ctx.api.clone()), tx);

    vm.load().await;
    assert_eq!(vm.list_view(), ListView::Empty);
    assert_eq!(
        presentation::render_list(&vm.list_view(), Utc::now()),
        EMPTY_STATE_MESSAGE
    );

    // Create a high priority todo due tomorrow
    let due = Utc::now() + Duration::hours(20);
    let fields = TaskFields::new("Write spec", due).with_priority(TaskPriority::High);
    let created = vm.create_or_update(&fields, None).await.unwrap();

    assert_eq!(
        notification::drain(&mut rx),
        vec![Notification::success("Task created successfully!")]
    );
    assert_eq!(vm.filter(), TaskStatus::Todo);
    assert_eq!(vm.filtered().len(), 1);
    assert_eq!(vm.due_soon(Utc::now()).len(), 1);
    let rendered = presentation::render_list(&vm.list_view(), Utc::now());
    assert!(rendered.contains("Write spec"));
    assert!(rendered.contains("High Priority"));
    assert!(rendered.contains(presentation::DUE_SOON_MARKER));

    // Complete it: it leaves the todo view and shows up under completed
    let mut fields = TaskFields::from(vm.find(&created.id).unwrap());
    fields.status = TaskStatus::Completed;
    vm.create_or_update(&fields, Some(&created.id)).await.unwrap();

    assert_eq!(
        notification::drain(&mut rx),
        vec![Notification::success("Task updated successfully!")]
    );
    assert_eq!(vm.list_view(), ListView::Empty);
    vm.set_filter(TaskStatus::Completed).unwrap();
    let completed = vm.filtered();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, created.id);

    // Delete it
    vm.delete_task(&created.id).await.unwrap();

    assert_eq!(
        notification::drain(&mut rx),
        vec![Notification::success("Task deleted successfully!")]
    );
    assert!(vm.tasks().is_empty());
    assert_eq!(vm.filter(), TaskStatus::Completed);
    assert!(ctx.service.stored_tasks().is_empty());
}

#[tokio::test]
async fn test_view_matches_server_after_each_mutation() {
    let ctx = TestContext::signed_in().await.unwrap();
    let (tx, _rx) = notification::channel();
    let mut vm = TaskViewModel::new(HttpTaskRepository::new(ctx.api.clone()), tx);
    vm.load().await;

    let due = Utc::now() + Duration::days(3);
    let statuses = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Todo,
    ];

    let mut ids = Vec::new();
    for (i, status) in statuses.into_iter().enumerate() {
        let fields = TaskFields::new(format!("task {}", i), due).with_status(status);
        ids.push(vm.create_or_update(&fields, None).await.unwrap().id);
        assert_eq!(vm.tasks(), ctx.service.stored_tasks().as_slice());
    }

    let mut fields = TaskFields::from(vm.find(&ids[1]).unwrap());
    fields.title = "renamed".to_string();
    vm.create_or_update(&fields, Some(&ids[1])).await.unwrap();
    assert_eq!(vm.tasks(), ctx.service.stored_tasks().as_slice());

    vm.delete_task(&ids[0]).await.unwrap();
    assert_eq!(vm.tasks(), ctx.service.stored_tasks().as_slice());

    for status in TaskStatus::ALL {
        vm.set_filter(status).unwrap();
        assert!(vm.filtered().iter().all(|t| t.status == status));
    }
    vm.set_filter(TaskStatus::Todo).unwrap();
    assert_eq!(vm.filtered().len(), 1);
}

#[tokio::test]
async fn test_failed_save_keeps_state_and_notifies() {
    let ctx = TestContext::signed_in().await.unwrap();
    let (tx, mut rx) = notification::channel();
    let mut vm = TaskViewModel::new(HttpTaskRepository::new(ctx.api.clone()), tx);
    vm.load().await;
    let before = vm.state().clone();

    ctx.service
        .fail_next(StatusCode::BAD_REQUEST, r#"{"message":"Title required"}"#);
    let fields = TaskFields::new("rejected", Utc::now() + Duration::days(1));
    let err = vm.create_or_update(&fields, None).await.unwrap_err();

    assert_eq!(err.to_string(), "Title required");
    assert_eq!(vm.state(), &before);
    let notes = notification::drain(&mut rx);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Error);
    assert_eq!(notes[0].message, "Title required");
}

#[tokio::test]
async fn test_load_without_session_enters_error_state() {
    let ctx = TestContext::new().await.unwrap();
    let (tx, mut rx) = notification::channel();
    let mut vm = TaskViewModel::new(HttpTaskRepository::new(ctx.api.clone()), tx);

    vm.load().await;

    assert_eq!(
        vm.state(),
        &ViewState::Error("Please authenticate".to_string())
    );
    assert_eq!(
        presentation::render_list(&vm.list_view(), Utc::now()),
        "Error: Please authenticate"
    );
    assert_eq!(
        notification::drain(&mut rx),
        vec![Notification::error("Please authenticate")]
    );
}

#[tokio::test]
async fn test_users_see_only_their_tasks() {
    let alice = TestContext::signed_in().await.unwrap();
    alice
        .api
        .create_task(&TaskFields::new("alice's", Utc::now() + Duration::days(1)))
        .await
        .unwrap();

    // Second user on the same service
    let (session, api) = alice.reload().await.unwrap();
    taskdesk_client::auth::sign_up(&api, &session, &common::test_credentials())
        .await
        .unwrap();

    let (tx, _rx) = notification::channel();
    let mut vm = TaskViewModel::new(HttpTaskRepository::new(api), tx);
    vm.load().await;

    assert!(vm.tasks().is_empty());
    assert_eq!(alice.api.list_tasks().await.unwrap().len(), 1);
}
