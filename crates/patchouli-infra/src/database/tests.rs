use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use uuid::Uuid;

use patchouli_core::domain::{Post, PostStatus, User};
use patchouli_core::error::StoreError;
use patchouli_core::ports::PostStore;

use super::entity::{post, user};
use super::postgres_store::PostgresPostStore;

fn post_model(id: Uuid, status: &str) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        author_id: Uuid::new_v4(),
        title: "Auto Backup Script".to_owned(),
        body: "Backs up the world folder on a timer.".to_owned(),
        tags: serde_json::json!(["script"]),
        attachments: serde_json::json!([]),
        search_clues: Some("backup, snapshot".to_owned()),
        status: status.to_owned(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn get_post_maps_json_columns() {
    let post_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(post_id, "pending")]])
        .into_connection();

    let store = PostgresPostStore::new(db);
    let result: Option<Post> = store.get_post(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.id, post_id);
    assert_eq!(post.title, "Auto Backup Script");
    assert_eq!(post.tags, vec!["script".to_owned()]);
    assert_eq!(post.status, PostStatus::Pending);
    assert_eq!(post.search_clues.as_deref(), Some("backup, snapshot"));
}

#[tokio::test]
async fn set_status_returns_updated_row() {
    let post_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .append_query_results(vec![vec![post_model(post_id, "published")]])
        .into_connection();

    let store = PostgresPostStore::new(db);
    let post = store
        .set_status(post_id, PostStatus::Published, PostStatus::Pending)
        .await
        .unwrap();

    assert_eq!(post.status, PostStatus::Published);
}

#[tokio::test]
async fn set_status_on_decided_post_is_a_conflict() {
    let post_id = Uuid::new_v4();
    // The conditional UPDATE misses, then the row turns out to still exist
    // with another status - that's a lost race, not a missing post.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .append_query_results(vec![vec![post_model(post_id, "published")]])
        .into_connection();

    let store = PostgresPostStore::new(db);
    let err = store
        .set_status(post_id, PostStatus::Rejected, PostStatus::Pending)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::StatusConflict));
}

#[tokio::test]
async fn set_status_on_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .append_query_results(vec![Vec::<post::Model>::new()])
        .into_connection();

    let store = PostgresPostStore::new(db);
    let err = store
        .set_status(Uuid::new_v4(), PostStatus::Published, PostStatus::Pending)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::NotFound));
}

#[tokio::test]
async fn delete_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let store = PostgresPostStore::new(db);
    let err = store.delete_post(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
}

#[tokio::test]
async fn get_user_maps_role_string() {
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user::Model {
            id: user_id,
            name: "koishi".to_owned(),
            avatar_url: None,
            role: "admin".to_owned(),
            is_banned: false,
            created_at: Utc::now().into(),
        }]])
        .into_connection();

    let store = PostgresPostStore::new(db);
    let result: Option<User> = store.get_user(user_id).await.unwrap();

    let fetched = result.unwrap();
    assert!(fetched.is_admin());
    assert!(!fetched.is_banned);
}
