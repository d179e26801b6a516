use std::sync::Arc;

use admin::entity::{AssetRef, Course, CourseDraft};
use admin::error::AdminError;
use admin::repository::Repository;
use admin::workflow::{AlwaysConfirm, DeleteOutcome, NeverConfirm, Upload};
use common::storage::{ObjectPath, ObjectStore};

use crate::common::TestApp;

async fn created_course(app: &TestApp) -> Course {
    app.orchestrator::<Course>()
        .create(
            CourseDraft {
                name: "Delete me".into(),
                code: "DEL1".into(),
                description: "Short lived".into(),
                image: AssetRef::Pending,
            },
            Some(Upload::new("cover.png", b"PNG".to_vec())),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn delete_removes_asset_then_record() {
    let app = TestApp::spawn().await;
    let course = created_course(&app).await;
    let path = app.path_of(course.image.url().unwrap());

    let outcome = app
        .orchestrator::<Course>()
        .delete(course.id, &course.image, &AlwaysConfirm)
        .await
        .unwrap();

    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert_eq!(app.store.removed(), vec![path.clone()]);
    assert!(!app.store.exists(&path).await.unwrap());

    let result = app.repo::<Course>().get(course.id).await;
    assert!(matches!(result, Err(AdminError::NotFound(_))));
}

#[tokio::test]
async fn declined_confirmation_makes_no_calls() {
    let app = TestApp::spawn().await;
    let course = created_course(&app).await;
    let calls_before = app.calls().len();

    let outcome = app
        .orchestrator::<Course>()
        .delete(course.id, &course.image, &NeverConfirm)
        .await
        .unwrap();

    assert_eq!(outcome, DeleteOutcome::Cancelled);
    assert_eq!(app.calls().len(), calls_before);
    assert!(app.store.removed().is_empty());
    assert!(app.record("course", course.id).is_some());
}

#[tokio::test]
async fn delete_by_id_confirms_before_any_call() {
    let app = TestApp::spawn().await;
    let course = created_course(&app).await;
    let calls_before = app.calls().len();

    let outcome = app
        .orchestrator::<Course>()
        .delete_by_id(course.id, &NeverConfirm)
        .await
        .unwrap();

    assert_eq!(outcome, DeleteOutcome::Cancelled);
    assert_eq!(app.calls().len(), calls_before);
    assert!(app.store.removed().is_empty());
}

#[tokio::test]
async fn delete_by_id_reads_the_asset_after_confirming() {
    let app = TestApp::spawn().await;
    let course = created_course(&app).await;
    let path = app.path_of(course.image.url().unwrap());
    let calls_before = app.calls().len();

    let outcome = app
        .orchestrator::<Course>()
        .delete_by_id(course.id, &AlwaysConfirm)
        .await
        .unwrap();

    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert_eq!(
        app.calls()[calls_before..],
        [
            format!("GET /course/{}", course.id),
            format!("DELETE /course/{}", course.id),
        ]
    );
    assert_eq!(app.store.removed(), vec![path]);
}

#[tokio::test]
async fn pending_record_deletes_without_touching_store() {
    let app = TestApp::spawn().await;
    let id = app.course_seed("pending");

    app.orchestrator::<Course>()
        .delete(id, &AssetRef::Pending, &AlwaysConfirm)
        .await
        .unwrap();

    assert!(app.store.removed().is_empty());
    assert!(app.record("course", id).is_none());
}

#[tokio::test]
async fn record_delete_failure_is_surfaced_after_asset_removal() {
    let app = TestApp::spawn().await;
    let course = created_course(&app).await;
    app.fail_deletes();

    let result = app
        .orchestrator::<Course>()
        .delete(course.id, &course.image, &AlwaysConfirm)
        .await;

    assert!(matches!(result, Err(AdminError::Network(_))));
    // Accepted gap: the asset is gone while the record still points at it.
    assert_eq!(app.store.removed().len(), 1);
    assert!(app.record("course", course.id).is_some());
}

#[tokio::test]
async fn removing_an_absent_path_is_not_an_error() {
    let app = TestApp::spawn().await;
    let path = ObjectPath::parse("course/77/1-never-uploaded.png").unwrap();

    app.store.remove(&[path.clone()]).await.unwrap();
    assert!(!app.store.exists(&path).await.unwrap());
}

#[tokio::test]
async fn concurrent_save_on_same_form_is_busy() {
    let app = TestApp::spawn().await;
    let orchestrator = Arc::new(app.orchestrator::<Course>());
    let id = app.course_seed("pending");

    let first = orchestrator.delete(id, &AssetRef::Pending, &AlwaysConfirm);
    let second = orchestrator.delete(id, &AssetRef::Pending, &AlwaysConfirm);
    let (a, b) = tokio::join!(first, second);

    assert!(a.is_ok());
    assert!(matches!(b, Err(AdminError::Busy)));
    assert!(!orchestrator.is_busy());
}
