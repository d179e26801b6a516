use admin::entity::{
    AssetRef, Assignment, AssignmentDraft, Badge, BadgeDraft, BadgeType, Course, CourseDraft,
};
use admin::error::AdminError;
use admin::workflow::Upload;
use common::retry::RetryPolicy;
use common::storage::ObjectStore;

use crate::common::{BUCKET, PUBLIC_BASE, TestApp};

fn course_draft() -> CourseDraft {
    CourseDraft {
        name: "Rust for Operators".into(),
        code: "RS101".into(),
        description: "Ownership, borrowing and async".into(),
        image: AssetRef::Pending,
    }
}

fn badge_draft() -> BadgeDraft {
    BadgeDraft {
        name: "First Steps".into(),
        image: AssetRef::Pending,
        badge_type: BadgeType::Beginner,
        course_id: 1,
        chapter_id: 2,
    }
}

mod create_course {
    use super::*;

    #[tokio::test]
    async fn stored_url_resolves_to_uploaded_bytes() {
        let app = TestApp::spawn().await;
        let orchestrator = app.orchestrator::<Course>();

        let course = orchestrator
            .create(course_draft(), Some(Upload::new("cover.png", b"PNG".to_vec())))
            .await
            .unwrap();

        let url = course.image.url().expect("image should be set");
        assert!(url.starts_with(&format!("{PUBLIC_BASE}/{BUCKET}/course/{}/", course.id)));
        assert!(url.ends_with("-cover.png"));

        let path = app.path_of(url);
        assert_eq!(app.store.get(&path).await.unwrap(), b"PNG");
        assert_eq!(app.record("course", course.id).unwrap()["image"], url);
    }

    #[tokio::test]
    async fn intro_course_with_png_is_stored_under_course_segment() {
        let app = TestApp::spawn().await;
        let draft = CourseDraft {
            name: "Intro".into(),
            code: "C1".into(),
            description: "D".into(),
            image: AssetRef::Pending,
        };
        let png = vec![0x89; 10 * 1024];

        let course = app
            .orchestrator::<Course>()
            .create(draft, Some(Upload::new("intro.png", png.clone())))
            .await
            .unwrap();

        let stored = app.record("course", course.id).unwrap();
        assert_eq!(stored["name"], "Intro");
        assert_eq!(stored["code"], "C1");
        assert_eq!(stored["description"], "D");
        let url = stored["image"].as_str().unwrap();
        assert!(url.contains("course/"));
        assert_eq!(app.store.get(&app.path_of(url)).await.unwrap(), png);
    }

    #[tokio::test]
    async fn oversized_file_is_rejected_and_record_removed() {
        let app = TestApp::spawn().await;

        let result = app
            .orchestrator::<Course>()
            .create(
                course_draft(),
                Some(Upload::new("huge.png", vec![0; 2 * 1024 * 1024])),
            )
            .await;

        assert!(matches!(result, Err(AdminError::Store(_))));
        let calls = app.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].starts_with("DELETE /course/"));
    }

    #[tokio::test]
    async fn calls_follow_create_upload_patch_read_order() {
        let app = TestApp::spawn().await;
        let orchestrator = app.orchestrator::<Course>();

        let course = orchestrator
            .create(course_draft(), Some(Upload::new("cover.png", b"PNG".to_vec())))
            .await
            .unwrap();

        let id = course.id;
        assert_eq!(
            app.calls(),
            vec![
                "POST /course".to_string(),
                format!("PUT /course/{id}"),
                format!("GET /course/{id}"),
            ]
        );
        assert_eq!(app.store.uploaded().len(), 1);
    }

    #[tokio::test]
    async fn session_token_is_sent_as_bearer() {
        let app = TestApp::spawn().await;
        app.orchestrator::<Course>()
            .create(course_draft(), Some(Upload::new("cover.png", b"PNG".to_vec())))
            .await
            .unwrap();

        assert_eq!(app.last_auth().as_deref(), Some("Bearer test-token"));
    }

    #[tokio::test]
    async fn blank_name_is_rejected_before_any_call() {
        let app = TestApp::spawn().await;
        let draft = CourseDraft {
            name: "   ".into(),
            ..course_draft()
        };

        let result = app
            .orchestrator::<Course>()
            .create(draft, Some(Upload::new("cover.png", b"PNG".to_vec())))
            .await;

        assert!(matches!(result, Err(AdminError::Validation(_))));
        assert!(app.calls().is_empty());
        assert!(app.store.uploaded().is_empty());
    }

    #[tokio::test]
    async fn server_validation_is_reported_without_upload() {
        let app = TestApp::spawn().await;
        let draft = CourseDraft {
            code: "DUP".into(),
            ..course_draft()
        };

        let result = app
            .orchestrator::<Course>()
            .create(draft, Some(Upload::new("cover.png", b"PNG".to_vec())))
            .await;

        match result {
            Err(AdminError::Validation(msg)) => assert_eq!(msg, "Course code already exists"),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(app.store.uploaded().is_empty());
    }

    #[tokio::test]
    async fn create_failure_aborts_before_upload() {
        let app = TestApp::spawn().await;
        app.fail_posts();

        let result = app
            .orchestrator::<Course>()
            .create(course_draft(), Some(Upload::new("cover.png", b"PNG".to_vec())))
            .await;

        assert!(matches!(result, Err(AdminError::Network(_))));
        assert!(app.store.uploaded().is_empty());
    }
}

mod missing_asset {
    use super::*;

    #[tokio::test]
    async fn badge_without_image_makes_no_calls() {
        let app = TestApp::spawn().await;

        let result = app.orchestrator::<Badge>().create(badge_draft(), None).await;

        assert!(matches!(result, Err(AdminError::MissingAsset(kind)) if kind.as_str() == "badge"));
        assert!(app.calls().is_empty());
        assert!(app.store.uploaded().is_empty());
    }

    #[tokio::test]
    async fn assignment_without_file_keeps_pending() {
        let app = TestApp::spawn().await;
        let draft = AssignmentDraft {
            chapter_id: 4,
            instruction: "Write a parser".into(),
            file_url: AssetRef::Pending,
        };

        let assignment = app
            .orchestrator::<Assignment>()
            .create(draft, None)
            .await
            .unwrap();

        assert!(assignment.file_url.is_pending());
        assert_eq!(app.record("assignment", assignment.id).unwrap()["fileUrl"], "pending");
        assert!(app.store.uploaded().is_empty());
    }
}

mod upload_failure {
    use super::*;

    #[tokio::test]
    async fn failed_upload_leaves_no_record() {
        let app = TestApp::spawn().await;
        app.fail_uploads();

        let result = app
            .orchestrator::<Badge>()
            .create(badge_draft(), Some(Upload::new("badge.png", b"PNG".to_vec())))
            .await;

        assert!(matches!(result, Err(AdminError::Store(_))));
        let calls = app.calls();
        assert_eq!(calls[0], "POST /badge");
        assert!(calls[1].starts_with("DELETE /badge/"));
        assert!(!calls.iter().any(|c| c.starts_with("PUT")));

        let listed = app.api.repository::<Badge>();
        let badges = admin::repository::Repository::list(&listed).await.unwrap();
        assert!(badges.is_empty());
    }

    #[tokio::test]
    async fn failed_cleanup_still_reports_the_upload_error() {
        let app = TestApp::spawn().await;
        app.fail_uploads();
        app.fail_deletes();

        let result = app
            .orchestrator::<Badge>()
            .create(badge_draft(), Some(Upload::new("badge.png", b"PNG".to_vec())))
            .await;

        assert!(matches!(result, Err(AdminError::Store(_))));
        let calls = app.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].starts_with("DELETE /badge/"));
        // The compensating delete failed, so the pending record survives.
        let id: i32 = calls[1].rsplit('/').next().unwrap().parse().unwrap();
        assert_eq!(app.record("badge", id).unwrap()["image"], "pending");
    }
}

mod patch_retry {
    use super::*;

    #[tokio::test]
    async fn transient_patch_failures_are_retried() {
        let app = TestApp::spawn().await;
        app.fail_next_puts(2);

        let course = app
            .orchestrator_with_retry::<Course>(RetryPolicy::immediate(3))
            .create(course_draft(), Some(Upload::new("cover.png", b"PNG".to_vec())))
            .await
            .unwrap();

        assert!(course.image.url().is_some());
        let puts = app.calls().iter().filter(|c| c.starts_with("PUT")).count();
        assert_eq!(puts, 3);
    }

    #[tokio::test]
    async fn exhausted_patch_reports_partial_save() {
        let app = TestApp::spawn().await;
        app.fail_next_puts(10);

        let result = app
            .orchestrator_with_retry::<Course>(RetryPolicy::immediate(3))
            .create(course_draft(), Some(Upload::new("cover.png", b"PNG".to_vec())))
            .await;

        let (id, url) = match result {
            Err(AdminError::PartialSave {
                id, url, attempts, ..
            }) => {
                assert_eq!(attempts, 3);
                (id, url)
            }
            other => panic!("expected partial save, got {other:?}"),
        };

        // The record exists with the sentinel and the object is in the bucket.
        assert_eq!(app.record("course", id).unwrap()["image"], "pending");
        assert!(app.store.exists(&app.path_of(&url)).await.unwrap());
    }
}
