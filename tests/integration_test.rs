use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use s3_gallery::{Config, GalleryEntry, ObjectStore, Operation, PageData, SignedUrl, StoredObject};

/// In-memory stand-in for the object store. Signing is a deterministic
/// string derivation; listing returns whatever was "uploaded".
#[derive(Default)]
struct FakeStore {
    objects: Mutex<Vec<StoredObject>>,
    fail_list: AtomicBool,
    fail_get_presign: AtomicBool,
    fail_put_presign: AtomicBool,
}

impl FakeStore {
    fn upload(&self, key: &str, size: i64) {
        self.objects.lock().unwrap().push(StoredObject {
            key: key.to_string(),
            size,
            last_modified: Some(Utc::now()),
        });
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn presign(
        &self,
        key: &str,
        operation: Operation,
        expires_in: Duration,
    ) -> Result<SignedUrl> {
        let fail = match operation {
            Operation::Get => self.fail_get_presign.load(Ordering::SeqCst),
            Operation::Put => self.fail_put_presign.load(Ordering::SeqCst),
        };
        if fail {
            anyhow::bail!("signing credentials unavailable");
        }

        Ok(SignedUrl {
            url: format!(
                "https://fake-store.test/{}?op={}&expires={}",
                key,
                operation,
                expires_in.as_secs()
            ),
            expires_at: Utc::now() + expires_in,
        })
    }

    async fn list_objects(&self) -> Result<Vec<StoredObject>> {
        if self.fail_list.load(Ordering::SeqCst) {
            anyhow::bail!("bucket unavailable");
        }
        Ok(self.objects.lock().unwrap().clone())
    }
}

fn router(store: Arc<FakeStore>) -> axum::Router {
    let config = Arc::new(Config::new("test-bucket".to_string()).unwrap());
    s3_gallery::server::create_router(store, config)
}

async fn fetch_page_data(app: &axum::Router) -> PageData {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/page")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn fetch_html(app: &axum::Router) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_upload_key_unique_across_renders() {
    let app = router(Arc::new(FakeStore::default()));

    let first = fetch_page_data(&app).await;
    let second = fetch_page_data(&app).await;

    assert_ne!(first.upload.key, second.upload.key);
    assert!(first.upload.url.contains(&first.upload.key));
}

#[tokio::test]
async fn test_round_trip_uploaded_key_appears_in_gallery() {
    let store = Arc::new(FakeStore::default());
    let app = router(store.clone());

    let page = fetch_page_data(&app).await;
    assert!(page.images.is_empty());

    // Simulate the client completing the PUT for an image-suffixed key
    let key = format!("{}.png", page.upload.key);
    store.upload(&key, 2048);

    let next = fetch_page_data(&app).await;
    let keys: Vec<&str> = next.images.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec![key.as_str()]);
    assert!(next.images[0].url.contains(&key));
}

#[tokio::test]
async fn test_gallery_filters_and_caps_entries() {
    let store = Arc::new(FakeStore::default());
    for i in 0..25 {
        store.upload(&format!("img-{:02}.PNG", i), 100);
    }
    store.upload("notes.txt", 100);
    store.upload("archive.zip", 100);
    let app = router(store);

    let page = fetch_page_data(&app).await;

    assert_eq!(page.images.len(), 20);
    assert!(page.images.iter().all(|e| e.key.to_lowercase().ends_with(".png")));
}

#[tokio::test]
async fn test_list_failure_renders_empty_gallery() {
    let store = Arc::new(FakeStore::default());
    store.upload("a.png", 100);
    store.fail_list.store(true, Ordering::SeqCst);
    let app = router(store);

    let (status, html) = fetch_html(&app).await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("No images uploaded yet"));
    assert!(html.contains("fake-store.test"));
}

#[tokio::test]
async fn test_item_signing_failure_blanks_gallery_but_render_succeeds() {
    let store = Arc::new(FakeStore::default());
    store.upload("a.png", 100);
    store.fail_get_presign.store(true, Ordering::SeqCst);
    let app = router(store);

    let page = fetch_page_data(&app).await;

    // The put URL is still issued; the read batch dropped as a whole
    assert!(page.images.is_empty());
    assert!(page.upload.url.contains("op=put"));
}

#[tokio::test]
async fn test_upload_signing_failure_fails_render() {
    let store = Arc::new(FakeStore::default());
    store.fail_put_presign.store(true, Ordering::SeqCst);
    let app = router(store);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_html_page_embeds_gallery_and_upload_url() {
    let store = Arc::new(FakeStore::default());
    store.upload("photos/a.png", 1024 * 1024);
    let app = router(store);

    let (status, html) = fetch_html(&app).await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("op=put"));
    assert!(html.contains("photos/a.png"));
    assert!(html.contains("Your Images (1)"));
}

#[tokio::test]
async fn test_health_check() {
    let app = router(Arc::new(FakeStore::default()));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[test]
fn test_gallery_entry_filename() {
    let entry = GalleryEntry {
        key: "a.png".to_string(),
        url: String::new(),
        size: 0,
        last_modified: None,
    };
    assert_eq!(entry.filename(), "a.png");
}
