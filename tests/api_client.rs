//! HttpLectureApi against an in-process axum server standing in for the
//! remote lessons API.

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use lecture_core::{LessonRecord, SubtitleId};
use lecture_viewer::config::ApiConfig;
use lecture_viewer::{ApiBody, ApiError, HttpLectureApi, LectureApi, LessonLookup, SubtitleUpload};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Recorded {
    uploads: Vec<HashMap<String, String>>,
    deleted_subtitles: Vec<String>,
    created: Vec<serde_json::Value>,
    queries: Vec<HashMap<String, String>>,
}

type Shared = Arc<Mutex<Recorded>>;
type Params = Query<HashMap<String, String>>;

async fn list_audio_files() -> Json<serde_json::Value> {
    Json(json!([{"key": "240426.wav"}, {"key": "240502.wav"}]))
}

async fn list_lessons() -> Json<serde_json::Value> {
    Json(json!([
        {"video_id": "240426.wav", "title": "Subjuntivo", "teacher_name": null,
         "subtitles_status": "1", "comprehension_level": 80}
    ]))
}

async fn get_lesson(Query(params): Params) -> Response {
    match params.get("video_id").map(String::as_str) {
        Some("240426.wav") => Json(json!({
            "video_id": "240426.wav", "title": "Subjuntivo", "teacher_name": "Ana",
            "keywords": "ser, estar", "subtitles_status": 1, "comprehension_level": 80
        }))
        .into_response(),
        Some("broken.wav") => (StatusCode::OK, "<html>oops</html>").into_response(),
        _ => (StatusCode::NOT_FOUND, "Lesson not found").into_response(),
    }
}

async fn create_lesson(State(state): State<Shared>, Json(body): Json<serde_json::Value>) -> &'static str {
    state.lock().unwrap().created.push(body);
    "Lesson created successfully"
}

async fn update_lesson(Json(_body): Json<serde_json::Value>) -> Json<serde_json::Value> {
    Json(json!({"message": "Lesson updated"}))
}

async fn delete_lesson(Query(_params): Params) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"message": "database unavailable"}))).into_response()
}

async fn get_audio(Query(params): Params) -> Response {
    match params.get("file").map(String::as_str) {
        Some("240426.wav") => vec![0x52u8, 0x49, 0x46, 0x46].into_response(),
        _ => (StatusCode::NOT_FOUND, "").into_response(),
    }
}

async fn get_subtitles(State(state): State<Shared>, Query(params): Params) -> Json<serde_json::Value> {
    state.lock().unwrap().queries.push(params);
    Json(json!([
        {"id": 7, "start_time": 1.5, "end_time": 4.0, "text": "Hola"},
        {"id": "abc", "start_time": "5", "end_time": 9.0, "text": null},
        {"start_time": 10.0, "end_time": 12.0, "text": "sin id"}
    ]))
}

async fn upload_subtitle(State(state): State<Shared>, mut multipart: Multipart) -> Response {
    let mut fields = HashMap::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.unwrap_or_default();
        fields.insert(name, value);
    }
    let rejected = fields.get("subtitle").map_or(true, |text| text == "reject me");
    state.lock().unwrap().uploads.push(fields);
    if rejected {
        (StatusCode::BAD_REQUEST, "Subtitle text is required").into_response()
    } else {
        Json(json!({"success": true})).into_response()
    }
}

async fn delete_subtitle(State(state): State<Shared>, Query(params): Params) -> StatusCode {
    let id = params.get("id").cloned().unwrap_or_default();
    state.lock().unwrap().deleted_subtitles.push(id);
    StatusCode::NO_CONTENT
}

async fn photos_by_date(Query(params): Params) -> Json<serde_json::Value> {
    let date = params.get("date").cloned().unwrap_or_default();
    Json(json!([
        {"key": format!("{}_1.jpg", date), "url": format!("/photos/{}_1.jpg", date)},
        {"key": format!("{}_2.jpg", date), "url": "https://cdn.example.com/2.jpg"}
    ]))
}

async fn spawn_fake_api() -> (HttpLectureApi, Shared) {
    let state: Shared = Arc::default();
    let app = Router::new()
        .route("/api/list-audio-files", get(list_audio_files))
        .route("/api/lecciones", get(list_lessons))
        .route("/api/lecciones/get", get(get_lesson))
        .route("/api/lecciones/create", post(create_lesson))
        .route("/api/lecciones/update", put(update_lesson))
        .route("/api/lecciones/delete", delete(delete_lesson))
        .route("/api/get-audio", get(get_audio))
        .route("/api/get-subtitles", get(get_subtitles))
        .route("/api/upload-subtitle", post(upload_subtitle))
        .route("/api/delete-subtitle", delete(delete_subtitle))
        .route("/api/get-photos-by-date", get(photos_by_date))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ApiConfig {
        base_url: format!("http://{}", addr),
        ..ApiConfig::default()
    };
    (HttpLectureApi::new(&config).unwrap(), state)
}

#[tokio::test]
async fn test_lists_recordings_and_lessons() {
    let (api, _) = spawn_fake_api().await;

    let recordings = api.list_recordings().await.unwrap();
    assert_eq!(recordings.len(), 2);
    assert_eq!(recordings[0].key, "240426.wav");

    let lessons = api.list_lessons().await.unwrap();
    assert_eq!(lessons[0].teacher_name, "");
    assert_eq!(lessons[0].subtitles_status, 1);
}

#[tokio::test]
async fn test_get_lesson_found_and_not_found() {
    let (api, _) = spawn_fake_api().await;

    match api.get_lesson("240426.wav").await.unwrap() {
        LessonLookup::Found(record) => {
            assert_eq!(record.title, "Subjuntivo");
            assert_eq!(record.keyword_list(), vec!["ser", "estar"]);
        }
        LessonLookup::NotFound => panic!("expected a lesson record"),
    }

    assert_eq!(api.get_lesson("999999.wav").await.unwrap(), LessonLookup::NotFound);

    let err = api.get_lesson("broken.wav").await.unwrap_err();
    assert!(matches!(err, ApiError::Malformed { .. }));
}

#[tokio::test]
async fn test_lesson_writes_accept_text_or_json() {
    let (api, state) = spawn_fake_api().await;
    let record = LessonRecord {
        video_id: "240502.wav".to_string(),
        title: "Historia".to_string(),
        comprehension_level: 40,
        ..LessonRecord::default()
    };

    let body = api.create_lesson(&record).await.unwrap();
    assert_eq!(body, ApiBody::Text("Lesson created successfully".to_string()));
    let created = state.lock().unwrap().created[0].clone();
    assert_eq!(created["comprehension_level"], json!(40));
    assert_eq!(created["title"], json!("Historia"));

    let body = api.update_lesson(&record).await.unwrap();
    assert_eq!(body.message().as_deref(), Some("Lesson updated"));

    let err = api.delete_lesson("240502.wav").await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.user_message(), "database unavailable");
}

#[tokio::test]
async fn test_subtitles_are_sanitized() {
    let (api, state) = spawn_fake_api().await;

    let subtitles = api.get_subtitles("240426.wav", "es").await.unwrap();
    assert_eq!(subtitles.len(), 3);
    assert_eq!(subtitles[0].id, SubtitleId::persisted("7"));
    assert_eq!(subtitles[1].id, SubtitleId::persisted("abc"));
    assert_eq!(subtitles[1].text, "");
    assert!(subtitles[2].id.is_provisional());

    let query = state.lock().unwrap().queries[0].clone();
    assert_eq!(query.get("video_id").map(String::as_str), Some("240426.wav"));
    assert_eq!(query.get("language").map(String::as_str), Some("es"));
}

#[tokio::test]
async fn test_upload_sends_multipart_fields() {
    let (api, state) = spawn_fake_api().await;
    let upload = SubtitleUpload {
        video_id: "240426.wav".to_string(),
        language: "es".to_string(),
        text: "Buenos días".to_string(),
        start_time: 7.5,
        end_time: 12.5,
    };

    api.upload_subtitle(&upload).await.unwrap();

    let fields = state.lock().unwrap().uploads[0].clone();
    assert_eq!(fields["subtitle"], "Buenos días");
    assert_eq!(fields["video_id"], "240426.wav");
    assert_eq!(fields["language"], "es");
    assert_eq!(fields["start_time"].parse::<f64>().unwrap(), 7.5);
    assert_eq!(fields["end_time"].parse::<f64>().unwrap(), 12.5);
}

#[tokio::test]
async fn test_upload_failure_reports_status() {
    let (api, _) = spawn_fake_api().await;
    let upload = SubtitleUpload {
        video_id: "240426.wav".to_string(),
        language: "es".to_string(),
        text: "reject me".to_string(),
        start_time: 0.0,
        end_time: 1.0,
    };

    let err = api.upload_subtitle(&upload).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.user_message(), "Subtitle text is required");
}

#[tokio::test]
async fn test_delete_subtitle_and_audio() {
    let (api, state) = spawn_fake_api().await;

    api.delete_subtitle("7").await.unwrap();
    assert_eq!(state.lock().unwrap().deleted_subtitles, vec!["7".to_string()]);

    assert_eq!(api.get_audio("240426.wav").await.unwrap(), b"RIFF".to_vec());
    let err = api.get_audio("missing.wav").await.unwrap_err();
    assert_eq!(err.user_message(), "HTTP 404");
}

#[tokio::test]
async fn test_photo_urls_resolve_against_origin() {
    let (api, _) = spawn_fake_api().await;

    let photos = api.photos_by_date("240426").await.unwrap();
    assert_eq!(photos.len(), 2);
    assert_eq!(
        photos[0].resolve_url(api.origin()),
        format!("{}/photos/240426_1.jpg", api.origin())
    );
    assert_eq!(photos[1].resolve_url(api.origin()), "https://cdn.example.com/2.jpg");
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let config = ApiConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        ..ApiConfig::default()
    };
    let api = HttpLectureApi::new(&config).unwrap();
    let err = api.list_recordings().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport { .. }));
}
