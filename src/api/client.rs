//! reqwest-backed implementation of [`LectureApi`]

use async_trait::async_trait;
use lecture_core::{LessonRecord, PhotoAsset, Recording, SubtitleEntry};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::error::{ApiError, ApiResult};
use super::models::{ApiBody, LessonLookup, SubtitleUpload};
use super::LectureApi;
use crate::config::ApiConfig;

const LIST_RECORDINGS: &str = "api/list-audio-files";
const LESSONS: &str = "api/lecciones";
const GET_LESSON: &str = "api/lecciones/get";
const CREATE_LESSON: &str = "api/lecciones/create";
const UPDATE_LESSON: &str = "api/lecciones/update";
const DELETE_LESSON: &str = "api/lecciones/delete";
const GET_AUDIO: &str = "api/get-audio";
const GET_SUBTITLES: &str = "api/get-subtitles";
const UPLOAD_SUBTITLE: &str = "api/upload-subtitle";
const DELETE_SUBTITLE: &str = "api/delete-subtitle";
const PHOTOS_BY_DATE: &str = "api/get-photos-by-date";

/// HTTP client for the lessons API
#[derive(Debug, Clone)]
pub struct HttpLectureApi {
    base: Url,
    client: reqwest::Client,
}

impl HttpLectureApi {
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            base: normalize_base(&config.base_url)?,
            client,
        })
    }

    /// API origin, without a trailing slash
    pub fn origin(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    fn request(&self, method: Method, path: &str) -> ApiResult<(String, RequestBuilder)> {
        let url = self.base.join(path)?;
        let endpoint = url.path().to_string();
        debug!("{} {}", method, url);
        Ok((endpoint, self.client.request(method, url)))
    }

    async fn send(endpoint: &str, request: RequestBuilder) -> ApiResult<Response> {
        request.send().await.map_err(|source| ApiError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    async fn read_text(endpoint: &str, response: Response) -> ApiResult<(u16, bool, String)> {
        let status = response.status();
        let text = response.text().await.map_err(|source| ApiError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;
        Ok((status.as_u16(), status.is_success(), text))
    }

    /// Send a request whose success body is JSON of type `T`
    async fn fetch_json<T: DeserializeOwned>(&self, endpoint: &str, request: RequestBuilder) -> ApiResult<T> {
        let response = Self::send(endpoint, request).await?;
        let (status, ok, text) = Self::read_text(endpoint, response).await?;
        if !ok {
            return Err(status_error(endpoint, status, text));
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Malformed {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }

    /// Send a request whose body may be JSON or text
    async fn fetch_body(&self, endpoint: &str, request: RequestBuilder) -> ApiResult<ApiBody> {
        let response = Self::send(endpoint, request).await?;
        let (status, ok, text) = Self::read_text(endpoint, response).await?;
        if !ok {
            return Err(status_error(endpoint, status, text));
        }
        Ok(ApiBody::from_text(text))
    }

    /// Send a request where only the status matters
    async fn fetch_status(&self, endpoint: &str, request: RequestBuilder) -> ApiResult<()> {
        self.fetch_body(endpoint, request).await.map(|_| ())
    }
}

#[async_trait]
impl LectureApi for HttpLectureApi {
    async fn list_recordings(&self) -> ApiResult<Vec<Recording>> {
        let (endpoint, request) = self.request(Method::GET, LIST_RECORDINGS)?;
        let recordings: Vec<Recording> = self.fetch_json(&endpoint, request).await?;
        debug!("Fetched {} recordings", recordings.len());
        Ok(recordings)
    }

    async fn list_lessons(&self) -> ApiResult<Vec<LessonRecord>> {
        let (endpoint, request) = self.request(Method::GET, LESSONS)?;
        let lessons: Vec<LessonRecord> = self.fetch_json(&endpoint, request).await?;
        debug!("Fetched {} lesson records", lessons.len());
        Ok(lessons)
    }

    async fn get_lesson(&self, video_id: &str) -> ApiResult<LessonLookup> {
        let (endpoint, request) = self.request(Method::GET, GET_LESSON)?;
        let response = Self::send(&endpoint, request.query(&[("video_id", video_id)])).await?;
        let (status, ok, text) = Self::read_text(&endpoint, response).await?;

        // The not-found marker is plain text and may come with any status
        let body = ApiBody::from_text(text);
        if body.is_lesson_not_found() {
            info!("No lesson record for {}", video_id);
            return Ok(LessonLookup::NotFound);
        }

        let value = match body {
            ApiBody::Json(value) => value,
            ApiBody::Text(text) => {
                return Err(ApiError::Malformed {
                    endpoint,
                    reason: format!("expected JSON, got {:?}", text),
                })
            }
        };

        if !ok {
            return Err(status_error(&endpoint, status, value.to_string()));
        }

        serde_json::from_value(value)
            .map(LessonLookup::Found)
            .map_err(|e| ApiError::Malformed {
                endpoint,
                reason: e.to_string(),
            })
    }

    async fn create_lesson(&self, lesson: &LessonRecord) -> ApiResult<ApiBody> {
        let (endpoint, request) = self.request(Method::POST, CREATE_LESSON)?;
        info!("Creating lesson record {}", lesson.video_id);
        self.fetch_body(&endpoint, request.json(lesson)).await
    }

    async fn update_lesson(&self, lesson: &LessonRecord) -> ApiResult<ApiBody> {
        let (endpoint, request) = self.request(Method::PUT, UPDATE_LESSON)?;
        info!("Updating lesson record {}", lesson.video_id);
        self.fetch_body(&endpoint, request.json(lesson)).await
    }

    async fn delete_lesson(&self, video_id: &str) -> ApiResult<ApiBody> {
        let (endpoint, request) = self.request(Method::DELETE, DELETE_LESSON)?;
        info!("Deleting lesson record {}", video_id);
        self.fetch_body(&endpoint, request.query(&[("video_id", video_id)])).await
    }

    async fn get_audio(&self, file: &str) -> ApiResult<Vec<u8>> {
        let (endpoint, request) = self.request(Method::GET, GET_AUDIO)?;
        let response = Self::send(&endpoint, request.query(&[("file", file)])).await?;
        if !response.status().is_success() {
            let (status, _, text) = Self::read_text(&endpoint, response).await?;
            return Err(status_error(&endpoint, status, text));
        }

        let bytes = response.bytes().await.map_err(|source| ApiError::Transport {
            endpoint: endpoint.clone(),
            source,
        })?;
        debug!("Downloaded {} bytes of audio for {}", bytes.len(), file);
        Ok(bytes.to_vec())
    }

    async fn get_subtitles(&self, video_id: &str, language: &str) -> ApiResult<Vec<SubtitleEntry>> {
        let (endpoint, request) = self.request(Method::GET, GET_SUBTITLES)?;
        let request = request.query(&[("video_id", video_id), ("language", language)]);
        self.fetch_json(&endpoint, request).await
    }

    async fn upload_subtitle(&self, upload: &SubtitleUpload) -> ApiResult<()> {
        let (endpoint, request) = self.request(Method::POST, UPLOAD_SUBTITLE)?;
        let form = reqwest::multipart::Form::new()
            .text("subtitle", upload.text.clone())
            .text("video_id", upload.video_id.clone())
            .text("language", upload.language.clone())
            .text("start_time", upload.start_time.to_string())
            .text("end_time", upload.end_time.to_string());

        let result = self.fetch_status(&endpoint, request.multipart(form)).await;
        match &result {
            Ok(()) => info!("✅ Subtitle uploaded for {}", upload.video_id),
            Err(e) => warn!("Failed to upload subtitle for {}: {}", upload.video_id, e),
        }
        result
    }

    async fn delete_subtitle(&self, id: &str) -> ApiResult<()> {
        let (endpoint, request) = self.request(Method::DELETE, DELETE_SUBTITLE)?;
        self.fetch_status(&endpoint, request.query(&[("id", id)])).await
    }

    async fn photos_by_date(&self, date: &str) -> ApiResult<Vec<PhotoAsset>> {
        let (endpoint, request) = self.request(Method::GET, PHOTOS_BY_DATE)?;
        self.fetch_json(&endpoint, request.query(&[("date", date)])).await
    }
}

/// Base URL with a trailing slash so relative endpoint paths join under it
fn normalize_base(base_url: &str) -> ApiResult<Url> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

fn status_error(endpoint: &str, status: u16, text: String) -> ApiError {
    let message = ApiBody::from_text(text).message().unwrap_or_default();
    ApiError::Status {
        endpoint: endpoint.to_string(),
        status,
        message,
    }
}
