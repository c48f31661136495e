use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use serde_json::Value;

use crate::{
    config::BackendConfig,
    error::{parse_json_error, Result, StudioError},
    models::{encode_data_url, GenerationType},
    service::traits::{BackendResponse, Endpoint, GenerationService, Submission},
};

/// [`GenerationService`] backed by the HTTP functions that proxy to the
/// image and video providers.
pub struct HttpGenerationService {
    client: Client,
    config: BackendConfig,
}

impl HttpGenerationService {
    pub fn new(config: BackendConfig) -> Result<Self> {
        if config.base_url.is_none() {
            return Err(StudioError::ConfigError("Backend base URL is required".into()));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| StudioError::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn endpoint_path(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::ImageDesign => &self.config.image_endpoint,
            Endpoint::Video => &self.config.video_endpoint,
            Endpoint::PromptEnhancement => &self.config.enhance_endpoint,
        }
    }

    fn build_form(submission: Submission) -> Result<Form> {
        let params = serde_json::to_string(&submission.params)?;
        let mut form = Form::new().text("params", params);

        for part in submission.files {
            let file_part = Part::bytes(part.file.bytes)
                .file_name(part.file.name)
                .mime_str(&part.file.mime_type)
                .map_err(|e| StudioError::RequestError(format!("Invalid MIME type: {}", e)))?;
            form = form.part(part.field, file_part);
        }

        Ok(form)
    }
}

fn default_mime(kind: GenerationType) -> &'static str {
    match kind {
        GenerationType::Image => "image/png",
        GenerationType::Video => "video/mp4",
    }
}

/// Message for a non-2xx answer, preferring the backend's own `error` text.
pub(crate) fn failure_message(status: u16, body: &str) -> String {
    let detail = match serde_json::from_str::<Value>(body) {
        Ok(value @ Value::Object(_)) => parse_json_error(&value),
        _ => body.to_string(),
    };
    format!("Backend request failed with status {}: {}", status, detail)
}

#[async_trait]
impl GenerationService for HttpGenerationService {
    async fn submit(&self, submission: Submission) -> Result<BackendResponse> {
        let url = self.config.url_for(self.endpoint_path(submission.endpoint))?;
        log::info!(
            "POST {} ({} file part(s))",
            url,
            submission.files.len()
        );

        let form = Self::build_form(submission)?;
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                log::error!("Backend request to {} failed: {}", url, e);
                StudioError::RequestError(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("Backend {} answered {}", url, status);
            return Err(StudioError::RemoteError(failure_message(
                status.as_u16(),
                &body,
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| StudioError::ResponseError(e.to_string()))?;
        serde_json::from_str::<BackendResponse>(&body)
            .map_err(|e| StudioError::ResponseError(format!("Malformed backend response: {}", e)))
    }

    async fn fetch_media(&self, url: &str, kind: GenerationType) -> Result<String> {
        log::info!("Fetching generated {} from {}", kind, url);
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            log::warn!("Media fetch from {} answered {}", url, response.status());
            return Err(StudioError::ResponseError(format!(
                "Failed to fetch the generated {} from the returned URL.",
                kind
            )));
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default_mime(kind).to_string());

        let bytes = response.bytes().await?;
        Ok(encode_data_url(&mime_type, &bytes))
    }

    fn describe(&self, endpoint: Endpoint) -> String {
        self.config
            .url_for(self.endpoint_path(endpoint))
            .unwrap_or_else(|_| self.endpoint_path(endpoint).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaFile;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Reads one HTTP/1.1 request (headers plus a sized or chunked body).
    async fn read_request(socket: &mut TcpStream) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return buf;
            }
            buf.extend_from_slice(&chunk[..n]);

            let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok());

            let complete = match content_length {
                Some(len) => buf.len() >= header_end + 4 + len,
                None if headers.contains("transfer-encoding: chunked") => {
                    buf.ends_with(b"0\r\n\r\n")
                }
                None => true,
            };
            if complete {
                return buf;
            }
        }
    }

    /// Answers a single request with `status` and `body`, handing back the
    /// raw request it received.
    async fn serve_once(
        status: &'static str,
        content_type: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                content_type,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).into_owned()
        });

        (base_url, handle)
    }

    fn service_for(base_url: &str) -> HttpGenerationService {
        HttpGenerationService::new(BackendConfig::new().with_base_url(base_url).with_timeout(5))
            .unwrap()
    }

    fn image_submission() -> Submission {
        Submission::new(
            Endpoint::ImageDesign,
            json!({ "isFunMode": false, "prompt": "lights" }),
        )
        .with_file("mapFile", MediaFile::new("house.png", "image/png", b"PNGDATA".to_vec()))
        .with_file(
            "inspirationImage_0",
            MediaFile::new("a.jpg", "image/jpeg", b"JPGDATA".to_vec()),
        )
    }

    #[tokio::test]
    async fn test_submit_sends_params_and_file_parts() {
        let (base_url, server) = serve_once(
            "200 OK",
            "application/json",
            r#"{"imageUrl":"data:image/png;base64,AA==","debugInfo":{"type":"x"}}"#,
        )
        .await;

        let response = service_for(&base_url).submit(image_submission()).await.unwrap();
        assert_eq!(
            response.media_url(GenerationType::Image),
            Some("data:image/png;base64,AA==")
        );

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /generateGeminiDesign HTTP/1.1"));
        assert!(request.contains("multipart/form-data; boundary="));
        assert!(request.contains(r#"name="params""#));
        assert!(request.contains(r#"{"isFunMode":false,"prompt":"lights"}"#));
        assert!(request.contains(r#"name="mapFile"; filename="house.png""#));
        assert!(request.contains("PNGDATA"));
        assert!(request.contains(r#"name="inspirationImage_0"; filename="a.jpg""#));
        assert!(request.contains("Content-Type: image/jpeg"));
    }

    #[tokio::test]
    async fn test_submit_maps_server_error_body() {
        let (base_url, _server) = serve_once(
            "500 Internal Server Error",
            "application/json",
            r#"{"error":"Internal Server Error: quota"}"#,
        )
        .await;

        let err = service_for(&base_url).submit(image_submission()).await.unwrap_err();
        assert!(matches!(err, StudioError::RemoteError(_)));
        assert_eq!(
            err.user_message(),
            "Backend request failed with status 500: Internal Server Error: quota"
        );
    }

    #[tokio::test]
    async fn test_submit_rejects_non_json_success_body() {
        let (base_url, _server) =
            serve_once("200 OK", "text/html", "<html>maintenance</html>").await;

        let err = service_for(&base_url).submit(image_submission()).await.unwrap_err();
        assert!(matches!(err, StudioError::ResponseError(_)));
        assert!(err.user_message().starts_with("Malformed backend response"));
    }

    #[tokio::test]
    async fn test_fetch_media_failure_names_the_kind() {
        let (base_url, _server) = serve_once("404 Not Found", "text/plain", "gone").await;

        let err = service_for(&base_url)
            .fetch_media(&format!("{}/v.mp4", base_url), GenerationType::Video)
            .await
            .unwrap_err();
        assert_eq!(
            err.user_message(),
            "Failed to fetch the generated video from the returned URL."
        );
    }

    #[tokio::test]
    async fn test_fetch_media_builds_data_url() {
        let (base_url, _server) = serve_once("200 OK", "image/png; charset=binary", "AB").await;

        let data_url = service_for(&base_url)
            .fetch_media(&format!("{}/i.png", base_url), GenerationType::Image)
            .await
            .unwrap();
        assert_eq!(data_url, "data:image/png;base64,QUI=");
    }

    #[test]
    fn test_failure_message_prefers_backend_error() {
        assert_eq!(
            failure_message(500, r#"{"error":"Internal Server Error: quota"}"#),
            "Backend request failed with status 500: Internal Server Error: quota"
        );
        assert_eq!(
            failure_message(502, "Bad Gateway"),
            "Backend request failed with status 502: Bad Gateway"
        );
    }

    #[test]
    fn test_requires_base_url() {
        assert!(HttpGenerationService::new(BackendConfig::new()).is_err());
        let service =
            HttpGenerationService::new(BackendConfig::new().with_base_url("http://localhost:5001"))
                .unwrap();
        assert_eq!(
            service.describe(Endpoint::Video),
            "http://localhost:5001/generateRunwayVideo"
        );
    }

    #[test]
    fn test_build_form_rejects_bad_mime() {
        let submission = Submission::new(Endpoint::ImageDesign, json!({}))
            .with_file("mapFile", MediaFile::new("m.png", "not a mime", vec![1]));
        assert!(HttpGenerationService::build_form(submission).is_err());
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"imageUrl":"data:image/png;base64,AA==","debugInfo":{"type":"x"}}"#;
        let parsed: BackendResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.media_url(crate::models::GenerationType::Image),
            Some("data:image/png;base64,AA==")
        );
        assert_eq!(parsed.media_url(crate::models::GenerationType::Video), None);
        assert!(parsed.debug_info.is_some());
    }
}
