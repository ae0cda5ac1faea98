use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::service::{PlannerService, RemoteError};
use crate::core::date_key::DateKey;
use crate::core::day_detail::{DayDetail, DaySummary};
use crate::core::note::NoteId;

/// JSON-over-HTTP binding of [`PlannerService`].
///
/// Every operation is `POST {base_url}/{operation}` with a JSON object body.
#[derive(Clone)]
pub struct HttpPlannerClient {
    base_url: String,
    http: Client,
}

impl HttpPlannerClient {
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        let http = Client::builder()
            .build()
            .map_err(|e| RemoteError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(base_url, http))
    }

    /// Use a preconfigured `reqwest` client (timeouts, proxies).
    pub fn with_client(base_url: &str, http: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, operation: &str) -> String {
        format!("{}/{}", self.base_url, operation)
    }

    async fn call(&self, operation: &str, body: Value) -> Result<String, RemoteError> {
        let url = self.endpoint(operation);
        log::debug!("POST {} {}", url, body);

        let resp = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(format!("{} request failed: {}", operation, e)))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| RemoteError::Decode(format!("Failed to read {} response: {}", operation, e)))?;

        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }

    async fn query<T: DeserializeOwned>(&self, operation: &str, body: Value) -> Result<T, RemoteError> {
        let text = self.call(operation, body).await?;
        serde_json::from_str(&text)
            .map_err(|e| RemoteError::Decode(format!("{}: {} (raw: {})", operation, e, text)))
    }

    /// Mutations carry no payload back; any 2xx body is accepted.
    async fn command(&self, operation: &str, body: Value) -> Result<(), RemoteError> {
        self.call(operation, body).await.map(|_| ())
    }
}

#[async_trait]
impl PlannerService for HttpPlannerClient {
    async fn get_month_data(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<(DateKey, DaySummary)>, RemoteError> {
        self.query("get_month_data", json!({ "year": year, "month": month }))
            .await
    }

    async fn get_day_data(&self, date: DateKey) -> Result<Vec<DayDetail>, RemoteError> {
        self.query("get_day_data", json!({ "date": date.to_string() }))
            .await
    }

    async fn add_note(&self, date: DateKey, content: &str) -> Result<(), RemoteError> {
        self.command(
            "add_note",
            json!({ "date": date.to_string(), "content": content }),
        )
        .await
    }

    async fn complete_note(&self, date: DateKey, note_id: &NoteId) -> Result<(), RemoteError> {
        self.command(
            "complete_note",
            json!({ "date": date.to_string(), "note_id": note_id }),
        )
        .await
    }

    async fn fetch_and_store_on_this_day(&self, date: DateKey) -> Result<(), RemoteError> {
        self.command(
            "fetch_and_store_on_this_day",
            json!({ "date": date.to_string() }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answer a single request with `status` and `body`; the handle yields the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            let (k, v) = l.split_once(':')?;
                            k.eq_ignore_ascii_case("content-length")
                                .then(|| v.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if raw.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&raw).to_string()
        });
        (format!("http://{}", addr), handle)
    }

    fn local_client(url: &str) -> HttpPlannerClient {
        HttpPlannerClient::with_client(url, Client::builder().no_proxy().build().unwrap())
    }

    #[tokio::test]
    async fn month_data_decodes_wire_dates() {
        let (url, server) = serve_once(
            "200 OK",
            r#"[["2024-2-15", {"notes": [{"id": 1, "content": "a", "is_completed": false}, {"id": 2, "content": "b", "is_completed": true}]}]]"#,
        )
        .await;
        let client = local_client(&url);
        let month = client.get_month_data(2024, 2).await.unwrap();

        assert_eq!(month.len(), 1);
        assert_eq!(month[0].0, DateKey::new(2024, 2, 15).unwrap());
        assert_eq!(month[0].1.notes.len(), 2);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /get_month_data "));
        assert!(request.contains(r#""month":2"#));
    }

    #[tokio::test]
    async fn empty_day_response_is_not_an_error() {
        let (url, server) = serve_once("200 OK", "[]").await;
        let client = local_client(&url);
        let records = client
            .get_day_data(DateKey::new(2024, 2, 15).unwrap())
            .await
            .unwrap();
        assert!(records.is_empty());
        assert_eq!(DayDetail::from_records(records), DayDetail::empty());

        let request = server.await.unwrap();
        assert!(request.contains(r#""date":"2024-2-15""#));
    }

    #[tokio::test]
    async fn complete_note_echoes_the_id() {
        let (url, server) = serve_once("200 OK", "").await;
        let client = local_client(&format!("{}/", url));
        client
            .complete_note(DateKey::new(2024, 3, 1).unwrap(), &NoteId::Number(42))
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /complete_note "));
        assert!(request.contains(r#""note_id":42"#));
    }

    #[tokio::test]
    async fn error_status_is_surfaced() {
        let (url, _server) = serve_once("503 Service Unavailable", "busy").await;
        let client = local_client(&url);
        let err = client
            .add_note(DateKey::new(2024, 3, 1).unwrap(), "hello")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RemoteError::Status {
                status: 503,
                body: "busy".to_string()
            }
        );
    }

    #[tokio::test]
    async fn garbage_body_is_a_decode_error() {
        let (url, _server) = serve_once("200 OK", "<html>").await;
        let client = local_client(&url);
        let err = client.get_month_data(2024, 2).await.unwrap_err();
        assert!(matches!(err, RemoteError::Decode(_)));
    }
}
