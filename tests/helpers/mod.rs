// ABOUTME: Canned-response HTTP listener for exercising the clients without the real API
// ABOUTME: Records every request (path, query, bearer, form body) for assertions
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// One request as seen by the mock server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub bearer: Option<String>,
    pub form: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn query_map(&self) -> HashMap<String, String> {
        self.query.iter().cloned().collect()
    }

    pub fn form_map(&self) -> HashMap<String, String> {
        self.form.iter().cloned().collect()
    }
}

/// A canned response keyed on the observed request.
pub type Responder = dyn Fn(&RecordedRequest) -> (u16, String) + Send + Sync;

/// Minimal HTTP/1.1 listener serving canned JSON responses.
pub struct MockServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockServer {
    /// Bind an ephemeral port and serve `responder` until dropped.
    pub async fn spawn(responder: impl Fn(&RecordedRequest) -> (u16, String) + Send + Sync + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        let responder: Arc<Responder> = Arc::new(responder);
        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                let recorded = recorded.clone();
                let responder = responder.clone();
                tokio::spawn(async move {
                    let (reader, mut writer) = socket.into_split();
                    let mut reader = BufReader::new(reader);

                    let Some(request) = read_request(&mut reader).await else {
                        return;
                    };
                    recorded.lock().unwrap().push(request.clone());

                    let (status, body) = responder(&request);
                    let response = format!(
                        "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        reason(status),
                        body.len(),
                    );
                    writer.write_all(response.as_bytes()).await.ok();
                    writer.shutdown().await.ok();
                });
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests whose path matches exactly.
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path == path)
            .collect()
    }
}

async fn read_request(
    reader: &mut BufReader<tokio::net::tcp::OwnedReadHalf>,
) -> Option<RecordedRequest> {
    let mut line = String::new();
    reader.read_line(&mut line).await.ok()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?.to_owned();
    let target = parts.next()?.to_owned();

    let mut bearer = None;
    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).await.ok()?;
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            let value = value.trim();
            match name.to_ascii_lowercase().as_str() {
                "authorization" => {
                    bearer = value.strip_prefix("Bearer ").map(str::to_owned);
                }
                "content-length" => {
                    content_length = value.parse().unwrap_or(0);
                }
                _ => {}
            }
        }
    }

    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body).await.ok()?;
    }
    let body = String::from_utf8_lossy(&body);

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (
            path.to_owned(),
            serde_urlencoded::from_str::<Vec<(String, String)>>(query).unwrap_or_default(),
        ),
        None => (target, Vec::new()),
    };
    let form = serde_urlencoded::from_str::<Vec<(String, String)>>(&body).unwrap_or_default();

    Some(RecordedRequest {
        method,
        path,
        query,
        bearer,
        form,
    })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Token endpoint JSON for a freshly issued token pair.
pub fn token_json(access_token: &str, refresh_token: &str, expires_in: i64) -> String {
    format!(
        r#"{{"token_type":"bearer","access_token":"{access_token}","refresh_token":"{refresh_token}","expires_in":{expires_in}}}"#
    )
}
