use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use reqwest::Url;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use updater_lib::core::sync::listing::percent_decode;

/// How the `Content-Length` header of a canned reply is written.
#[derive(Debug, Clone)]
pub enum Length {
    Actual,
    Declared(&'static str),
    Omitted,
}

#[derive(Debug, Clone)]
pub struct Reply {
    status: u16,
    body: Vec<u8>,
    length: Length,
}

impl Reply {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            length: Length::Actual,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
            length: Length::Actual,
        }
    }

    pub fn length(mut self, length: Length) -> Self {
        self.length = length;
        self
    }
}

/// Serves canned replies keyed by decoded request path. Unknown paths get 404.
pub struct TestServer {
    pub base: Url,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    pub async fn start(routes: Vec<(&str, Reply)>) -> Self {
        let routes: Arc<HashMap<String, Reply>> = Arc::new(
            routes
                .into_iter()
                .map(|(path, reply)| (path.to_string(), reply))
                .collect(),
        );
        let requests = Arc::new(Mutex::new(Vec::new()));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = Url::parse(&format!("http://{}/", listener.local_addr().unwrap())).unwrap();

        let log = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(handle(stream, routes.clone(), log.clone()));
            }
        });

        Self { base, requests }
    }

    /// `"METHOD /decoded/path"` for every request so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn url(&self, path: &str) -> Url {
        self.base.join(path).unwrap()
    }
}

async fn handle(
    mut stream: TcpStream,
    routes: Arc<HashMap<String, Reply>>,
    log: Arc<Mutex<Vec<String>>>,
) {
    let mut request = Vec::new();
    let mut chunk = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&chunk[..n]),
        }
    }

    let head = String::from_utf8_lossy(&request).into_owned();
    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = percent_decode(request_line.next().unwrap_or_default());
    log.lock().unwrap().push(format!("{method} {path}"));

    let reply = routes.get(&path).cloned().unwrap_or_else(|| Reply::status(404));
    let reason = if reply.status < 400 { "OK" } else { "Error" };
    let mut response = format!("HTTP/1.1 {} {}\r\nConnection: close\r\n", reply.status, reason);
    match reply.length {
        Length::Actual => response.push_str(&format!("Content-Length: {}\r\n", reply.body.len())),
        Length::Declared(value) => response.push_str(&format!("Content-Length: {value}\r\n")),
        Length::Omitted => {}
    }
    response.push_str("\r\n");

    let _ = stream.write_all(response.as_bytes()).await;
    if method != "HEAD" {
        let _ = stream.write_all(&reply.body).await;
    }
    let _ = stream.shutdown().await;
}
