//! Minimal HTTP/1.1 server standing in for the artwork host
//!
//! Routes by path:
//! - `/missing.png` answers 404
//! - `/slow.png` answers after [`SLOW_DELAY`]
//! - anything else answers 200 with [`PNG_BYTES`]

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Body served for every successful request
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nartwork";

pub const SLOW_DELAY: Duration = Duration::from_millis(300);

pub struct ImageServer {
    base_url: String,
    handle: JoinHandle<()>,
}

impl ImageServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream));
            }
        });

        Self { base_url, handle }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for ImageServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(mut stream: TcpStream) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }

    let head = String::from_utf8_lossy(&request);
    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();

    let (status, body): (&str, &[u8]) = match path.as_str() {
        "/missing.png" => ("404 Not Found", b"not here"),
        "/slow.png" => {
            tokio::time::sleep(SLOW_DELAY).await;
            ("200 OK", PNG_BYTES)
        }
        _ => ("200 OK", PNG_BYTES),
    };

    let header = format!(
        "HTTP/1.1 {}\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    );
    let _ = stream.write_all(header.as_bytes()).await;
    let _ = stream.write_all(body).await;
    let _ = stream.shutdown().await;
}
