use ureq::{http::Response, Body};

use crate::{error::DownloadError, http_client::SHARED_AGENT};

pub struct Http;

impl Http {
    /// Issues a GET through the shared agent; non-2xx statuses become
    /// [`DownloadError::HttpError`] carrying `url`.
    pub fn fetch(url: &str) -> Result<Response<Body>, DownloadError> {
        SHARED_AGENT
            .get(url)
            .call()
            .map_err(|e| DownloadError::from_ureq(e, url))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{BufRead as _, BufReader, Read as _, Write as _},
        net::TcpListener,
        thread,
    };

    use super::*;

    fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/dl/a-1.0.0.tar.gz", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut line = String::new();
            while reader.read_line(&mut line).is_ok_and(|n| n > 2) {
                line.clear();
            }
            let _ = write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            request_line
        });
        (url, handle)
    }

    #[test]
    fn test_fetch_returns_body() {
        let (url, server) = serve_once("200 OK", "archive");

        let resp = Http::fetch(&url).unwrap();
        let mut body = String::new();
        resp.into_body()
            .into_reader()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "archive");

        let request_line = server.join().unwrap();
        assert!(request_line.starts_with("GET /dl/a-1.0.0.tar.gz"), "{request_line}");
    }

    #[test]
    fn test_fetch_status_error() {
        let (url, server) = serve_once("404 Not Found", "");
        let err = Http::fetch(&url).unwrap_err();
        match err {
            DownloadError::HttpError {
                status,
                url: failed_url,
            } => {
                assert_eq!(status, 404);
                assert_eq!(failed_url, url);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let _ = server.join();
    }
}
