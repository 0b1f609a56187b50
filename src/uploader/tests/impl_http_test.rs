use crate::library::logger::impl_fake::LoggerFake;
use crate::uploader::impl_http::UploaderHttp;
use crate::uploader::interface::{send_image, UploadReport};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

fn header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n").map(|i| i + 4)
}

fn content_length(head: &str) -> Option<usize> {
    head.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.eq_ignore_ascii_case("content-length") {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);

        if let Some(end) = header_end(&buffer) {
            let head = String::from_utf8_lossy(&buffer[..end]).to_string();
            let complete = match content_length(&head) {
                Some(length) => buffer.len() >= end + length,
                None => buffer.ends_with(b"0\r\n\r\n"),
            };
            if complete {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buffer).to_string()
}

/// Serves one request with `status` and `body`, returning the raw request
/// text.
fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/upload", listener.local_addr().unwrap());
    let server = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let request = read_request(&mut stream);
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).unwrap();
        request
    });
    (url, server)
}

fn uploader(url: &str, timeout: Option<Duration>) -> UploaderHttp {
    UploaderHttp::new(url, "images", timeout, Arc::new(LoggerFake::new()))
}

#[test]
fn test_multipart_upload() {
    let (url, server) = serve_once("200 OK", r#"{"status":"ok"}"#);

    let report = send_image(
        &uploader(&url, Some(Duration::from_secs(5))),
        "image",
        vec![0x89, b'P', b'N', b'G'],
    );

    let request = server.join().unwrap();
    assert!(request.starts_with("POST /upload"));
    assert!(request.contains("multipart/form-data"));
    assert!(request.contains(r#"name="images""#));
    assert!(request.contains(r#"filename="image_"#));
    assert!(request.contains("Content-Type: image/png"));
    match report {
        UploadReport::Sent { response, .. } => assert_eq!(response, r#"{"status":"ok"}"#),
        other => panic!("Unexpected report: {:?}", other),
    }
}

#[test]
fn test_non_json_reply_is_a_failure() {
    let (url, server) = serve_once("200 OK", "saved");

    let report = send_image(&uploader(&url, None), "image", vec![1, 2, 3]);

    server.join().unwrap();
    match report {
        UploadReport::Failed { error, .. } => assert!(error.contains("Invalid response")),
        other => panic!("Unexpected report: {:?}", other),
    }
}

#[test]
fn test_error_status_with_json_body_is_sent() {
    let (url, server) = serve_once("500 Internal Server Error", r#"{"error":"disk full"}"#);

    let report = send_image(&uploader(&url, Some(Duration::from_secs(5))), "image", vec![1, 2, 3]);

    server.join().unwrap();
    match report {
        UploadReport::Sent { response, .. } => assert_eq!(response, r#"{"error":"disk full"}"#),
        other => panic!("Unexpected report: {:?}", other),
    }
}

#[test]
fn test_error_status_without_json_body_is_a_failure() {
    let (url, server) = serve_once("404 Not Found", "no such route");

    let report = send_image(&uploader(&url, Some(Duration::from_secs(5))), "image", vec![1, 2, 3]);

    server.join().unwrap();
    match report {
        UploadReport::Failed { error, .. } => assert!(error.contains("Invalid response")),
        other => panic!("Unexpected report: {:?}", other),
    }
}

#[test]
fn test_dropped_connection_is_a_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/upload", listener.local_addr().unwrap());
    let server = std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        drop(stream);
    });

    let report = send_image(&uploader(&url, Some(Duration::from_secs(5))), "image", vec![7; 64]);

    server.join().unwrap();
    match report {
        UploadReport::Failed { error, .. } => assert!(error.contains("Failed to send")),
        other => panic!("Unexpected report: {:?}", other),
    }
}

#[test]
fn test_silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/upload", listener.local_addr().unwrap());
    let server = std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        std::thread::sleep(Duration::from_millis(800));
        drop(stream);
    });

    let report = send_image(
        &uploader(&url, Some(Duration::from_millis(200))),
        "image",
        vec![7; 64],
    );

    assert!(!report.is_sent());
    server.join().unwrap();
}
