// SPDX-License-Identifier: MIT

use super::*;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

async fn serve_once(listener: TcpListener, response: &'static str) {
    let (mut socket, _) = listener.accept().await.unwrap();
    let mut buf = [0u8; 1024];
    let _ = tokio::io::AsyncReadExt::read(&mut socket, &mut buf).await;
    socket.write_all(response.as_bytes()).await.unwrap();
}

#[tokio::test]
async fn get_parses_status_and_body_via_content_length() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(serve_once(
        listener,
        "HTTP/1.1 200 OK\r\nContent-Length: 12\r\nConnection: close\r\n\r\n{\"ok\":true}\n",
    ));

    let client = Client::new();
    let auth = BasicAuth { username: "opencode".to_string(), password: "secret".to_string() };
    let response = get(&client, &addr.to_string(), "/session", &auth, std::time::Duration::from_secs(2)).await.unwrap();
    server.await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, "{\"ok\":true}\n");
}

#[tokio::test]
async fn post_delivers_body_and_surfaces_error_status() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(serve_once(listener, "HTTP/1.1 400 Bad Request\r\nContent-Length: 5\r\nConnection: close\r\n\r\noops\n"));

    let client = Client::new();
    let auth = BasicAuth { username: "opencode".to_string(), password: "secret".to_string() };
    let response = post(&client, &addr.to_string(), "/session/1/message", "{}", &auth, std::time::Duration::from_secs(2))
        .await
        .unwrap();
    server.await.unwrap();

    assert_eq!(response.status, 400);
    assert_eq!(response.body, "oops\n");
}

#[test]
fn basic_auth_encodes_username_password_pair() {
    let auth = BasicAuth { username: "opencode".to_string(), password: "s3cret".to_string() };
    assert_eq!(auth.encode(), STANDARD.encode(b"opencode:s3cret"));
    assert_eq!(auth.header_value(), format!("Basic {}", auth.encode()));
}
