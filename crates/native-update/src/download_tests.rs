// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

use super::*;
use std::net::SocketAddr;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

async fn spawn_download_server(body: Vec<u8>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let header = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\n\r\n",
                body.len()
            );
            let _ = socket.write_all(header.as_bytes()).await;
            for chunk in body.chunks(4) {
                let _ = socket.write_all(chunk).await;
                tokio::time::sleep(std::time::Duration::from_millis(1)).await;
            }
            let _ = socket.shutdown().await;
        }
    });
    addr
}

#[tokio::test]
async fn download_to_file_writes_full_body_and_emits_progress() {
    let body = b"0123456789abcdef".to_vec();
    let addr = spawn_download_server(body.clone()).await;
    let (tx, mut rx) = broadcast::channel(64);
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("asset.bin");

    let client = reqwest::Client::new();
    let url = format!("http://{addr}/asset");
    download_to_file(&client, &url, &dest, "asset.bin", &tx, &DownloadHandle::new()).await.unwrap();

    let written = tokio::fs::read(&dest).await.unwrap();
    assert_eq!(written, body);

    let mut saw_progress = false;
    while let Ok(event) = rx.try_recv() {
        if matches!(event, Event::DownloadProgress { .. }) {
            saw_progress = true;
        }
    }
    assert!(saw_progress);
}

#[tokio::test]
async fn download_to_file_removes_partial_file_on_cancel() {
    let body = vec![0u8; 4096];
    let addr = spawn_download_server(body).await;
    let (tx, _rx) = broadcast::channel(64);
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("asset.bin");
    let handle = DownloadHandle::new();
    handle.cancel();

    let client = reqwest::Client::new();
    let url = format!("http://{addr}/asset");
    let err = download_to_file(&client, &url, &dest, "asset.bin", &tx, &handle).await.unwrap_err();

    assert!(matches!(err, UpdateError::DownloadCancelled));
    assert!(!dest.exists());
}
