use hf::config::{Binding, Bindings, ServerConfig};
use hf::errors::ServerError;
use hf::server::{binding_router, run, serve_listener};
use reqwest::StatusCode;
use std::fs;
use std::net::SocketAddr;
use std::time::Duration;
use tempfile::tempdir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

// bind an ephemeral port and serve `root` on it in the background
async fn spawn_site(
    root: &std::path::Path,
    dir_listing: bool,
) -> (SocketAddr, JoinHandle<std::io::Result<()>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = binding_router(&Binding::new(addr.to_string(), root), dir_listing);
    let handle = tokio::spawn(serve_listener(listener, app));
    (addr, handle)
}

#[tokio::test]
async fn two_bindings_serve_independently() {
    let blue = tempdir().unwrap();
    fs::write(blue.path().join("color.txt"), "blue").unwrap();
    let green = tempdir().unwrap();
    fs::write(green.path().join("color.txt"), "green").unwrap();
    fs::create_dir(green.path().join("empty")).unwrap();

    let (blue_addr, blue_server) = spawn_site(blue.path(), false).await;
    let (green_addr, green_server) = spawn_site(green.path(), false).await;

    let client = reqwest::Client::new();
    let (blue_res, green_res, forbidden_res) = tokio::join!(
        client.get(format!("http://{blue_addr}/color.txt")).send(),
        client.get(format!("http://{green_addr}/color.txt")).send(),
        client.get(format!("http://{green_addr}/empty/")).send(),
    );

    let blue_res = blue_res.unwrap();
    assert_eq!(blue_res.status(), StatusCode::OK);
    assert!(blue_res.headers().contains_key("last-modified"));
    assert_eq!(blue_res.text().await.unwrap(), "blue");

    assert_eq!(green_res.unwrap().text().await.unwrap(), "green");

    let forbidden_res = forbidden_res.unwrap();
    assert_eq!(forbidden_res.status(), StatusCode::FORBIDDEN);
    assert_eq!(forbidden_res.text().await.unwrap(), "Forbidden");

    // a forbidden listing on one site leaves the other serving
    let again = client
        .get(format!("http://{blue_addr}/color.txt"))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::OK);

    blue_server.abort();
    green_server.abort();
}

#[tokio::test]
async fn listing_page_is_served_over_http() {
    let site = tempdir().unwrap();
    fs::write(site.path().join("notes.md"), "# notes").unwrap();

    let (addr, server) = spawn_site(site.path(), true).await;

    let res = reqwest::get(format!("http://{addr}/")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(!res.headers().contains_key("last-modified"));
    assert!(res.text().await.unwrap().contains("notes.md"));

    server.abort();
}

#[tokio::test]
async fn run_fails_when_an_address_is_taken() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let taken_addr = taken.local_addr().unwrap().to_string();
    let site = tempdir().unwrap();

    let bindings: Bindings = [
        Binding::new(taken_addr.clone(), site.path()),
        Binding::new("127.0.0.1:0", site.path()),
    ]
    .into_iter()
    .collect();

    let config = ServerConfig {
        bindings,
        dir_listing: false,
    };

    let result = tokio::time::timeout(Duration::from_secs(5), run(config))
        .await
        .expect("run should stop on the first bind failure");

    match result {
        Err(ServerError::Bind { addr, .. }) => assert_eq!(addr, taken_addr),
        other => panic!("expected a bind error, got {:?}", other),
    }
}

#[tokio::test]
async fn run_without_bindings_returns_immediately() {
    let config = ServerConfig {
        bindings: Bindings::new(),
        dir_listing: false,
    };

    assert!(run(config).await.is_ok());
}
