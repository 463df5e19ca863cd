// Local HTTP fixtures for tests.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use reqwest::Url;
use warp::Filter;
use warp::http::StatusCode;

/// Serves `/status/<code>/delay/<ms>` on an ephemeral port: waits `ms`
/// then answers with `code` and an empty body.
pub fn spawn_fixture() -> SocketAddr {
    let route = warp::path!("status" / u16 / "delay" / u64).and_then(|code: u16, delay_ms: u64| async move {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Ok::<_, Infallible>(warp::reply::with_status(warp::reply(), status))
    });

    let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

pub fn fixture_url(addr: SocketAddr, code: u16, delay_ms: u64) -> Url {
    Url::parse(&format!("http://{}/status/{}/delay/{}", addr, code, delay_ms)).unwrap()
}

/// An address nothing listens on: bind, note the port, release it.
pub async fn refused_url() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{}/", addr)).unwrap()
}
