// Boots the real server once per test binary on an ephemeral port.
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};

// Base URL published by the server thread once its listener is bound.
static SERVER_URL: OnceLock<String> = OnceLock::new();
// Guards the bootstrap so it runs only once.
static SERVER_READY: OnceLock<()> = OnceLock::new();

// Ensure the test server is running and return the shared base URL.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published_url = Arc::new(OnceLock::<String>::new());
        let published_url_thread = Arc::clone(&published_url);
        // Own OS thread and runtime so the server outlives individual `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_url_thread.set(format!("http://{}", addr));
                lesion_sim::run(listener).await.expect("server failed");
            });
        });
        wait_for_server_url_and_readiness(published_url);
    });

    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

// Wait for URL publication and then for the socket to accept TCP connections.
fn wait_for_server_url_and_readiness(published_url: Arc<OnceLock<String>>) {
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };

    let _ = SERVER_URL.set(base_url.clone());

    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");

    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("server did not become ready in time");
}

// Unique id so tests sharing one server never collide.
pub fn unique_simulation_id() -> String {
    format!("test-{}", uuid::Uuid::new_v4())
}

// Create a simulation and return its id.
pub async fn create_simulation(client: &reqwest::Client, base_url: &str, body: serde_json::Value) -> String {
    let res = client
        .post(format!("{base_url}/simulations"))
        .json(&body)
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);

    let payload: serde_json::Value = res.json().await.expect("json body");
    payload["simulation_id"]
        .as_str()
        .expect("simulation id")
        .to_string()
}

// Poll the snapshot route until `check` passes.
pub async fn wait_for_snapshot(
    client: &reqwest::Client,
    base_url: &str,
    simulation_id: &str,
    check: impl Fn(&serde_json::Value) -> bool,
) -> serde_json::Value {
    // Default tick interval is 100ms, so allow a generous margin.
    for _ in 0..100 {
        let payload: serde_json::Value = client
            .get(format!("{base_url}/simulations/{simulation_id}"))
            .send()
            .await
            .expect("request should succeed")
            .json()
            .await
            .expect("json body");
        if check(&payload) {
            return payload;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("snapshot condition not met for {simulation_id}");
}
