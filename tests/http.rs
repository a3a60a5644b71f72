use chrono::{Duration, Local};
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

const FUTURE_LOCK_MESSAGE: &str = "還沒到的日子不能先打卡喔！";

#[derive(Debug, Deserialize)]
struct DailyRecord {
    date: String,
    #[serde(default)]
    xiaolu: bool,
    #[serde(default)]
    jingfang: bool,
    #[serde(default)]
    jingyi: bool,
}

#[derive(Debug, Deserialize)]
struct ParticipantInfo {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct Message {
    text: String,
    reference: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TodayResponse {
    date: String,
    day_index: u32,
    total_days: u32,
    demo_mode: bool,
    participant: ParticipantInfo,
    checked_in: bool,
    all_checked_in: bool,
    message: Message,
}

type Progress = BTreeMap<String, DailyRecord>;

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static LIVE_SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));
static DEMO_SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::{Mutex, Once};

    static REGISTER: Once = Once::new();
    static PIDS: Mutex<Vec<i32>> = Mutex::new(Vec::new());

    pub fn register(pid: u32) {
        REGISTER.call_once(|| unsafe {
            libc::atexit(on_exit);
        });
        if let Ok(mut pids) = PIDS.lock() {
            pids.push(pid as i32);
        }
    }

    extern "C" fn on_exit() {
        if let Ok(pids) = PIDS.lock() {
            for pid in pids.iter().copied() {
                if pid > 0 {
                    unsafe {
                        libc::kill(pid, libc::SIGTERM);
                    }
                }
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_temp_path(suffix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "checkin_http_{}_{}_{}",
        std::process::id(),
        nanos,
        suffix
    ));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + StdDuration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/today")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(StdDuration::from_millis(100)).await;
    }
}

async fn spawn_server(envs: &[(&str, String)]) -> TestServer {
    let port = pick_free_port();
    let mut command = Command::new(env!("CARGO_BIN_EXE_checkin_app"));
    command
        .env("PORT", port.to_string())
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    for (key, value) in envs {
        command.env(key, value);
    }
    let child = command.spawn().expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server(
    slot: &Lazy<Mutex<Option<Arc<TestServer>>>>,
    envs: Vec<(&'static str, String)>,
) -> Arc<TestServer> {
    let mut guard = slot.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server(&envs).await);
    *guard = Some(Arc::clone(&server));
    server
}

/// Campaign long underway: every date in 2020 is in the past.
async fn live_server() -> Arc<TestServer> {
    shared_server(
        &LIVE_SERVER,
        vec![
            ("APP_START_DATE", "2020-01-01".to_string()),
            ("APP_DATA_PATH", unique_temp_path("live.json")),
        ],
    )
    .await
}

/// Campaign not started yet: the server runs in demo mode.
async fn demo_server() -> Arc<TestServer> {
    shared_server(
        &DEMO_SERVER,
        vec![
            ("APP_START_DATE", "2100-01-01".to_string()),
            ("APP_DATA_PATH", unique_temp_path("demo.json")),
        ],
    )
    .await
}

async fn fetch_today(client: &Client, base_url: &str, query: &str) -> TodayResponse {
    client
        .get(format!("{base_url}/api/today{query}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn fetch_progress(client: &Client, base_url: &str) -> Progress {
    client
        .get(format!("{base_url}/api/progress"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn post_checkin(
    client: &Client,
    base_url: &str,
    date: &str,
    participant: &str,
    current_status: bool,
) -> reqwest::Response {
    client
        .post(format!("{base_url}/api/checkin"))
        .json(&serde_json::json!({
            "date": date,
            "participant": participant,
            "current_status": current_status
        }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_today_resolves_identity() {
    let _guard = TEST_LOCK.lock().await;
    let server = live_server().await;
    let client = Client::new();

    let today = fetch_today(&client, &server.base_url, "?p=jingfang").await;
    assert_eq!(today.participant.id, "jingfang");
    assert_eq!(today.participant.name, "靜芳");
    assert_eq!(today.total_days, 21);
    assert!(!today.demo_mode);
    assert!(today.day_index >= 1);

    let today = fetch_today(&client, &server.base_url, "?p=JINGYI").await;
    assert_eq!(today.participant.id, "jingyi");

    let today = fetch_today(&client, &server.base_url, "").await;
    assert_eq!(today.participant.id, "xiaolu");

    let today = fetch_today(&client, &server.base_url, "?p=stranger").await;
    assert_eq!(today.participant.id, "xiaolu");
}

#[tokio::test]
async fn http_checkin_toggle_is_involutive() {
    let _guard = TEST_LOCK.lock().await;
    let server = live_server().await;
    let client = Client::new();
    let date = "2020-01-05";

    let response = post_checkin(&client, &server.base_url, date, "jingfang", false).await;
    assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);

    let progress = fetch_progress(&client, &server.base_url).await;
    let record = progress.get(date).expect("record created lazily");
    assert_eq!(record.date, date);
    assert!(record.jingfang);
    assert!(!record.xiaolu);
    assert!(!record.jingyi);

    let response = post_checkin(&client, &server.base_url, date, "jingfang", true).await;
    assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);

    let progress = fetch_progress(&client, &server.base_url).await;
    let record = progress.get(date).unwrap();
    assert!(!record.jingfang);
    assert!(!record.xiaolu);
    assert!(!record.jingyi);
}

#[tokio::test]
async fn http_checkin_preserves_other_participants() {
    let _guard = TEST_LOCK.lock().await;
    let server = live_server().await;
    let client = Client::new();
    let date = "2020-01-06";

    post_checkin(&client, &server.base_url, date, "xiaolu", false).await;
    post_checkin(&client, &server.base_url, date, "jingyi", false).await;

    let progress = fetch_progress(&client, &server.base_url).await;
    let record = progress.get(date).unwrap();
    assert!(record.xiaolu);
    assert!(record.jingyi);
    assert!(!record.jingfang);
}

#[tokio::test]
async fn http_future_date_rejected_outside_demo() {
    let _guard = TEST_LOCK.lock().await;
    let server = live_server().await;
    let client = Client::new();
    let tomorrow = (Local::now().date_naive() + Duration::days(1))
        .format("%Y-%m-%d")
        .to_string();

    let response = post_checkin(&client, &server.base_url, &tomorrow, "xiaolu", false).await;
    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);
    assert_eq!(response.text().await.unwrap(), FUTURE_LOCK_MESSAGE);

    let progress = fetch_progress(&client, &server.base_url).await;
    assert!(!progress.contains_key(&tomorrow));
}

#[tokio::test]
async fn http_invalid_date_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = live_server().await;
    let client = Client::new();

    let response = post_checkin(&client, &server.base_url, "not-a-date", "xiaolu", false).await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_demo_mode_pins_day_one_and_unlocks_future() {
    let _guard = TEST_LOCK.lock().await;
    let server = demo_server().await;
    let client = Client::new();

    let today = fetch_today(&client, &server.base_url, "?p=jingyi").await;
    assert!(today.demo_mode);
    assert_eq!(today.day_index, 1);
    assert_eq!(today.date, "2100-01-01");

    let response = post_checkin(&client, &server.base_url, "2100-01-10", "jingyi", false).await;
    assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);

    let progress = fetch_progress(&client, &server.base_url).await;
    assert!(progress.get("2100-01-10").unwrap().jingyi);
}

#[tokio::test]
async fn http_group_message_is_stable_once_all_complete() {
    let _guard = TEST_LOCK.lock().await;
    let server = live_server().await;
    let client = Client::new();
    let today_key = Local::now().date_naive().format("%Y-%m-%d").to_string();

    for participant in ["xiaolu", "jingfang", "jingyi"] {
        let response =
            post_checkin(&client, &server.base_url, &today_key, participant, false).await;
        assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);
    }

    let first = fetch_today(&client, &server.base_url, "?p=xiaolu").await;
    assert!(first.checked_in);
    assert!(first.all_checked_in);
    assert!(first.message.reference.is_some());

    let second = fetch_today(&client, &server.base_url, "?p=xiaolu").await;
    assert_eq!(first.message.text, second.message.text);
    assert_eq!(first.message.reference, second.message.reference);
}

#[tokio::test]
async fn http_index_renders_identity_page() {
    let _guard = TEST_LOCK.lock().await;
    let server = live_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/?p=jingyi", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body = response.text().await.unwrap();
    assert!(body.contains("靜怡"));
    assert!(body.contains("/ 21"));
    assert!(!body.contains("{{"));
}

#[tokio::test]
async fn http_events_delivers_initial_snapshot() {
    let _guard = TEST_LOCK.lock().await;
    let server = live_server().await;
    let client = Client::new();

    let mut response = client
        .get(format!("{}/api/events", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let chunk = response.chunk().await.unwrap().expect("initial SSE frame");
    let frame = String::from_utf8_lossy(&chunk).to_string();
    assert!(frame.contains("event: progress"));
    assert!(frame.contains("data:"));
}

#[tokio::test]
async fn http_collection_mode_persists_one_document_per_date() {
    let _guard = TEST_LOCK.lock().await;
    let dir = unique_temp_path("collection");
    let server = spawn_server(&[
        ("APP_START_DATE", "2020-01-01".to_string()),
        ("APP_COLLECTION_DIR", dir.clone()),
    ])
    .await;
    let client = Client::new();

    let response = post_checkin(&client, &server.base_url, "2020-02-01", "jingfang", false).await;
    assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);

    let progress = fetch_progress(&client, &server.base_url).await;
    assert!(progress.get("2020-02-01").unwrap().jingfang);

    let document = std::path::Path::new(&dir).join("2020-02-01.json");
    assert!(document.exists());
}
