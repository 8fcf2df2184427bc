use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    #[allow(dead_code)]
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/duka-api");
        cmd.env("DUKA_API_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // A signing secret is required for token issuance; provide one for
        // the test run unless the environment already has one
        if std::env::var("DUKA_JWT_SECRET").is_err() {
            cmd.env("DUKA_JWT_SECRET", "duka-integration-test-secret");
        }

        // Inherit environment so the server can see DATABASE_URL from .env
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                // Server is up even when the database is not; 503 still
                // means the listener is ready
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Database-backed tests are skipped when no database is configured.
#[allow(dead_code)]
pub fn database_available() -> bool {
    std::env::var("DATABASE_URL").is_ok()
}

/// Unique email per call so repeated runs against a persistent database
/// never collide on the unique constraint.
#[allow(dead_code)]
pub fn unique_email(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{}+{}@example.com", prefix, nanos)
}

/// Register a fresh user and return a valid bearer token.
#[allow(dead_code)]
pub async fn register_for_token(base_url: &str) -> Result<String> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/register", base_url))
        .json(&serde_json::json!({
            "name": "Test User",
            "email": unique_email("token-user"),
            "password": "correct horse battery staple",
        }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::OK,
        "registration failed: {}",
        res.status()
    );
    let body = res.json::<serde_json::Value>().await?;
    body["token"]
        .as_str()
        .map(|s| s.to_string())
        .context("token missing from registration response")
}
