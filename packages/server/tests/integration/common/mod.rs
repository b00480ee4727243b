use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use engine::{Clock, ContestEngine, ManualClock};
use reqwest::Client;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use tempfile::TempDir;

use server::config::{
    AppConfig, AuthConfig, CorsConfig, DatabaseConfig, EngineConfig, ServerConfig,
};
use server::state::AppState;

/// Secret every test token is signed with.
pub const JWT_SECRET: &str = "test-secret-for-integration-tests";

/// Instant the test clock starts at. Contests created with this as their
/// start time are due immediately; add an offset to get a scheduled one.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
}

pub mod routes {
    pub const CONTESTS: &str = "/api/v1/contests";

    pub fn contest(id: i32) -> String {
        format!("/api/v1/contests/{id}")
    }

    pub fn contest_state(id: i32) -> String {
        format!("/api/v1/contests/{id}/state")
    }

    pub fn join(id: i32) -> String {
        format!("/api/v1/contests/{id}/join")
    }

    pub fn verdicts(id: i32) -> String {
        format!("/api/v1/contests/{id}/verdicts")
    }

    pub fn admin(id: i32) -> String {
        format!("/api/v1/contests/{id}/admin")
    }

    pub fn standings(id: i32) -> String {
        format!("/api/v1/contests/{id}/standings")
    }
}

/// A running test server over a throwaway SQLite file. The engine's clock is
/// a [`ManualClock`] held by the test, so lifecycle boundaries are crossed by
/// advancing it, never by sleeping.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub clock: ManualClock,
    db_url: String,
    /// Keeps the database file alive; shared with respawned servers.
    db_dir: Arc<TempDir>,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let db_dir = Arc::new(tempfile::tempdir().expect("Failed to create temp dir"));
        let db_path = db_dir.path().join("arbiter.sqlite");
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        Self::boot(db_url, db_dir, base_time()).await
    }

    /// Boot a second server over this app's database, clock preserved.
    /// The new engine rehydrates itself from the stored rows exactly the way
    /// a restarted process would.
    pub async fn respawn(&self) -> Self {
        Self::boot(self.db_url.clone(), self.db_dir.clone(), self.clock.now()).await
    }

    async fn boot(db_url: String, db_dir: Arc<TempDir>, now: DateTime<Utc>) -> Self {
        let db = server::database::init_db(&db_url)
            .await
            .expect("Failed to initialize test database");

        let clock = ManualClock::at(now);
        let engine = ContestEngine::new(Arc::new(clock.clone()));
        server::recovery::load_contests(&db, &engine)
            .await
            .expect("Failed to load contests from storage");

        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig {
                url: db_url.clone(),
            },
            auth: AuthConfig {
                jwt_secret: JWT_SECRET.to_string(),
            },
            engine: EngineConfig { tick_interval_s: 1 },
        };

        // No tick task: the state is derived on every read, so the tests
        // only ever move the clock by hand.
        let state = AppState {
            engine,
            db: db.clone(),
            config,
        };
        let app = server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            clock,
            db_url,
            db_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_without_token(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn get_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_without_token(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    /// Mint a token the way the identity collaborator would.
    pub fn token(&self, actor_id: i32, display_name: &str, role: &str) -> String {
        server::utils::jwt::sign(JWT_SECRET, actor_id, display_name, role, None)
            .expect("Failed to sign test token")
    }

    pub fn rated_token(&self, actor_id: i32, display_name: &str, role: &str, rating: i32) -> String {
        server::utils::jwt::sign(JWT_SECRET, actor_id, display_name, role, Some(rating))
            .expect("Failed to sign test token")
    }

    /// Create a contest as the owner and return its `id`.
    pub async fn create_contest(&self, body: &Value) -> i32 {
        let owner = self.token(1, "owner", "Owner");
        let res = self.post_with_token(routes::CONTESTS, body, &owner).await;
        assert_eq!(res.status, 201, "create_contest failed: {}", res.text);
        res.id()
    }

    /// Join a contest as a competitor with the Participant role.
    pub async fn join_competitor(&self, contest_id: i32, actor_id: i32, name: &str) {
        let token = self.token(actor_id, name, "Participant");
        let res = self
            .post_with_token(
                &routes::join(contest_id),
                &json!({"kind": "Competitor"}),
                &token,
            )
            .await;
        assert_eq!(res.status, 201, "join_competitor failed: {}", res.text);
    }

    /// Push one judged verdict as the judging service.
    pub async fn ingest(&self, contest_id: i32, body: &Value) -> TestResponse {
        let token = self.token(900, "judge-bridge", "DualAdmin");
        self.post_with_token(&routes::verdicts(contest_id), body, &token)
            .await
    }

    /// Apply one admin command as the owner.
    pub async fn admin(&self, contest_id: i32, body: &Value) -> TestResponse {
        let token = self.token(1, "owner", "Owner");
        self.post_with_token(&routes::admin(contest_id), body, &token)
            .await
    }
}

/// Two-hour ICPC round: 15 min late-join grace, freeze 20 min before the
/// end, 20 min wrong penalty, problems 101 (weight 500) and 102 (weight 300).
pub fn icpc_contest_body(title: &str, start_time: DateTime<Utc>) -> Value {
    json!({
        "title": title,
        "start_time": start_time.to_rfc3339(),
        "duration_s": 7200,
        "grace_s": 900,
        "freeze_offset_s": 1200,
        "scoring": "Icpc",
        "problems": [
            {"problem_id": 101, "weight": 500},
            {"problem_id": 102, "weight": 300},
        ],
    })
}

pub fn verdict_body(
    participant_id: i32,
    problem_id: i32,
    verdict: &str,
    submitted_at: DateTime<Utc>,
) -> Value {
    json!({
        "participant_id": participant_id,
        "problem_id": problem_id,
        "verdict": verdict,
        "submitted_at": submitted_at.to_rfc3339(),
    })
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    pub fn id(&self) -> i32 {
        self.body["id"]
            .as_i64()
            .expect("response body should contain 'id'") as i32
    }
}
