#![allow(dead_code)]

use actix_web::{App, HttpServer, dev::ServerHandle, web};
use anyhow::Result;
use async_trait::async_trait;
use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::FirstName;
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use kitlog::access::{RolePolicy, SubscriptionCheck};
use kitlog::auth::Identity;
use kitlog::client::{AuthSession, KitLogClient, StaticToken};
use kitlog::database::init_database;
use kitlog::middleware::RequestIdMiddleware;
use kitlog::{AppState, Config, SheetAppender, routes};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-key-that-is-long-enough";
pub const SUPERADMIN_EMAIL: &str = "boss@kitlog.test";

pub fn setup_test_env() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn test_config(database_url: &str, sheet_path: &str) -> Config {
    Config {
        database_url: database_url.to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        jwt_secret: TEST_JWT_SECRET.to_string(),
        auth0_domain: None,
        auth0_client_id: None,
        auth0_audience: None,
        auth0_callback_url: "http://localhost:5173/callback".to_string(),
        superadmin_emails: vec![SUPERADMIN_EMAIL.to_string()],
        subscription_source: "none".to_string(),
        signup_sheet_path: sheet_path.to_string(),
    }
}

pub fn identity(id: &str, name: Option<&str>, email: Option<&str>) -> Identity {
    Identity {
        id: id.to_string(),
        email: email.map(str::to_string),
        name: name.map(str::to_string),
        picture: None,
        email_verified: true,
    }
}

/// A provider identity with a generated name and email.
pub fn random_identity() -> Identity {
    let name: String = FirstName().fake();
    let email: String = SafeEmail().fake();
    Identity {
        id: format!("auth0|{}", uuid::Uuid::new_v4().simple()),
        email: Some(email),
        name: Some(name),
        picture: None,
        email_verified: true,
    }
}

pub fn superadmin() -> Identity {
    identity("auth0|boss", Some("Boss"), Some(SUPERADMIN_EMAIL))
}

/// Treats a fixed set of user ids as paying customers.
pub struct PaidUsers(pub Vec<String>);

#[async_trait]
impl SubscriptionCheck for PaidUsers {
    async fn has_paid_subscription(&self, identity: &Identity) -> Result<bool> {
        Ok(self.0.contains(&identity.id))
    }
}

/// Sheet that always fails to append.
pub struct BrokenSheet;

#[async_trait]
impl SheetAppender for BrokenSheet {
    async fn append_row(&self, _row: &[String]) -> Result<()> {
        Err(anyhow::anyhow!("sheet unavailable"))
    }
}

#[derive(Default)]
pub struct TestOptions {
    pub paid_users: Vec<String>,
    pub team_plans: bool,
    pub signup_sheet: Option<Arc<dyn SheetAppender>>,
}

/// A migrated database in a temp dir plus the application state built on it.
pub struct TestContext {
    pub state: web::Data<AppState>,
    pub config: Config,
    pub sheet_path: PathBuf,
    _temp_dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Result<Self> {
        Self::with_options(TestOptions::default()).await
    }

    pub async fn with_paid_users(paid_users: &[&str]) -> Result<Self> {
        Self::with_options(TestOptions {
            paid_users: paid_users.iter().map(|id| id.to_string()).collect(),
            ..Default::default()
        })
        .await
    }

    /// Paid status comes from membership in a paid team.
    pub async fn with_team_plans() -> Result<Self> {
        Self::with_options(TestOptions {
            team_plans: true,
            ..Default::default()
        })
        .await
    }

    pub async fn with_options(options: TestOptions) -> Result<Self> {
        setup_test_env();

        let temp_dir = TempDir::new()?;
        let database_url = format!("sqlite:{}/kitlog-test.db", temp_dir.path().display());
        let sheet_path = temp_dir.path().join("signups.csv");
        let mut config = test_config(&database_url, &sheet_path.display().to_string());
        if options.team_plans {
            config.subscription_source = "teams".to_string();
        }

        let pool = init_database(&database_url).await?;

        let mut state = AppState::new(pool, config.clone());
        if !options.paid_users.is_empty() {
            let subscription: Arc<dyn SubscriptionCheck> = Arc::new(PaidUsers(options.paid_users));
            state = state.with_role_policy(RolePolicy::new(
                config.superadmin_emails.clone(),
                subscription,
            ));
        }
        if let Some(sheet) = options.signup_sheet {
            state = state.with_signup_sheet(sheet);
        }

        Ok(Self {
            state: web::Data::new(state),
            config,
            sheet_path,
            _temp_dir: temp_dir,
        })
    }

    pub fn token_for(&self, identity: &Identity) -> String {
        self.state
            .identity_verifier
            .issue_token(identity, chrono::Duration::hours(1))
            .expect("shared-secret verifier issues tokens")
    }

    pub fn session_for(&self, identity: &Identity) -> AuthSession {
        AuthSession::signed_in(
            identity.clone(),
            Arc::new(StaticToken(self.token_for(identity))),
        )
    }

    /// Serve the API on an ephemeral port and return its base URL.
    pub fn spawn_server(&self) -> String {
        self.spawn_server_with_handle().0
    }

    /// Like `spawn_server`, plus a handle for shutting the server down.
    pub fn spawn_server_with_handle(&self) -> (String, ServerHandle) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let port = listener.local_addr().expect("local addr").port();
        let state = self.state.clone();

        let server = HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .wrap(RequestIdMiddleware)
                .configure(routes::configure)
        })
        .workers(1)
        .listen(listener)
        .expect("listen on ephemeral port")
        .run();
        let handle = server.handle();

        actix_web::rt::spawn(server);
        (format!("http://127.0.0.1:{}", port), handle)
    }

    pub fn client_for(&self, base_url: &str, identity: &Identity) -> KitLogClient {
        KitLogClient::for_session(base_url, &self.session_for(identity)).expect("valid base url")
    }

    pub fn anonymous_client(&self, base_url: &str) -> KitLogClient {
        KitLogClient::anonymous(base_url).expect("valid base url")
    }
}
