use anyhow::{anyhow, Result};
use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl};
use futures::Future;
use serde_json::{json, Value};

pub use crate::client::*;

use planner_api::Server;
use planner_db::object_id::UserId;
use planner_db::test::{create_database, DatabaseInfo, DatabaseUser, TestDatabase};
use planner_db::PoolExt;

pub struct TestApp {
    pub database: TestDatabase,
    pub info: DatabaseInfo,
    /// A client logged in as the fixture admin.
    pub admin: TestClient,
    /// A client with no session.
    pub anonymous: TestClient,
    pub base_url: String,
}

async fn start_app(database: TestDatabase, info: DatabaseInfo) -> Result<TestApp> {
    let config = planner_api::config::Config {
        database_url: database.url.clone(),
        database_connections: 4,
        port: 0, // Bind to random port
        host: "127.0.0.1".to_string(),
        honeycomb_team: None,
        honeycomb_dataset: String::new(),
        env: "test".to_string(),
        jaeger_endpoint: None,
        cookie_key: "QjX+c1Nggom7lrxVTJFxMI7iQ0BRVr1oR9N64orRgdW3pp/SV+lE/1FOwo12UZj9QoBUUuv2rvcO0x+Omq+25Q==".to_string(),
        session_cookie_name: "sid".to_string(),
        session_expire_days: 1,
    };
    planner_test::init_tracing();
    let Server { server, host, port } = planner_api::create_server(config).await?;

    tokio::task::spawn(server);

    let base_url = format!("http://{}:{}/api", host, port);
    let app = TestApp {
        admin: TestClient::new(base_url.clone()),
        anonymous: TestClient::new(base_url.clone()),
        base_url,
        database,
        info,
    };

    app.login(&app.admin, &app.info.admin_user).await?;
    Ok(app)
}

pub async fn run_app_test<F, R>(f: F)
where
    F: FnOnce(TestApp) -> R,
    R: Future<Output = Result<(), anyhow::Error>>,
{
    let (database, info) = create_database().await.expect("Creating database");
    let app = start_app(database.clone(), info)
        .await
        .expect("Starting app");
    f(app).await.unwrap();
    database.drop_db().expect("Cleaning up");
}

impl TestApp {
    /// Log the client in, returning the login response body.
    pub async fn login(&self, client: &TestClient, user: &DatabaseUser) -> Result<Value> {
        let password = user
            .password
            .as_deref()
            .ok_or_else(|| anyhow!("{} has no password", user.username))?;
        let response = client
            .post("auth/login")
            .json(&json!({ "username": user.username, "password": password }))
            .send()
            .await?;

        if response.status() != 200 {
            return Err(anyhow!("Login as {} failed: {}", user.username, response.status()));
        }

        Ok(response.json().await?)
    }

    /// A fresh client logged in as the given user.
    pub async fn client_for(&self, user: &DatabaseUser) -> Result<TestClient> {
        let client = TestClient::new(self.base_url.clone());
        self.login(&client, user).await?;
        Ok(client)
    }

    /// Add another active user straight to the database.
    pub async fn add_user(&self, username: &str, full_name: &str) -> Result<DatabaseUser> {
        let username = username.to_string();
        let full_name = full_name.to_string();
        self.database
            .pool
            .interact(move |conn| planner_db::test::add_user(conn, &username, &full_name, false))
            .await
            .map_err(anyhow::Error::from)
    }

    pub async fn set_active(&self, user_id: UserId, active: bool) -> Result<()> {
        self.database
            .pool
            .interact(move |conn| {
                diesel::update(planner_db::schema::users::table.find(user_id))
                    .set(planner_db::schema::users::is_active.eq(active))
                    .execute(conn)?;
                Ok::<_, planner_db::Error>(())
            })
            .await?;
        Ok(())
    }
}

/// The `kind` field of an error response.
pub async fn error_kind(response: reqwest::Response) -> Result<String> {
    let body: Value = response.json().await?;
    body["error"]["kind"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow!("No error kind in {body}"))
}

/// The user ids in a membership listing, in order.
pub fn user_ids(list: &Value) -> Vec<String> {
    list.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["userId"].as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}
