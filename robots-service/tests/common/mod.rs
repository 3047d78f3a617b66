//! Test helpers for robots-service integration tests.
//!
//! Tests that talk to a real MongoDB use `TestApp`, which expects a server at
//! `TEST_MONGO_URI` (default `mongodb://localhost:27017`). Everything else
//! uses a client pointed at an address nothing listens on.

#![allow(dead_code)]

use mongodb::bson::Document;
use mongodb::Client as MongoClient;
use robots_service::config::{MongoConfig, RobotsConfig};
use robots_service::services::RobotsDb;
use robots_service::startup::{build_router, AppState, Application};
use service_core::config::Config as CoreConfig;
use std::time::Duration;
use uuid::Uuid;

/// Nothing listens on port 1; server selection gives up quickly.
pub const UNREACHABLE_URI: &str =
    "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200&connectTimeoutMS=200";

pub fn get_test_mongo_uri() -> String {
    std::env::var("TEST_MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
}

pub fn test_config(uri: &str, database: &str) -> RobotsConfig {
    RobotsConfig {
        common: CoreConfig { port: 0 },
        service_name: "robots-service".to_string(),
        log_level: "debug".to_string(),
        otlp_endpoint: None,
        mongodb: MongoConfig {
            uri: uri.to_string(),
            database: database.to_string(),
            collection: "robots".to_string(),
            query_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(30),
        },
    }
}

/// A handle whose every operation fails with a server selection error.
pub async fn unreachable_db(config: &MongoConfig) -> RobotsDb {
    let client = MongoClient::with_uri_str(&config.uri)
        .await
        .expect("Failed to parse test URI");
    RobotsDb::from_client(client, config)
}

/// Router backed by a database that cannot be reached.
pub async fn offline_router() -> axum::Router {
    offline_router_with(test_config(UNREACHABLE_URI, "robots")).await
}

pub async fn offline_router_with(config: RobotsConfig) -> axum::Router {
    let db = unreachable_db(&config.mongodb).await;
    build_router(AppState { config, db })
}

/// Application running against a live MongoDB with an isolated database.
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: RobotsDb,
    pub db_name: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let db_name = format!("robots_test_{}", Uuid::new_v4().simple());
        let config = test_config(&get_test_mongo_uri(), &db_name);

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let db = app.db().clone();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            db,
            db_name,
        }
    }

    /// Inserts raw documents into the robots collection.
    pub async fn seed(&self, documents: Vec<Document>) {
        if documents.is_empty() {
            return;
        }
        self.db
            .database()
            .collection::<Document>("robots")
            .insert_many(documents, None)
            .await
            .expect("Failed to seed robots");
    }

    pub async fn get_all_robots(&self) -> reqwest::Response {
        reqwest::Client::new()
            .get(format!("{}/all-robots", self.address))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Drops the test database.
    pub async fn cleanup(&self) {
        let _ = self.db.database().drop(None).await;
    }
}
