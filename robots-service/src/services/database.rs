use crate::config::MongoConfig;
use crate::models::Record;
use crate::services::error::RobotsError;
use futures::TryStreamExt;
use metrics::{counter, histogram};
use mongodb::{
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client as MongoClient, Collection, Database,
};
use std::time::{Duration, Instant};

/// The process-wide handle to the robots collection. Clones share one
/// underlying driver client.
#[derive(Clone)]
pub struct RobotsDb {
    client: MongoClient,
    db: Database,
    robots: Collection<Record>,
    query_timeout: Duration,
}

impl RobotsDb {
    /// Connects and pings the deployment; fails if the ping does not succeed.
    pub async fn connect(config: &MongoConfig) -> Result<Self, RobotsError> {
        tracing::info!(database = %config.database, "Connecting to MongoDB");

        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(RobotsError::Connection)?;
        options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());

        let client = MongoClient::with_options(options).map_err(RobotsError::Connection)?;
        let db = Self::from_client(client, config);

        db.ping().await.map_err(|e| {
            tracing::error!("Failed to ping MongoDB: {}", e);
            RobotsError::Connection(e)
        })?;

        tracing::info!(
            database = %config.database,
            collection = %config.collection,
            "Pinged your deployment. Successfully connected to MongoDB"
        );
        Ok(db)
    }

    /// Wraps an existing client without checking that the server is reachable.
    pub fn from_client(client: MongoClient, config: &MongoConfig) -> Self {
        let db = client.database(&config.database);
        let robots = db.collection(&config.collection);
        Self {
            client,
            db,
            robots,
            query_timeout: config.query_timeout,
        }
    }

    pub async fn ping(&self) -> Result<(), mongodb::error::Error> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), RobotsError> {
        self.ping().await.map_err(|e| {
            tracing::error!("MongoDB health check failed: {}", e);
            RobotsError::Query(e)
        })
    }

    /// Reads every record in the collection, in storage order.
    ///
    /// The scan runs on its own task so it completes (or times out) even if
    /// the caller is dropped.
    pub async fn fetch_all(&self) -> Result<Vec<Record>, RobotsError> {
        let robots = self.robots.clone();
        let query_timeout = self.query_timeout;
        let start = Instant::now();

        let scan = tokio::spawn(async move {
            tokio::time::timeout(query_timeout, async move {
                let cursor = robots.find(doc! {}, None).await?;
                cursor.try_collect::<Vec<Record>>().await
            })
            .await
        });

        let result = match scan.await {
            Ok(Ok(Ok(records))) => Ok(records),
            Ok(Ok(Err(e))) => Err(RobotsError::Query(e)),
            Ok(Err(_elapsed)) => Err(RobotsError::Timeout(query_timeout)),
            Err(e) => Err(RobotsError::Internal(format!("scan task failed: {}", e))),
        };

        histogram!("robots_db_query_duration_seconds").record(start.elapsed().as_secs_f64());

        match &result {
            Ok(records) => {
                counter!("robots_records_fetched_total").increment(records.len() as u64);
                tracing::debug!(count = records.len(), "Fetched robots");
            }
            Err(e) => {
                counter!("robots_db_query_failures_total").increment(1);
                tracing::error!(error = %e, "Failed to fetch robots");
            }
        }

        result
    }

    /// Closes the client. Any other clones become unusable afterwards.
    ///
    /// The driver waits for open cursors, including those of scans still
    /// running for clients that already hung up, so `timeout` should be at
    /// least the query timeout.
    pub async fn disconnect(self, timeout: Duration) -> Result<(), RobotsError> {
        tracing::info!("Disconnecting from MongoDB");
        tokio::time::timeout(timeout, self.client.shutdown())
            .await
            .map_err(|_| RobotsError::Shutdown(format!("timed out after {:?}", timeout)))?;
        tracing::info!("Disconnected from MongoDB");
        Ok(())
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}
