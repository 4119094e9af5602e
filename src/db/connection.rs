//! Connection management.
//!
//! A [`MongoSession`] owns the driver client for the lifetime of one
//! invocation. Use [`with_session`] so the client is shut down on every path.

use crate::config::Config;
use crate::error::{DbError, DbResult};
use mongodb::Client;
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use tracing::{debug, info, warn};

/// Application name reported to the server.
pub const APP_NAME: &str = "mlongo";

/// An established session with the server.
#[derive(Debug)]
pub struct MongoSession {
    pub(crate) client: Client,
}

impl MongoSession {
    /// Connect and verify the server answers a `ping` within the timeout.
    pub async fn connect(config: &Config) -> DbResult<Self> {
        let uri = config.connection_string()?;
        let timeout = config.connect_timeout_duration();

        info!(
            uri = %config.redacted_connection_string()?,
            timeout_secs = config.connect_timeout,
            "Connecting to MongoDB"
        );

        let attempt = async {
            let mut options = ClientOptions::parse(&uri).await?;
            options.app_name = Some(APP_NAME.to_string());
            options.connect_timeout = Some(timeout);
            options.server_selection_timeout = Some(timeout);

            let client = Client::with_options(options)?;
            client
                .database("admin")
                .run_command(doc! { "ping": 1 })
                .await?;
            Ok::<Client, mongodb::error::Error>(client)
        };

        match tokio::time::timeout(timeout, attempt).await {
            Ok(Ok(client)) => {
                debug!(host = %config.host, port = config.port, "Connected");
                Ok(Self { client })
            }
            Ok(Err(err)) => {
                warn!(error = %err, "Connection attempt failed");
                Err(connect_error(err))
            }
            Err(_) => {
                warn!(timeout_secs = config.connect_timeout, "Connection attempt timed out");
                Err(DbError::connection(
                    format!(
                        "no response from {}:{} within {}s",
                        config.host, config.port, config.connect_timeout
                    ),
                    "Check that the server is running and reachable at host:port",
                ))
            }
        }
    }

    /// Shut the client down, waiting for in-flight work to finish.
    pub async fn close(self) {
        debug!("Closing MongoDB client");
        self.client.shutdown().await;
    }
}

/// Any driver failure before the session exists is a connection failure.
fn connect_error(err: mongodb::error::Error) -> DbError {
    match DbError::from_driver("connect", err) {
        DbError::Operation { message, .. } => {
            DbError::connection(message, "Check the host, port and credentials")
        }
        other => other,
    }
}

/// Connect, run `body` against the session, then close the session.
///
/// The session is closed whether or not `body` succeeds; the body's result
/// is returned unchanged.
pub async fn with_session<T, F>(config: &Config, body: F) -> DbResult<T>
where
    F: AsyncFnOnce(&MongoSession) -> DbResult<T>,
{
    let session = MongoSession::connect(config).await?;
    let result = body(&session).await;
    session.close().await;
    result
}
