//! Session factory and reconnect policy.
//!
//! One session per connection attempt. The policy is deliberately
//! asymmetric: loss of an established connection is retried immediately
//! and unconditionally, while a connection attempt that fails outright
//! stops the whole process.

use tracing::{error, warn};

use crate::client::Connection;
use crate::config::Config;
use crate::error::SessionError;

/// Constructs a fresh protocol session per connection attempt.
pub struct SessionFactory {
    config: Config,
}

impl SessionFactory {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run connection attempts until a fatal error.
    ///
    /// No backoff and no attempt limit on reconnect, matching the minimal
    /// policy in scope.
    pub async fn run(&self) -> Result<(), SessionError> {
        loop {
            let connection = match Connection::establish(&self.config).await {
                Ok(connection) => connection,
                Err(e) => {
                    error!(error = %e, "connection attempt failed");
                    return Err(e);
                }
            };

            match connection.run().await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_connection_loss() => {
                    warn!(error = %e, "connection lost, reconnecting");
                }
                Err(e) => {
                    error!(error = %e, "session failed");
                    return Err(e);
                }
            }
        }
    }
}
