use crate::{
    config::ReadConfig,
    error::{ReadError, ReadResult},
    reader::ChainReader,
};
use backoff::{backoff::Backoff, future::retry_notify};
use nads_central_gate::WalletAddress;
use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};

/// Wraps a [`ChainReader`] with a per-attempt timeout and bounded retries
#[derive(Clone)]
pub struct BalanceFetcher {
    reader: Arc<dyn ChainReader>,
    config: ReadConfig,
}

impl BalanceFetcher {
    pub fn new(reader: Arc<dyn ChainReader>) -> Self {
        Self::with_config(reader, ReadConfig::default())
    }

    pub fn with_config(reader: Arc<dyn ChainReader>, config: ReadConfig) -> Self {
        Self { reader, config }
    }

    pub fn reader(&self) -> &Arc<dyn ChainReader> {
        &self.reader
    }

    pub fn config(&self) -> &ReadConfig {
        &self.config
    }

    pub async fn fetch(&self, owner: &WalletAddress) -> ReadResult<u64> {
        self.fetch_with_notify(owner, |_, _| {}).await
    }

    /// Fetch a balance, calling `notify` before each retry with the error
    /// that caused it and the wait before the next attempt
    pub async fn fetch_with_notify<N>(&self, owner: &WalletAddress, mut notify: N) -> ReadResult<u64>
    where
        N: FnMut(&ReadError, Duration) + Send,
    {
        let mut backoff = self.config.retry_backoff.clone();
        backoff.reset();
        let max_retries = self.config.max_retries;
        let attempt_timeout = self.config.attempt_timeout;
        let mut attempts = 0usize;

        let result = retry_notify(
            backoff,
            || {
                attempts += 1;
                let attempt = attempts;
                let reader = self.reader.clone();
                let owner = owner.clone();

                async move {
                    let outcome =
                        match tokio::time::timeout(attempt_timeout, reader.read_balance(&owner))
                            .await
                        {
                            Ok(outcome) => outcome,
                            Err(_) => Err(ReadError::Timeout(attempt_timeout)),
                        };

                    match outcome {
                        Ok(balance) => {
                            debug!("Balance of {} is {} (attempt {})", owner, balance, attempt);
                            Ok(balance)
                        }
                        Err(err) if err.is_transient() && attempt <= max_retries => {
                            Err(backoff::Error::Transient {
                                err,
                                retry_after: None,
                            })
                        }
                        Err(err) => Err(backoff::Error::Permanent(err)),
                    }
                }
            },
            |err: ReadError, wait: Duration| {
                warn!("Balance read failed, retrying in {:?}: {}", wait, err);
                notify(&err, wait);
            },
        )
        .await;

        result.map_err(|err| {
            if err.is_transient() {
                ReadError::RetriesExhausted {
                    retries: attempts.saturating_sub(1),
                    last_error: err.to_string(),
                }
            } else {
                err
            }
        })
    }
}
