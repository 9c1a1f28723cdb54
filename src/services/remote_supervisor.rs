use std::{sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{dao::remote_store::RemoteStore, state::SharedState};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const MAX_PROBE_ATTEMPTS: u32 = 3;

/// Poll the remote store and keep the shared degraded flag in sync with its reachability.
///
/// Degraded mode is informational; transfers are still attempted while it is set.
pub async fn run(state: SharedState, remote: Arc<dyn RemoteStore>) {
    let poll_interval = state.config().health_poll_interval;
    let target = remote.describe();

    loop {
        match remote.health_check().await {
            Ok(()) => {
                if state.is_degraded() {
                    info!(target = %target, "remote store reachable again; leaving degraded mode");
                    state.update_degraded(false);
                }
                sleep(poll_interval).await;
            }
            Err(err) => {
                warn!(target = %target, error = %err, "remote health check failed");

                let mut attempt = 0;
                let mut retry_delay = INITIAL_DELAY;
                let mut recovered = false;
                while attempt < MAX_PROBE_ATTEMPTS {
                    sleep(retry_delay).await;
                    match remote.health_check().await {
                        Ok(()) => {
                            recovered = true;
                            break;
                        }
                        Err(probe_err) => {
                            if attempt == 0 {
                                warn!(
                                    attempt, error = %probe_err,
                                    "remote store still unreachable; entering degraded mode"
                                );
                                state.update_degraded(true);
                            } else {
                                warn!(attempt, error = %probe_err, "remote probe attempt failed");
                            }
                            attempt += 1;
                            retry_delay = (retry_delay * 2).min(MAX_DELAY);
                        }
                    }
                }

                if recovered {
                    state.update_degraded(false);
                    sleep(poll_interval).await;
                } else {
                    warn!("exhausted remote probe attempts; staying in degraded mode");
                    sleep(MAX_DELAY.max(poll_interval)).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use futures::future::BoxFuture;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            document_store::MemoryDocumentStore,
            remote_store::{DeliveryError, DeliveryResult},
        },
        dto::transfer::{ReceiveResponse, TransferEnvelope},
        services::render::SvgChartRenderer,
        state::AppState,
    };

    struct FlakyRemote {
        up: Arc<AtomicBool>,
    }

    impl RemoteStore for FlakyRemote {
        fn receive_transfer(
            &self,
            _envelope: TransferEnvelope,
        ) -> BoxFuture<'static, DeliveryResult<ReceiveResponse>> {
            Box::pin(async {
                Err(DeliveryError::Rejected {
                    message: "unused".into(),
                })
            })
        }

        fn health_check(&self) -> BoxFuture<'static, DeliveryResult<()>> {
            let up = self.up.load(Ordering::SeqCst);
            Box::pin(async move {
                if up {
                    Ok(())
                } else {
                    Err(DeliveryError::Rejected {
                        message: "down".into(),
                    })
                }
            })
        }

        fn describe(&self) -> String {
            "flaky".into()
        }
    }

    #[tokio::test]
    async fn degraded_flag_follows_remote_reachability() {
        let up = Arc::new(AtomicBool::new(false));
        let remote: Arc<dyn RemoteStore> = Arc::new(FlakyRemote { up: up.clone() });
        let state = AppState::new(
            AppConfig::default(),
            Arc::new(MemoryDocumentStore::new()),
            Some(remote.clone()),
            Arc::new(SvgChartRenderer),
        );
        let mut watcher = state.degraded_watcher();

        tokio::spawn(run(state.clone(), remote));

        let limit = Duration::from_secs(10);
        tokio::time::timeout(limit, watcher.changed())
            .await
            .unwrap()
            .unwrap();
        assert!(*watcher.borrow_and_update());

        up.store(true, Ordering::SeqCst);
        tokio::time::timeout(limit, watcher.changed())
            .await
            .unwrap()
            .unwrap();
        assert!(!*watcher.borrow_and_update());
    }
}
