//! Access to the remote aggregation service from the producing role.

/// Delivery failures.
pub mod error;
/// reqwest backed client.
pub mod http;

use futures::future::BoxFuture;

use crate::dto::transfer::{ReceiveResponse, TransferEnvelope};

pub use self::error::{DeliveryError, DeliveryResult};
pub use self::http::{HttpRemoteStore, RemoteConfig};

/// The remote store's receive operation as seen by the producing role.
pub trait RemoteStore: Send + Sync {
    /// Deliver a batch. Anything but an accepted batch is an error.
    fn receive_transfer(
        &self,
        envelope: TransferEnvelope,
    ) -> BoxFuture<'static, DeliveryResult<ReceiveResponse>>;
    /// Cheap reachability probe.
    fn health_check(&self) -> BoxFuture<'static, DeliveryResult<()>>;
    /// Short human readable target used in logs.
    fn describe(&self) -> String;
}
