use std::fmt;
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;

use crate::config::BigQuerySourceConfig;
use crate::errors::Result;
use crate::user::SourceName;

/// An already serialized JSON document.
#[derive(Clone, PartialEq, Eq)]
pub struct EncJson(Bytes);

impl EncJson {
    pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(EncJson(Bytes::from(serde_json::to_vec(value)?)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// Parse the document back into a value.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_slice(&self.0)?)
    }
}

impl fmt::Debug for EncJson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EncJson")
            .field(&String::from_utf8_lossy(&self.0))
            .finish()
    }
}

pub type ActionFuture = BoxFuture<'static, Result<EncJson>>;

/// Work to run once the caller decides to.
///
/// Creating an action does nothing beyond capturing its inputs. The future is
/// only created, and any I/O started, by [`DeferredAction::invoke`]. Actions
/// are consumed on invoke so they run at most once.
pub struct DeferredAction {
    thunk: Box<dyn FnOnce() -> ActionFuture + Send>,
}

impl DeferredAction {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<EncJson>> + Send + 'static,
    {
        DeferredAction {
            thunk: Box::new(move || f().boxed()),
        }
    }

    /// An action that returns `value` without doing any work.
    pub fn constant(value: EncJson) -> Self {
        Self::new(move || futures::future::ready(Ok(value)))
    }

    pub async fn invoke(self) -> Result<EncJson> {
        (self.thunk)().await
    }
}

impl fmt::Debug for DeferredAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DeferredAction")
    }
}

/// Everything needed to run one root field against a source.
#[derive(Debug)]
pub struct QueryStep {
    pub source_name: SourceName,
    pub source_config: Arc<BigQuerySourceConfig>,
    /// Set for explain steps only.
    pub explain: Option<String>,
    pub action: DeferredAction,
}

impl QueryStep {
    pub async fn run(self) -> Result<EncJson> {
        self.action.invoke().await
    }
}
