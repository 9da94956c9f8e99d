use std::sync::Arc;

use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};

use crate::error::{AppError, AppResult};

/// A request's exclusive hold on one pooled connection
///
/// Clones share the same slot. The connection goes back to its pool when
/// [`release`](Self::release) takes it out of the slot; later calls find the
/// slot empty and do nothing.
#[derive(Debug)]
pub struct Lease<C> {
    slot: Arc<Mutex<Option<C>>>,
}

impl<C> Clone for Lease<C> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<C> Lease<C> {
    pub fn new(conn: C) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(conn))),
        }
    }

    /// Locks the connection for one statement
    ///
    /// Fails once the lease has been released.
    pub async fn get(&self) -> AppResult<MappedMutexGuard<'_, C>> {
        MutexGuard::try_map(self.slot.lock().await, Option::as_mut)
            .map_err(|_| AppError::Internal("connection lease already released".to_string()))
    }

    /// Returns the connection to its pool. `true` only for the call that
    /// actually released it.
    pub async fn release(&self) -> bool {
        let conn = self.slot.lock().await.take();
        match conn {
            Some(conn) => {
                drop(conn);
                true
            }
            None => false,
        }
    }

    pub async fn is_released(&self) -> bool {
        self.slot.lock().await.is_none()
    }
}
