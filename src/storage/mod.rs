//! Storage strategy for entities that keep working without an account.
//!
//! Watchlist items and stock notes live in the remote table store when the
//! caller is signed in, and in the per-device store otherwise. The backend is
//! picked once per call from the session; operations then dispatch on it.

pub mod device;
pub mod notes;
pub mod watchlist;

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::session::Session;

pub use device::DeviceStore;

#[derive(Debug, Clone, Copy)]
pub enum Backend<'a> {
    Remote { pool: &'a PgPool, owner: Uuid },
    Device { store: &'a DeviceStore, device_id: &'a str },
}

impl<'a> Backend<'a> {
    /// Remote when the session has a user, device when it only carries a
    /// device id, otherwise unauthorized.
    pub fn select(
        pool: &'a PgPool,
        store: &'a DeviceStore,
        session: &'a Session,
    ) -> Result<Self, AppError> {
        if let Some(user) = &session.user {
            return Ok(Backend::Remote { pool, owner: user.id });
        }

        match session.device_id.as_deref() {
            Some(device_id) => Ok(Backend::Device { store, device_id }),
            None => Err(AppError::Unauthorized),
        }
    }
}
