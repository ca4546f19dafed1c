//! Business logic. Each service borrows the handles it needs from
//! [`crate::state::AppState`] and runs DAOs on the pool or in a transaction.

pub mod account;
pub mod auth;
pub mod permission;
pub mod problem;
pub mod problem_case;
pub mod problem_menu;
pub mod role;
pub mod submission;
pub mod sys_user;

use common::storage::{ObjectStore, StoredObject};

use crate::error::{AppError, BusError};
use crate::utils::filename;

/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn check_password_strength(password: &str) -> Result<(), BusError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(BusError::UserPasswordNotEnoughAccuracy);
    }
    Ok(())
}

/// Trimmed `value`, or `default` when it is absent or blank.
pub(crate) fn or_default(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Store an upload under `<prefix>/<random name>` and return the name.
pub(crate) async fn store_asset(
    storage: &dyn ObjectStore,
    prefix: &str,
    file_name: &str,
    bytes: &[u8],
) -> Result<String, AppError> {
    if bytes.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".into()));
    }
    let name = filename::random_object_name(file_name);
    storage.put(&format!("{prefix}/{name}"), bytes).await?;
    Ok(name)
}

/// Read back an asset stored by [`store_asset`].
pub(crate) async fn read_asset(
    storage: &dyn ObjectStore,
    prefix: &str,
    name: &str,
) -> Result<StoredObject, AppError> {
    let name = filename::validate_flat_filename(name)
        .map_err(|e| AppError::Validation(e.message().into()))?;
    Ok(storage.get(&format!("{prefix}/{name}")).await?)
}
