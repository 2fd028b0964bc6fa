// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Authentication collaborator.

use serde::{Deserialize, Serialize};

use crate::remote::RemoteFuture;

/// Profile of the signed-in user, used for attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
}

/// Auth state provider. Token management lives behind this trait.
pub trait AuthProvider: Send + Sync {
    fn is_authenticated(&self) -> bool;

    /// The cached profile, if it has been loaded.
    fn current_user(&self) -> Option<CurrentUser>;

    /// Load the profile if it is not cached yet.
    fn ensure_current_user_loaded(&self) -> RemoteFuture<'_, CurrentUser>;
}
