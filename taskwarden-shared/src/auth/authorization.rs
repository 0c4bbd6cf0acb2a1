//! Authorization engine
//!
//! A single pure decision function gates every task operation. Handlers
//! never test roles inline; they describe the operation (action + scope)
//! and ask [`authorize`] for a verdict, so the rules live in exactly one
//! place.
//!
//! # Rules, evaluated in order
//!
//! 1. No authenticated identity: denied as unauthenticated, whatever the
//!    operation.
//! 2. Read (list/get) of the shared collection: allowed for any
//!    authenticated identity.
//! 3. Write (create/update/delete) of the shared collection: allowed only
//!    for holders of the `admin` role.
//! 4. Anything in the per-owner collection: allowed only when the resource
//!    owner is the caller. Roles play no part here; an admin gets the same
//!    denial as anyone else on a task they do not own.
//!
//! Existence is *not* this module's concern. Callers resolve the target
//! first so that a missing id surfaces as not-found rather than forbidden;
//! only a missing or invalid token outranks that.
//!
//! # Example
//!
//! ```
//! use taskwarden_shared::auth::authorization::{authorize, Action, TaskScope};
//! use taskwarden_shared::auth::middleware::Identity;
//! use taskwarden_shared::models::role::Role;
//! use uuid::Uuid;
//!
//! let admin = Identity {
//!     user_id: Uuid::new_v4(),
//!     username: "root".to_string(),
//!     roles: vec![Role::Admin],
//! };
//!
//! assert!(authorize(Some(&admin), Action::Create, &TaskScope::Shared).is_ok());
//! assert!(authorize(None, Action::List, &TaskScope::Shared).is_err());
//! ```

use uuid::Uuid;

use super::middleware::Identity;
use crate::models::role::Role;

/// Error type for authorization decisions
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// No authenticated identity
    #[error("Authentication credentials were not provided")]
    Unauthenticated,

    /// Authenticated but not permitted
    ///
    /// The message is identical for role and ownership denials so that a
    /// denial does not reveal whether the resource exists under someone
    /// else's ownership.
    #[error("You do not have permission to perform this action")]
    Forbidden,
}

/// Operations a caller can request on a task collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// List a collection
    List,

    /// Fetch a single task
    Get,

    /// Create a task
    Create,

    /// Replace a task's content
    Update,

    /// Remove a task
    Delete,
}

impl Action {
    /// Reads never mutate; everything else does
    pub fn is_read(&self) -> bool {
        matches!(self, Action::List | Action::Get)
    }
}

/// The collection (and, for owned tasks, the recorded owner) an action
/// targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskScope {
    /// The shared, admin-managed collection (`owner_id IS NULL`)
    Shared,

    /// The per-owner collection; `owner_id` is the target's recorded owner
    ///
    /// `owner_id` is `None` when the target row is actually a shared task
    /// reached through the per-owner surface, which no caller owns.
    Owned { owner_id: Option<Uuid> },
}

/// Decides whether `identity` may perform `action` on `scope`
///
/// Pure function of its inputs; never touches the database.
///
/// # Errors
///
/// - `AuthzError::Unauthenticated` when there is no identity
/// - `AuthzError::Forbidden` when the role/ownership rules deny the action
pub fn authorize(
    identity: Option<&Identity>,
    action: Action,
    scope: &TaskScope,
) -> Result<(), AuthzError> {
    let identity = identity.ok_or(AuthzError::Unauthenticated)?;

    match scope {
        TaskScope::Shared => {
            if action.is_read() || identity.has_role(Role::Admin) {
                Ok(())
            } else {
                Err(AuthzError::Forbidden)
            }
        }
        TaskScope::Owned { owner_id } => {
            if *owner_id == Some(identity.user_id) {
                Ok(())
            } else {
                Err(AuthzError::Forbidden)
            }
        }
    }
}
