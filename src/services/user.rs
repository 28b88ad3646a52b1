//! User service implementation
//!
//! This service handles account creation and lookup, including linking
//! students to their parent accounts.

use std::sync::Arc;
use tracing::{info, debug};
use crate::models::user::{User, Role, CreateUserRequest};
use crate::store::UserStore;
use crate::utils::errors::{SchoolDeskError, Result};
use crate::utils::helpers::normalize_whitespace;
use super::auth::{require, Actor};

/// User service for managing user operations
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

/// Basic email shape check
fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'),
        None => false,
    }
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Create an account; admin only
    pub async fn create_user(&self, actor: &Actor, mut request: CreateUserRequest) -> Result<User> {
        require(actor.is_admin(), actor, "create accounts")?;

        request.name = normalize_whitespace(&request.name);
        request.email = request.email.trim().to_lowercase();
        if request.name.is_empty() {
            return Err(SchoolDeskError::Validation("Name is required".to_string()));
        }
        if !is_valid_email(&request.email) {
            return Err(SchoolDeskError::Validation(format!("Invalid email: {}", request.email)));
        }

        if let Some(guardian_id) = request.guardian_id {
            if request.role != Role::Student {
                return Err(SchoolDeskError::Validation("Only students have a guardian".to_string()));
            }
            let guardian = self
                .store
                .get_user(guardian_id)
                .await?
                .ok_or_else(|| SchoolDeskError::user_not_found(guardian_id))?;
            if guardian.role != Role::Parent {
                return Err(SchoolDeskError::Validation(format!(
                    "Guardian {} is not a parent account",
                    guardian_id
                )));
            }
        }

        let user = self.store.create_user(request).await?;
        info!(user_id = user.id, role = %user.role, "User created");
        Ok(user)
    }

    /// Get user by ID
    pub async fn get_user(&self, user_id: i64) -> Result<User> {
        debug!(user_id = user_id, "Getting user by ID");
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| SchoolDeskError::user_not_found(user_id))
    }

    /// Students linked to a parent account
    pub async fn children(&self, actor: &Actor, parent_id: i64) -> Result<Vec<User>> {
        require(actor.role.is_staff() || actor.user_id == parent_id, actor, "list these children")?;
        self.store.list_children(parent_id).await
    }
}
