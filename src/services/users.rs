use std::sync::Arc;

use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{hash_password, verify_password},
    db::DbPool,
    entities::{
        project,
        user::{self, Role},
    },
    errors::ServiceError,
    models::{CreateUserRequest, RegisterRequest, UpdateUserRequest},
};

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Accounts and credentials.
#[derive(Clone)]
pub struct UserService {
    db_pool: Arc<DbPool>,
}

impl UserService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<user::Model>, ServiceError> {
        user::Entity::find()
            .order_by_asc(user::Column::Name)
            .all(&*self.db_pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list users");
                ServiceError::DatabaseError(e)
            })
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: Uuid) -> Result<user::Model, ServiceError> {
        user::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, ServiceError> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(normalize_email(email)))
            .one(&*self.db_pool)
            .await?)
    }

    /// Checks a login. Unknown emails, inactive accounts and wrong passwords are indistinguishable.
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<user::Model, ServiceError> {
        let invalid = || ServiceError::Unauthorized("Invalid email or password".to_string());

        let Some(user) = self.find_by_email(email).await? else {
            warn!("Login attempt for unknown email");
            return Err(invalid());
        };
        if !user.active {
            warn!(user_id = %user.id, "Login attempt for inactive account");
            return Err(invalid());
        }
        if !verify_password(password, &user.password_hash).await? {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(invalid());
        }

        info!(user_id = %user.id, "User authenticated");
        Ok(user)
    }

    /// Self-service sign-up. Cannot grant the admin role.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<user::Model, ServiceError> {
        let role = request.role.unwrap_or_default();
        if role == Role::Admin {
            return Err(ServiceError::Forbidden(
                "admin accounts can only be created by an administrator".to_string(),
            ));
        }

        self.insert_user(&request.name, &request.email, &request.password, role, true)
            .await
    }

    /// Account creation by an administrator.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_user(
        &self,
        request: CreateUserRequest,
    ) -> Result<user::Model, ServiceError> {
        self.insert_user(
            &request.name,
            &request.email,
            &request.password,
            request.role.unwrap_or_default(),
            request.active.unwrap_or(true),
        )
        .await
    }

    async fn insert_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
        active: bool,
    ) -> Result<user::Model, ServiceError> {
        let email = normalize_email(email);
        let password_hash = hash_password(password).await?;

        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.trim().to_string()),
            email: Set(email.clone()),
            password_hash: Set(password_hash),
            role: Set(role),
            active: Set(active),
            ..Default::default()
        };

        let created = model.insert(&*self.db_pool).await.map_err(|e| {
            error!(error = %e, "Failed to create user");
            ServiceError::from_write(e, format!("email {} is already registered", email))
        })?;

        info!(user_id = %created.id, role = %created.role, "User created");
        Ok(created)
    }

    #[instrument(skip(self, request))]
    pub async fn update_user(
        &self,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> Result<user::Model, ServiceError> {
        let existing = self.get_user(id).await?;
        let mut model: user::ActiveModel = existing.into();

        if let Some(name) = request.name {
            model.name = Set(name.trim().to_string());
        }
        let email = request.email.as_deref().map(normalize_email);
        if let Some(email) = &email {
            model.email = Set(email.clone());
        }
        if let Some(password) = request.password {
            model.password_hash = Set(hash_password(&password).await?);
        }
        if let Some(role) = request.role {
            model.role = Set(role);
        }
        if let Some(active) = request.active {
            model.active = Set(active);
        }

        let updated = model.update(&*self.db_pool).await.map_err(|e| {
            error!(error = %e, user_id = %id, "Failed to update user");
            ServiceError::from_write(
                e,
                format!("email {} is already registered", email.unwrap_or_default()),
            )
        })?;

        info!(user_id = %id, "User updated");
        Ok(updated)
    }

    /// Hard-deletes `id` on behalf of `actor`. Nobody can delete their own account.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, actor: Uuid, id: Uuid) -> Result<(), ServiceError> {
        if actor == id {
            return Err(ServiceError::InvalidOperation(
                "you cannot delete your own account".to_string(),
            ));
        }

        let txn = self.db_pool.begin().await?;

        project::Entity::update_many()
            .col_expr(project::Column::CreatedBy, Expr::value(Option::<Uuid>::None))
            .filter(project::Column::CreatedBy.eq(id))
            .exec(&txn)
            .await?;

        let result = user::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("User", id));
        }

        txn.commit().await?;
        info!(user_id = %id, deleted_by = %actor, "User deleted");
        Ok(())
    }

    #[instrument(skip(self, current_password, new_password))]
    pub async fn change_password(
        &self,
        id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        let user = self.get_user(id).await?;
        if !verify_password(current_password, &user.password_hash).await? {
            return Err(ServiceError::Unauthorized(
                "current password is incorrect".to_string(),
            ));
        }

        let mut model: user::ActiveModel = user.into();
        model.password_hash = Set(hash_password(new_password).await?);
        model.update(&*self.db_pool).await?;

        info!(user_id = %id, "Password changed");
        Ok(())
    }

    /// Creates the admin account when no user holds `email` yet. Returns whether one was created.
    #[instrument(skip(self, password))]
    pub async fn ensure_admin(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<bool, ServiceError> {
        if self.find_by_email(email).await?.is_some() {
            return Ok(false);
        }

        self.insert_user(name, email, password, Role::Admin, true)
            .await?;
        info!("Bootstrap admin account created");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{establish_connection, run_migrations};
    use assert_matches::assert_matches;

    async fn service() -> UserService {
        let pool = establish_connection("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        UserService::new(Arc::new(pool))
    }

    fn register_request(email: &str, role: Option<Role>) -> RegisterRequest {
        RegisterRequest {
            name: "Paulo Lima".into(),
            email: email.into(),
            password: "segredo123".into(),
            role,
        }
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Paulo@Enerlight.COM.br "), "paulo@enerlight.com.br");
    }

    #[tokio::test]
    async fn register_then_authenticate_case_insensitively() {
        let users = service().await;
        let created = users
            .register(register_request("Paulo@Enerlight.com.br", None))
            .await
            .unwrap();
        assert_eq!(created.role, Role::Salesperson);
        assert_eq!(created.email, "paulo@enerlight.com.br");

        let logged_in = users
            .authenticate("PAULO@enerlight.com.br", "segredo123")
            .await
            .unwrap();
        assert_eq!(logged_in.id, created.id);

        assert_matches!(
            users.authenticate("paulo@enerlight.com.br", "errada").await,
            Err(ServiceError::Unauthorized(_))
        );
    }

    #[tokio::test]
    async fn registration_cannot_grant_admin() {
        let users = service().await;
        assert_matches!(
            users
                .register(register_request("root@enerlight.com.br", Some(Role::Admin)))
                .await,
            Err(ServiceError::Forbidden(_))
        );
        assert!(users.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let users = service().await;
        users.register(register_request("ana@enerlight.com.br", None)).await.unwrap();
        assert_matches!(
            users.register(register_request(" ANA@enerlight.com.br", None)).await,
            Err(ServiceError::Conflict(_))
        );
    }

    #[tokio::test]
    async fn inactive_accounts_cannot_log_in() {
        let users = service().await;
        let created = users
            .register(register_request("ex@enerlight.com.br", None))
            .await
            .unwrap();
        users
            .update_user(
                created.id,
                UpdateUserRequest {
                    active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_matches!(
            users.authenticate("ex@enerlight.com.br", "segredo123").await,
            Err(ServiceError::Unauthorized(_))
        );
    }

    #[tokio::test]
    async fn self_delete_is_rejected() {
        let users = service().await;
        let admin_created = users
            .ensure_admin("admin@enerlight.com.br", "admin12345", "Admin")
            .await
            .unwrap();
        assert!(admin_created);
        let admin = users.find_by_email("admin@enerlight.com.br").await.unwrap().unwrap();

        assert_matches!(
            users.delete_user(admin.id, admin.id).await,
            Err(ServiceError::InvalidOperation(_))
        );
        assert!(users.get_user(admin.id).await.is_ok());

        assert!(!users
            .ensure_admin("admin@enerlight.com.br", "admin12345", "Admin")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn change_password_requires_current_password() {
        let users = service().await;
        let created = users
            .register(register_request("rita@enerlight.com.br", None))
            .await
            .unwrap();

        assert_matches!(
            users.change_password(created.id, "wrong", "novasenha1").await,
            Err(ServiceError::Unauthorized(_))
        );
        users
            .change_password(created.id, "segredo123", "novasenha1")
            .await
            .unwrap();
        assert!(users
            .authenticate("rita@enerlight.com.br", "novasenha1")
            .await
            .is_ok());
    }
}
