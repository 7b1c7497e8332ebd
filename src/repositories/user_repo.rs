//! PostgreSQL user repository.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult, DatabaseErrorConverter};
use crate::models::{NewUser, User, UserRole};
use crate::repositories::UserRepository;
use crate::schema::users;

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role,
        }
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: AsyncDbPool,
}

impl PgUserRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    /// A concurrent registration of the same email surfaces as
    /// `AppError::Duplicate` through the `users_email_key` constraint.
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let row = UserRow {
            id: Uuid::new_v4(),
            email: new_user.email,
            password_hash: new_user.password_hash,
            role: new_user.role,
        };
        let mut conn = self.pool.get().await?;

        diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(User::from)
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "insert user"))
    }

    async fn find_by_email(&self, user_email: &str) -> AppResult<Option<User>> {
        let mut conn = self.pool.get().await?;

        users::table
            .filter(users::email.eq(user_email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(User::from))
            .map_err(AppError::from)
    }
}
