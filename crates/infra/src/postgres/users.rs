use std::collections::BTreeSet;

use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row, Transaction};

use reportdesk_core::{GroupId, StoreError, UserId};
use reportdesk_directory::{Gender, User, UserDraft, UserProfile, UserRepository};

use super::map_sqlx_error;

/// `SELECT` over `users` with group memberships folded into each row as an array.
macro_rules! select_user {
    ($clause:literal) => {
        concat!(
            "SELECT u.id, u.username, u.password_hash, \
             u.employee_id, u.last_name, u.first_name, u.middle_name, u.date_of_birth, u.gender, \
             u.address, u.phone_number, u.email, u.position, u.department, u.hire_date, u.notes, \
             u.is_fired, u.created_at, u.updated_at, \
             ARRAY(SELECT g.group_id FROM user_access_groups g WHERE g.user_id = u.id ORDER BY g.group_id) AS group_ids \
             FROM users u ",
            $clause
        )
    };
}

#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, operation: &str, query: Query<'_, Postgres, PgArguments>) -> Result<Vec<User>, StoreError> {
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        rows.iter()
            .map(|row| user_from_row(row).map_err(|e| map_sqlx_error(operation, e)))
            .collect()
    }
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    let gender: Option<String> = row.try_get("gender")?;
    let group_ids: Vec<i64> = row.try_get("group_ids")?;

    Ok(User {
        id: UserId::new(row.try_get("id")?),
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        groups: group_ids.into_iter().map(GroupId::new).collect::<BTreeSet<_>>(),
        profile: UserProfile {
            employee_id: row.try_get("employee_id")?,
            last_name: row.try_get("last_name")?,
            first_name: row.try_get("first_name")?,
            middle_name: row.try_get("middle_name")?,
            date_of_birth: row.try_get("date_of_birth")?,
            gender: gender.as_deref().and_then(Gender::parse),
            address: row.try_get("address")?,
            phone_number: row.try_get("phone_number")?,
            email: row.try_get("email")?,
            position: row.try_get("position")?,
            department: row.try_get("department")?,
            hire_date: row.try_get("hire_date")?,
            notes: row.try_get("notes")?,
        },
        is_fired: row.try_get("is_fired")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

async fn replace_memberships(
    tx: &mut Transaction<'_, Postgres>,
    user: UserId,
    groups: &BTreeSet<GroupId>,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM user_access_groups WHERE user_id = $1")
        .bind(user.get())
        .execute(&mut **tx)
        .await?;
    if groups.is_empty() {
        return Ok(());
    }
    let ids: Vec<i64> = groups.iter().map(|g| g.get()).collect();
    sqlx::query("INSERT INTO user_access_groups (user_id, group_id) SELECT $1, unnest($2::BIGINT[])")
        .bind(user.get())
        .bind(ids)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[async_trait::async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert(&self, draft: UserDraft) -> Result<User, StoreError> {
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error("insert_user", e))?;
        let p = &draft.profile;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (
                username, password_hash,
                employee_id, last_name, first_name, middle_name, date_of_birth, gender,
                address, phone_number, email, position, department, hire_date, notes,
                is_fired, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING id
            "#,
        )
        .bind(&draft.username)
        .bind(&draft.password_hash)
        .bind(&p.employee_id)
        .bind(&p.last_name)
        .bind(&p.first_name)
        .bind(&p.middle_name)
        .bind(p.date_of_birth)
        .bind(p.gender.map(|g| g.as_str()))
        .bind(&p.address)
        .bind(&p.phone_number)
        .bind(&p.email)
        .bind(&p.position)
        .bind(&p.department)
        .bind(p.hire_date)
        .bind(&p.notes)
        .bind(draft.is_fired)
        .bind(draft.created_at)
        .bind(draft.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;

        let id = UserId::new(id);
        replace_memberships(&mut tx, id, &draft.groups)
            .await
            .map_err(|e| map_sqlx_error("insert_user_groups", e))?;
        tx.commit().await.map_err(|e| map_sqlx_error("insert_user", e))?;

        Ok(draft.into_user(id))
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error("update_user", e))?;
        let p = &user.profile;

        sqlx::query(
            r#"
            UPDATE users SET
                username = $2, password_hash = $3,
                employee_id = $4, last_name = $5, first_name = $6, middle_name = $7,
                date_of_birth = $8, gender = $9, address = $10, phone_number = $11,
                email = $12, position = $13, department = $14, hire_date = $15, notes = $16,
                is_fired = $17, updated_at = $18
            WHERE id = $1
            "#,
        )
        .bind(user.id.get())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&p.employee_id)
        .bind(&p.last_name)
        .bind(&p.first_name)
        .bind(&p.middle_name)
        .bind(p.date_of_birth)
        .bind(p.gender.map(|g| g.as_str()))
        .bind(&p.address)
        .bind(&p.phone_number)
        .bind(&p.email)
        .bind(&p.position)
        .bind(&p.department)
        .bind(p.hire_date)
        .bind(&p.notes)
        .bind(user.is_fired)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_user", e))?;

        replace_memberships(&mut tx, user.id, &user.groups)
            .await
            .map_err(|e| map_sqlx_error("update_user_groups", e))?;
        tx.commit().await.map_err(|e| map_sqlx_error("update_user", e))
    }

    async fn delete(&self, id: UserId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_user", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let query = sqlx::query(select_user!("WHERE u.id = $1")).bind(id.get());
        Ok(self.fetch("get_user", query).await?.into_iter().next())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let query = sqlx::query(select_user!("WHERE u.username = $1")).bind(username);
        Ok(self.fetch("find_user_by_username", query).await?.into_iter().next())
    }

    async fn get_many(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        let ids: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let query = sqlx::query(select_user!("WHERE u.id = ANY($1) ORDER BY u.id")).bind(ids);
        self.fetch("get_users", query).await
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        self.fetch("list_users", sqlx::query(select_user!("ORDER BY u.id"))).await
    }

    async fn list_in_group(&self, group: GroupId) -> Result<Vec<User>, StoreError> {
        let query = sqlx::query(select_user!(
            "WHERE EXISTS (SELECT 1 FROM user_access_groups g WHERE g.user_id = u.id AND g.group_id = $1) ORDER BY u.id"
        ))
        .bind(group.get());
        self.fetch("list_users_in_group", query).await
    }
}
