use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use reportdesk_auth::PermissionSet;
use reportdesk_core::{GroupId, StoreError};
use reportdesk_directory::{AccessGroup, AccessGroupRepository, GroupDraft};

use super::map_sqlx_error;

const COLUMNS: &str = "id, name, description, permissions";

#[derive(Debug, Clone)]
pub struct PostgresAccessGroupRepository {
    pool: PgPool,
}

impl PostgresAccessGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn group_from_row(row: &PgRow) -> Result<AccessGroup, sqlx::Error> {
    let permissions: Vec<String> = row.try_get("permissions")?;
    Ok(AccessGroup {
        id: GroupId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        permissions: PermissionSet::from_names(permissions),
    })
}

fn decode(operation: &str, rows: Vec<PgRow>) -> Result<Vec<AccessGroup>, StoreError> {
    rows.iter()
        .map(|row| group_from_row(row).map_err(|e| map_sqlx_error(operation, e)))
        .collect()
}

#[async_trait::async_trait]
impl AccessGroupRepository for PostgresAccessGroupRepository {
    async fn insert(&self, draft: GroupDraft) -> Result<AccessGroup, StoreError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO access_groups (name, description, permissions) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.permissions.names())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_group", e))?;

        Ok(draft.into_group(GroupId::new(id)))
    }

    async fn get(&self, id: GroupId) -> Result<Option<AccessGroup>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM access_groups WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_group", e))?;
        row.as_ref()
            .map(group_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_group", e))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<AccessGroup>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM access_groups WHERE name = $1"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_group_by_name", e))?;
        row.as_ref()
            .map(group_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("find_group_by_name", e))
    }

    async fn get_many(&self, ids: &[GroupId]) -> Result<Vec<AccessGroup>, StoreError> {
        let ids: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM access_groups WHERE id = ANY($1) ORDER BY id"))
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_groups", e))?;
        decode("get_groups", rows)
    }

    async fn list(&self) -> Result<Vec<AccessGroup>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM access_groups ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_groups", e))?;
        decode("list_groups", rows)
    }
}
