use crate::storage::{
    gateway::{check_credential, check_placement, created_name, StorageGateway},
    model::{
        RemoteErrorKind, RemoteHandle, RemoteOperationError, RemoteResourceDescriptor,
        ResourceKind, ResourcePath,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use sqlx::PgPool;

/// 持久化在 PostgreSQL 里的存储服务模拟
pub struct PostgresGateway {
    pool: PgPool,
}

fn db_error(context: &str, e: sqlx::Error) -> RemoteOperationError {
    RemoteOperationError::new(RemoteErrorKind::Network, format!("{}: {}", context, e))
}

fn parse_kind(raw: &str) -> Result<ResourceKind, RemoteOperationError> {
    ResourceKind::parse(raw).ok_or_else(|| {
        RemoteOperationError::new(RemoteErrorKind::Other, format!("未知的资源类型: {}", raw))
    })
}

impl PostgresGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 初始化资源表
    pub async fn init(&self) -> Result<(), RemoteOperationError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS storage_resources (
                id BIGSERIAL PRIMARY KEY,
                account TEXT NOT NULL,
                service TEXT NOT NULL,
                path TEXT NOT NULL,
                parent_path TEXT NOT NULL,
                name TEXT NOT NULL,
                kind TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                UNIQUE(account, service, path)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("创建资源表失败", e))?;

        info!("存储资源表初始化完成");
        Ok(())
    }

    async fn kind_of(
        &self,
        handle: &RemoteHandle,
        service: &str,
        path: &ResourcePath,
    ) -> Result<Option<ResourceKind>, RemoteOperationError> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT kind FROM storage_resources WHERE account = $1 AND service = $2 AND path = $3",
        )
        .bind(handle.account.name.as_str())
        .bind(service)
        .bind(path.to_wire())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("查询资源失败", e))?;

        row.map(|(kind,)| parse_kind(&kind)).transpose()
    }
}

#[async_trait]
impl StorageGateway for PostgresGateway {
    async fn create_child(
        &self,
        parent: &ResourcePath,
        name: &str,
        kind: ResourceKind,
        handle: &RemoteHandle,
    ) -> Result<RemoteResourceDescriptor, RemoteOperationError> {
        check_credential(handle)?;
        let service = kind.service().as_str();

        let parent_kind = if parent.is_root() {
            None
        } else {
            let found = self.kind_of(handle, service, parent).await?;
            Some(found.ok_or_else(|| {
                RemoteOperationError::new(
                    RemoteErrorKind::NotFound,
                    format!("父资源 '{}' 不存在", parent),
                )
            })?)
        };
        check_placement(parent, parent_kind, kind)?;

        let path = parent.join(name);
        let inserted: Option<(DateTime<Utc>,)> = sqlx::query_as(
            r#"
            INSERT INTO storage_resources (account, service, path, parent_path, name, kind)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (account, service, path) DO NOTHING
            RETURNING created_at
            "#,
        )
        .bind(handle.account.name.as_str())
        .bind(service)
        .bind(path.to_wire())
        .bind(parent.to_wire())
        .bind(name)
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("创建资源失败", e))?;

        let (created_at,) = inserted.ok_or_else(|| {
            RemoteOperationError::new(RemoteErrorKind::Conflict, format!("资源 '{}' 已存在", path))
        })?;
        debug!("数据库创建资源: {} ({})", path, kind);

        Ok(RemoteResourceDescriptor {
            name: created_name(&path, kind),
            kind,
            created_at,
        })
    }

    async fn delete_resource(
        &self,
        path: &ResourcePath,
        kind: ResourceKind,
        handle: &RemoteHandle,
    ) -> Result<(), RemoteOperationError> {
        check_credential(handle)?;
        let service = kind.service().as_str();

        if self.kind_of(handle, service, path).await? != Some(kind) {
            return Err(RemoteOperationError::new(
                RemoteErrorKind::NotFound,
                format!("{} '{}' 不存在", kind.noun(), path),
            ));
        }

        // 容器连同子资源一起删除；用前缀比较而不是 LIKE，名字里可能有 % 和 _
        let wire = path.to_wire();
        let result = sqlx::query(
            r#"
            DELETE FROM storage_resources
            WHERE account = $1 AND service = $2
              AND (path = $3 OR ($4 AND left(path, length($3) + 1) = $3 || '/'))
            "#,
        )
        .bind(handle.account.name.as_str())
        .bind(service)
        .bind(wire.as_str())
        .bind(kind.is_container())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("删除资源失败", e))?;

        debug!("数据库删除资源: {}，共移除 {} 行", wire, result.rows_affected());
        Ok(())
    }

    async fn list_children(
        &self,
        parent: &ResourcePath,
        kind: ResourceKind,
        handle: &RemoteHandle,
    ) -> Result<Vec<RemoteResourceDescriptor>, RemoteOperationError> {
        check_credential(handle)?;
        let service = kind.service().as_str();

        if !parent.is_root() && self.kind_of(handle, service, parent).await?.is_none() {
            return Err(RemoteOperationError::new(
                RemoteErrorKind::NotFound,
                format!("父资源 '{}' 不存在", parent),
            ));
        }

        let rows: Vec<(String, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT name, created_at FROM storage_resources
            WHERE account = $1 AND service = $2 AND parent_path = $3 AND kind = $4
            ORDER BY name
            "#,
        )
        .bind(handle.account.name.as_str())
        .bind(service)
        .bind(parent.to_wire())
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("查询子资源失败", e))?;

        Ok(rows
            .into_iter()
            .map(|(name, created_at)| RemoteResourceDescriptor {
                name,
                kind,
                created_at,
            })
            .collect())
    }
}
