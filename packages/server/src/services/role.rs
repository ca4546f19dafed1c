use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use tracing::instrument;

use crate::dao::permission::PermissionDao;
use crate::dao::role::RoleDao;
use crate::entity::role;
use crate::error::{AppError, BusError};
use crate::models::permission::PermissionResponse;
use crate::models::role::{RoleFilter, RoleRequest, RoleResponse};
use crate::models::shared::{PageInfo, PageRequest, SimpleItem, dedup_ids};

pub struct RoleService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> RoleService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_role_by_id(&self, id: i32) -> Result<RoleResponse, AppError> {
        let model = RoleDao::new(self.db)
            .find_by_id(id)
            .await?
            .ok_or(BusError::RoleNotExist)?;
        Ok(model.into())
    }

    pub async fn insert_role(&self, req: RoleRequest) -> Result<RoleResponse, AppError> {
        let name = validate_role_name(&req.name)?;
        let now = Utc::now();
        let model = RoleDao::new(self.db)
            .insert(role::ActiveModel {
                name: Set(name),
                description: Set(req.description),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
                ..Default::default()
            })
            .await?;
        Ok(model.into())
    }

    pub async fn update_role(&self, id: i32, req: RoleRequest) -> Result<RoleResponse, AppError> {
        let name = validate_role_name(&req.name)?;
        let dao = RoleDao::new(self.db);
        let existing = dao.find_by_id(id).await?.ok_or(BusError::RoleNotExist)?;

        let mut active: role::ActiveModel = existing.into();
        active.name = Set(name);
        active.description = Set(req.description);
        active.updated_at = Set(Utc::now());
        Ok(dao.update(active).await?.into())
    }

    /// Soft-delete the role and drop its user and permission links.
    #[instrument(skip(self))]
    pub async fn delete_role(&self, id: i32) -> Result<(), AppError> {
        let txn = self.db.begin().await?;
        let dao = RoleDao::new(&txn);
        if !dao.soft_delete(id).await? {
            return Err(BusError::RoleNotExist.into());
        }
        dao.clear_users(id).await?;
        dao.clear_permissions(id).await?;
        txn.commit().await?;
        Ok(())
    }

    pub async fn get_role_list(
        &self,
        filter: &RoleFilter,
        page: &PageRequest<role::Column>,
    ) -> Result<PageInfo<RoleResponse>, AppError> {
        let (rows, total) = RoleDao::new(self.db).find_page(filter, page).await?;
        Ok(PageInfo::new(rows, total).map(RoleResponse::from))
    }

    pub async fn get_simple_role_list(&self) -> Result<Vec<SimpleItem>, AppError> {
        let rows = RoleDao::new(self.db).find_all().await?;
        Ok(rows
            .into_iter()
            .map(|r| SimpleItem {
                id: r.id,
                name: r.name,
            })
            .collect())
    }

    /// Replace the role's grants with `permission_ids`.
    ///
    /// Unknown ids are rejected before anything is written.
    #[instrument(skip(self, permission_ids), fields(count = permission_ids.len()))]
    pub async fn update_role_permissions(
        &self,
        role_id: i32,
        permission_ids: &[i32],
    ) -> Result<(), AppError> {
        let ids = dedup_ids(permission_ids);

        let txn = self.db.begin().await?;
        let dao = RoleDao::new(&txn);
        dao.find_by_id(role_id).await?.ok_or(BusError::RoleNotExist)?;

        let found = PermissionDao::new(&txn).find_by_ids(&ids).await?;
        if found.len() != ids.len() {
            return Err(BusError::PermissionNotExist.into());
        }

        dao.clear_permissions(role_id).await?;
        dao.grant_permissions(role_id, &ids).await?;
        txn.commit().await?;
        Ok(())
    }

    pub async fn get_permission_ids_by_role_id(&self, role_id: i32) -> Result<Vec<i32>, AppError> {
        let dao = RoleDao::new(self.db);
        dao.find_by_id(role_id).await?.ok_or(BusError::RoleNotExist)?;
        Ok(dao.permission_ids(role_id).await?)
    }

    pub async fn get_permissions_by_role_id(
        &self,
        role_id: i32,
    ) -> Result<Vec<PermissionResponse>, AppError> {
        let ids = self.get_permission_ids_by_role_id(role_id).await?;
        let rows = PermissionDao::new(self.db).find_by_ids(&ids).await?;
        Ok(rows.into_iter().map(PermissionResponse::from).collect())
    }
}

fn validate_role_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 64 {
        return Err(AppError::Validation("Role name must be 1-64 characters".into()));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::DateTime;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    use super::*;
    use crate::entity::permission;

    fn role_row(id: i32) -> BTreeMap<&'static str, Value> {
        let now = Utc::now();
        BTreeMap::from([
            ("id", Value::from(id)),
            ("name", Value::from("user")),
            ("description", Value::from("")),
            ("created_at", Value::from(now)),
            ("updated_at", Value::from(now)),
            ("deleted_at", Value::from(None::<DateTime<Utc>>)),
        ])
    }

    #[tokio::test]
    async fn empty_permission_list_clears_all_grants() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![role_row(2)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            }])
            .into_connection();

        RoleService::new(&db)
            .update_role_permissions(2, &[])
            .await
            .unwrap();

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("DELETE FROM"));
        assert!(log.contains("role_permission"));
        assert!(!log.contains("INSERT"));
    }

    #[tokio::test]
    async fn unknown_permission_ids_are_rejected_before_writes() {
        let now = Utc::now();
        let known = permission::Model {
            id: 1,
            parent_id: 0,
            code: "problem:view".into(),
            name: String::new(),
            description: String::new(),
            category: String::new(),
            method: String::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![role_row(2)]])
            .append_query_results([vec![known]])
            .into_connection();

        let err = RoleService::new(&db)
            .update_role_permissions(2, &[1, 1, 404])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Bus(BusError::PermissionNotExist)));
    }

    #[test]
    fn role_names_are_trimmed_and_bounded() {
        assert_eq!(validate_role_name("  admin ").unwrap(), "admin");
        assert!(validate_role_name(" ").is_err());
        assert!(validate_role_name(&"r".repeat(65)).is_err());
    }
}
