use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use tracing::{info, instrument};

use crate::dao::permission::PermissionDao;
use crate::dao::role::RoleDao;
use crate::entity::permission::{self, ROOT_PARENT_ID};
use crate::error::{AppError, BusError};
use crate::models::permission::{PermissionRequest, PermissionResponse, PermissionTreeNode};
use crate::models::shared::{PageInfo, PageRequest};

/// Deepest subtree level a recursive delete will descend to.
pub const MAX_TREE_DEPTH: usize = 32;

pub struct PermissionService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> PermissionService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn insert_permission(&self, req: PermissionRequest) -> Result<i32, AppError> {
        let code = req.code.unwrap_or_default().trim().to_string();
        if code.is_empty() {
            return Err(AppError::Validation("Permission code must not be empty".into()));
        }
        let parent_id = req.parent_id.unwrap_or(ROOT_PARENT_ID);
        let dao = PermissionDao::new(self.db);
        if parent_id != ROOT_PARENT_ID && dao.find_by_id(parent_id).await?.is_none() {
            return Err(BusError::PermissionNotExist.into());
        }

        let now = Utc::now();
        let model = dao
            .insert(permission::ActiveModel {
                parent_id: Set(parent_id),
                code: Set(code),
                name: Set(req.name.unwrap_or_default()),
                description: Set(req.description.unwrap_or_default()),
                category: Set(req.category.unwrap_or_default()),
                method: Set(req.method.unwrap_or_default()),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
                ..Default::default()
            })
            .await?;
        Ok(model.id)
    }

    pub async fn update_permission(
        &self,
        id: i32,
        req: PermissionRequest,
    ) -> Result<PermissionResponse, AppError> {
        let dao = PermissionDao::new(self.db);
        let existing = dao
            .find_by_id(id)
            .await?
            .ok_or(BusError::PermissionNotExist)?;

        let mut active: permission::ActiveModel = existing.into();
        if let Some(parent_id) = req.parent_id {
            if parent_id == id {
                return Err(AppError::Validation(
                    "A permission cannot be its own parent".into(),
                ));
            }
            if parent_id != ROOT_PARENT_ID && dao.find_by_id(parent_id).await?.is_none() {
                return Err(BusError::PermissionNotExist.into());
            }
            active.parent_id = Set(parent_id);
        }
        if let Some(code) = req.code {
            let code = code.trim().to_string();
            if code.is_empty() {
                return Err(AppError::Validation("Permission code must not be empty".into()));
            }
            active.code = Set(code);
        }
        if let Some(name) = req.name {
            active.name = Set(name);
        }
        if let Some(description) = req.description {
            active.description = Set(description);
        }
        if let Some(category) = req.category {
            active.category = Set(category);
        }
        if let Some(method) = req.method {
            active.method = Set(method);
        }
        active.updated_at = Set(Utc::now());

        Ok(dao.update(active).await?.into())
    }

    pub async fn get_permission_by_id(&self, id: i32) -> Result<PermissionResponse, AppError> {
        let model = PermissionDao::new(self.db)
            .find_by_id(id)
            .await?
            .ok_or(BusError::PermissionNotExist)?;
        Ok(model.into())
    }

    pub async fn get_permission_count(&self) -> Result<u64, AppError> {
        Ok(PermissionDao::new(self.db).count().await?)
    }

    pub async fn get_permission_list(
        &self,
        keyword: Option<&str>,
        page: &PageRequest<permission::Column>,
    ) -> Result<PageInfo<PermissionResponse>, AppError> {
        let (rows, total) = PermissionDao::new(self.db).find_page(keyword, page).await?;
        Ok(PageInfo::new(rows, total).map(PermissionResponse::from))
    }

    pub async fn get_child_permissions(
        &self,
        parent_id: i32,
    ) -> Result<Vec<PermissionResponse>, AppError> {
        let rows = PermissionDao::new(self.db).find_children(parent_id).await?;
        Ok(rows.into_iter().map(PermissionResponse::from).collect())
    }

    pub async fn get_permission_tree(&self) -> Result<Vec<PermissionTreeNode>, AppError> {
        let rows = PermissionDao::new(self.db).find_all().await?;
        Ok(build_tree(rows)?)
    }

    /// Soft-delete `id` and every descendant, children before parents, in
    /// one transaction. Grants of the deleted permissions are revoked too.
    ///
    /// Returns the deleted ids in deletion order.
    #[instrument(skip(self))]
    pub async fn delete_permission_by_id(&self, id: i32) -> Result<Vec<i32>, AppError> {
        let txn = self.db.begin().await?;
        let dao = PermissionDao::new(&txn);
        if dao.find_by_id(id).await?.is_none() {
            return Err(BusError::PermissionNotExist.into());
        }

        let mut visited = HashSet::new();
        let mut deleted = Vec::new();
        // (id, depth, children already pushed)
        let mut stack = vec![(id, 0usize, false)];
        while let Some((node, depth, expanded)) = stack.pop() {
            if expanded {
                dao.soft_delete(node).await?;
                deleted.push(node);
                continue;
            }
            if !visited.insert(node) {
                tracing::error!(node, "Permission parent chain contains a cycle");
                return Err(BusError::PermissionUnknownError.into());
            }
            if depth >= MAX_TREE_DEPTH {
                tracing::error!(node, depth, "Permission subtree is too deep");
                return Err(BusError::PermissionUnknownError.into());
            }
            stack.push((node, depth, true));
            let children = dao.find_children(node).await?;
            stack.extend(children.iter().rev().map(|c| (c.id, depth + 1, false)));
        }

        RoleDao::new(&txn)
            .revoke_permission_everywhere(&deleted)
            .await?;
        txn.commit().await?;

        info!(count = deleted.len(), "Deleted permission subtree");
        Ok(deleted)
    }
}

/// Assemble a forest from a flat parent-pointer list. Siblings keep input
/// order.
///
/// A node whose parent is missing, or that no root reaches, makes the whole
/// tree invalid.
pub fn build_tree(rows: Vec<permission::Model>) -> Result<Vec<PermissionTreeNode>, BusError> {
    let total = rows.len();
    let ids: HashSet<i32> = rows.iter().map(|r| r.id).collect();

    let mut by_parent: HashMap<i32, Vec<permission::Model>> = HashMap::new();
    for row in rows {
        if row.parent_id != ROOT_PARENT_ID && !ids.contains(&row.parent_id) {
            tracing::error!(
                id = row.id,
                parent_id = row.parent_id,
                "Permission refers to a missing parent"
            );
            return Err(BusError::PermissionUnknownError);
        }
        by_parent.entry(row.parent_id).or_default().push(row);
    }

    let mut placed = 0;
    let roots = attach(ROOT_PARENT_ID, &mut by_parent, &mut placed);
    if placed != total {
        tracing::error!(placed, total, "Permission rows unreachable from any root");
        return Err(BusError::PermissionUnknownError);
    }
    Ok(roots)
}

fn attach(
    parent_id: i32,
    by_parent: &mut HashMap<i32, Vec<permission::Model>>,
    placed: &mut usize,
) -> Vec<PermissionTreeNode> {
    let Some(children) = by_parent.remove(&parent_id) else {
        return Vec::new();
    };
    children
        .into_iter()
        .map(|model| {
            *placed += 1;
            let id = model.id;
            let mut node = PermissionTreeNode::from(model);
            node.children = attach(id, by_parent, placed);
            node
        })
        .collect()
}
