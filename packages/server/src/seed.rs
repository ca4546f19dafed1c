use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Set};
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::dao::permission::PermissionDao;
use crate::dao::role::RoleDao;
use crate::dao::user::UserDao;
use crate::entity::{
    permission, problem_case, problem_menu_problem, role, role_permission, submission, user,
    user_role,
};
use crate::utils::hash;

/// A permission created on startup. `parent` names the parent's code.
struct SeedPermission {
    code: &'static str,
    name: &'static str,
    category: &'static str,
    method: &'static str,
    parent: Option<&'static str>,
}

/// Default permission forest; parents come before their children.
const PERMISSIONS: &[SeedPermission] = &[
    SeedPermission {
        code: "system",
        name: "系统管理",
        category: "menu",
        method: "",
        parent: None,
    },
    SeedPermission {
        code: "permission:manage",
        name: "权限管理",
        category: "api",
        method: "*",
        parent: Some("system"),
    },
    SeedPermission {
        code: "role:manage",
        name: "角色管理",
        category: "api",
        method: "*",
        parent: Some("system"),
    },
    SeedPermission {
        code: "user:manage",
        name: "用户管理",
        category: "api",
        method: "*",
        parent: Some("system"),
    },
    SeedPermission {
        code: "problem",
        name: "题库",
        category: "menu",
        method: "",
        parent: None,
    },
    SeedPermission {
        code: "problem:manage",
        name: "题目管理",
        category: "api",
        method: "*",
        parent: Some("problem"),
    },
    SeedPermission {
        code: "problem:view",
        name: "题目浏览",
        category: "api",
        method: "GET",
        parent: Some("problem"),
    },
    SeedPermission {
        code: "submission:record",
        name: "评测回调",
        category: "api",
        method: "POST",
        parent: Some("problem"),
    },
];

/// Role holding every seeded permission.
pub const ADMIN_ROLE: &str = "admin";

/// Login name of the seeded administrator.
pub const ADMIN_LOGIN_NAME: &str = "admin";

/// Permissions of the role new registrations receive.
const DEFAULT_ROLE_GRANTS: &[&str] = &["problem:view"];

/// Seed permissions, the admin and default roles, and, on an empty user
/// table, the admin account.
///
/// Existing rows are left alone, so this runs on every startup.
pub async fn seed_defaults(db: &DatabaseConnection, auth: &AuthConfig) -> Result<(), DbErr> {
    let ids = seed_permissions(db).await?;

    let all: Vec<i32> = PERMISSIONS.iter().filter_map(|p| ids.get(p.code).copied()).collect();
    let admin_role = seed_role(db, ADMIN_ROLE, "全部权限", &all).await?;

    let defaults: Vec<i32> = DEFAULT_ROLE_GRANTS
        .iter()
        .filter_map(|code| ids.get(code).copied())
        .collect();
    seed_role(db, &auth.default_role, "注册用户", &defaults).await?;

    seed_admin(db, admin_role, auth).await
}

async fn seed_permissions(db: &DatabaseConnection) -> Result<HashMap<&'static str, i32>, DbErr> {
    let dao = PermissionDao::new(db);
    let mut ids = HashMap::new();
    let mut inserted = 0u32;

    for seed in PERMISSIONS {
        if let Some(existing) = dao.find_by_code(seed.code).await? {
            ids.insert(seed.code, existing.id);
            continue;
        }
        let parent_id = match seed.parent {
            Some(code) => ids.get(code).copied().ok_or_else(|| {
                DbErr::Custom(format!("seed parent {code} of {} is missing", seed.code))
            })?,
            None => permission::ROOT_PARENT_ID,
        };
        let now = Utc::now();
        let model = dao
            .insert(permission::ActiveModel {
                parent_id: Set(parent_id),
                code: Set(seed.code.to_string()),
                name: Set(seed.name.to_string()),
                description: Set(String::new()),
                category: Set(seed.category.to_string()),
                method: Set(seed.method.to_string()),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
                ..Default::default()
            })
            .await?;
        ids.insert(seed.code, model.id);
        inserted += 1;
    }

    if inserted > 0 {
        info!("Seeded {} new permissions", inserted);
    }
    Ok(ids)
}

/// Create `name` if missing and grant whichever of `permission_ids` it lacks.
async fn seed_role(
    db: &DatabaseConnection,
    name: &str,
    description: &str,
    permission_ids: &[i32],
) -> Result<i32, DbErr> {
    let dao = RoleDao::new(db);
    let role_id = match dao.find_by_name(name).await? {
        Some(existing) => existing.id,
        None => {
            let now = Utc::now();
            let model = dao
                .insert(role::ActiveModel {
                    name: Set(name.to_string()),
                    description: Set(description.to_string()),
                    created_at: Set(now),
                    updated_at: Set(now),
                    deleted_at: Set(None),
                    ..Default::default()
                })
                .await?;
            info!("Seeded role {}", name);
            model.id
        }
    };

    let granted = dao.permission_ids(role_id).await?;
    let missing: Vec<i32> = permission_ids
        .iter()
        .copied()
        .filter(|id| !granted.contains(id))
        .collect();
    if !missing.is_empty() {
        dao.grant_permissions(role_id, &missing).await?;
        info!("Granted {} permissions to role {}", missing.len(), name);
    }
    Ok(role_id)
}

async fn seed_admin(db: &DatabaseConnection, admin_role: i32, auth: &AuthConfig) -> Result<(), DbErr> {
    let dao = UserDao::new(db);
    if dao.count().await? > 0 {
        return Ok(());
    }

    let password = hash::hash_password(&auth.default_password)
        .map_err(|e| DbErr::Custom(format!("hashing the admin password failed: {e}")))?;
    let now = Utc::now();
    let admin = dao
        .insert(user::ActiveModel {
            avatar: Set(String::new()),
            user_name: Set("administrator".into()),
            login_name: Set(ADMIN_LOGIN_NAME.into()),
            password: Set(password),
            email: Set(String::new()),
            phone: Set(String::new()),
            introduction: Set(String::new()),
            gender: Set(1),
            birthday: Set(now.date_naive()),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        })
        .await?;
    dao.grant_roles(admin.id, &[admin_role]).await?;

    warn!(
        "Seeded account {:?} with the configured default password; change it after first login",
        ADMIN_LOGIN_NAME
    );
    Ok(())
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup. Failures are logged, not fatal.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Activity queries:
    // SELECT created_at FROM submission WHERE user_id = ? AND created_at >= ? AND created_at < ?
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_submission_user_created")
        .table(submission::Entity)
        .col(submission::Column::UserId)
        .col(submission::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);
    create_index(db, "idx_submission_user_created", &stmt).await;

    // Case name checks and name generation within one problem.
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_problem_case_problem_name")
        .table(problem_case::Entity)
        .col(problem_case::Column::ProblemId)
        .col(problem_case::Column::CaseName)
        .to_string(PostgresQueryBuilder);
    create_index(db, "idx_problem_case_problem_name", &stmt).await;

    // Join tables are keyed (left, right); lookups from the right side need
    // their own index.
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_user_role_role")
        .table(user_role::Entity)
        .col(user_role::Column::RoleId)
        .to_string(PostgresQueryBuilder);
    create_index(db, "idx_user_role_role", &stmt).await;

    let stmt = Index::create()
        .if_not_exists()
        .name("idx_role_permission_permission")
        .table(role_permission::Entity)
        .col(role_permission::Column::PermissionId)
        .to_string(PostgresQueryBuilder);
    create_index(db, "idx_role_permission_permission", &stmt).await;

    let stmt = Index::create()
        .if_not_exists()
        .name("idx_problem_menu_problem_problem")
        .table(problem_menu_problem::Entity)
        .col(problem_menu_problem::Column::ProblemId)
        .to_string(PostgresQueryBuilder);
    create_index(db, "idx_problem_menu_problem_problem", &stmt).await;

    Ok(())
}

async fn create_index(db: &DatabaseConnection, name: &str, stmt: &str) {
    match db.execute_unprepared(stmt).await {
        Ok(_) => info!("Ensured index {} exists", name),
        Err(e) => warn!("Failed to create index {}: {}", name, e),
    }
}
