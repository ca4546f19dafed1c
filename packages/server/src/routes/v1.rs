use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{
    self, account, auth, permission, problem, problem_case, problem_menu, role, submission, user,
};
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/account", account_routes())
        .nest("/permissions", permission_routes())
        .nest("/roles", role_routes())
        .nest("/users", user_routes())
        .nest("/problems", problem_routes())
        .nest("/problem-menus", problem_menu_routes())
        .nest("/submissions", submission_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(auth::send_code))
        .routes(routes!(auth::login_by_password))
        .routes(routes!(auth::login_by_email))
        .routes(routes!(auth::register))
        .routes(routes!(auth::me))
}

fn account_routes() -> OpenApiRouter<AppState> {
    let upload = OpenApiRouter::new()
        .routes(routes!(account::upload_avatar))
        .layer(handlers::image_upload_body_limit());

    OpenApiRouter::new()
        .routes(routes!(account::get_info, account::update_info))
        .routes(routes!(account::change_password))
        .routes(routes!(account::reset_password))
        .routes(routes!(account::read_avatar))
        .merge(upload)
}

fn permission_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            permission::list_permissions,
            permission::create_permission
        ))
        .routes(routes!(permission::get_tree))
        .routes(routes!(permission::count_permissions))
        .routes(routes!(
            permission::get_permission,
            permission::update_permission,
            permission::delete_permission
        ))
        .routes(routes!(permission::get_children))
}

fn role_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(role::list_roles, role::create_role))
        .routes(routes!(role::list_simple_roles))
        .routes(routes!(role::get_role, role::update_role, role::delete_role))
        .routes(routes!(
            role::get_role_permissions,
            role::set_role_permissions
        ))
        .routes(routes!(role::get_role_permission_ids))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(user::list_users, user::create_user))
        .routes(routes!(user::get_user, user::update_user, user::delete_user))
        .routes(routes!(user::get_user_roles, user::set_user_roles))
}

fn problem_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(problem::list_problems, problem::create_problem))
        .routes(routes!(problem::list_public_problems))
        .routes(routes!(problem::check_number))
        .routes(routes!(problem::get_problem_by_number))
        .routes(routes!(
            problem::get_problem,
            problem::update_problem,
            problem::delete_problem
        ))
        .routes(routes!(problem::set_enable))
        .routes(routes!(problem::get_template))
        .merge(problem_case_routes())
}

fn problem_case_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(problem_case::list_cases, problem_case::create_case))
        .routes(routes!(problem_case::new_case_name))
        .routes(routes!(problem_case::check_case_name))
        .routes(routes!(
            problem_case::get_case,
            problem_case::update_case,
            problem_case::delete_case
        ))
}

fn problem_menu_routes() -> OpenApiRouter<AppState> {
    let upload = OpenApiRouter::new()
        .routes(routes!(problem_menu::upload_icon))
        .layer(handlers::image_upload_body_limit());

    OpenApiRouter::new()
        .routes(routes!(problem_menu::list_menus, problem_menu::create_menu))
        .routes(routes!(problem_menu::list_all_menus))
        .routes(routes!(problem_menu::list_simple_menus))
        .routes(routes!(
            problem_menu::get_menu,
            problem_menu::update_menu,
            problem_menu::delete_menu
        ))
        .routes(routes!(problem_menu::read_icon))
        .merge(upload)
}

fn submission_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            submission::list_submissions,
            submission::record_submission
        ))
        .routes(routes!(submission::get_activity))
        .routes(routes!(submission::get_activity_years))
}
