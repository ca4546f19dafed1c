pub mod permission;
pub mod problem;
pub mod problem_attempt;
pub mod problem_case;
pub mod problem_menu;
pub mod problem_menu_problem;
pub mod role;
pub mod role_permission;
pub mod submission;
pub mod user;
pub mod user_role;
