pub mod account;
pub mod auth;
pub mod permission;
pub mod problem;
pub mod problem_case;
pub mod problem_menu;
pub mod role;
pub mod shared;
pub mod submission;
pub mod user;
