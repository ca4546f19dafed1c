mod common;

mod account;
mod auth;
mod permission;
mod problem;
mod problem_menu;
mod role;
mod submission;
