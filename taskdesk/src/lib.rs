//! `TaskDesk`: client-side session and task state for a personal to-do app.

pub mod config;
pub mod forms;
pub mod guards;
mod loading;
pub mod notify;
pub mod provider;
pub mod router;
pub mod session;
pub mod shell;
pub mod tasks;
