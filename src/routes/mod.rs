mod auth;
mod health_check;
mod me;
mod tasks;

pub use auth::{logout, refresh, signin, signup};
pub use health_check::health_check;
pub use me::get_me;
pub use tasks::{create_task, delete_task, get_task, list_tasks, update_task};
