mod fetch;
mod harvest;
mod init;
mod query;

pub use fetch::cmd_fetch;
pub use harvest::cmd_harvest;
pub use init::cmd_init;
pub use query::{cmd_list_queries, cmd_run_query};
