pub mod add;
pub mod audit_cmd;
pub mod backup;
pub mod change_password;
pub mod delete;
pub mod generate;
pub mod get;
pub mod init;
pub mod list;
pub mod rotate;
pub mod security;
pub mod shard;
pub mod share;
