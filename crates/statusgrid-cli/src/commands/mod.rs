pub mod init;
pub mod poll;
pub mod validate;
