pub mod clients;
pub mod init;
pub mod process;
pub mod products;
pub mod search;
