pub mod config;
pub mod domain;
pub mod mail;
pub mod speech;
pub mod terminal;
pub mod watch;
