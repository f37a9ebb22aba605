pub mod body;
pub mod decoders;
pub mod host;
pub mod imap_client;
