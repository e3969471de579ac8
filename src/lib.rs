pub mod board;
pub mod cli;
pub mod poller;
pub mod push;
pub mod settings;
pub mod source;
pub mod status;
pub mod terminal;
