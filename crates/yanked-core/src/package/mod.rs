pub mod info;
pub mod install;
pub mod record;
pub mod remove;
pub mod runner;
pub mod update;
pub mod url;
