pub mod apply;
pub mod init;
pub mod presets;
pub mod repl;
