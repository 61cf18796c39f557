use std::ffi::OsString;

use clap::Parser;
use gx_core::GalaxyToolError;

mod cli_args;
mod commands;
mod error_map;
mod models;
mod source_loader;

pub(crate) use cli_args::{Cli, Mode, ScanArgs, SnippetArgs, TreeArgs};
pub(crate) use error_map::{
    emit_error, map_cli_json_encode, map_cli_source_path, map_cli_source_read,
    map_cli_source_scan,
};
pub(crate) use models::LoadedTool;
pub(crate) use source_loader::{load_tool, read_xml_sources_from_dir, resolve_tools_dir};
#[cfg(test)]
pub(crate) use source_loader::resolve_path;

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    if simplelog::SimpleLogger::init(cli.log_level, simplelog::Config::default()).is_err() {
        log::debug!("Logger already installed.");
    }
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, GalaxyToolError> {
    match cli.command {
        Mode::Snippet(args) => commands::run_snippet(args),
        Mode::Tree(args) => commands::run_tree(args),
        Mode::Scan(args) => commands::run_scan(args),
    }
}
