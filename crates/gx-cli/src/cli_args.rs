use clap::{Args, Parser, Subcommand, ValueEnum};
use gx_testgen::PlaceholderNumbering;
use simplelog::LevelFilter;

#[derive(Debug, Parser)]
#[command(name = "gx-cli")]
#[command(about = "Galaxy tool test-case snippet generator")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,

    /// Logging level.
    #[arg(long, global = true, default_value = "Warn")]
    pub(crate) log_level: LevelFilter,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    /// Print `<test>` snippets for every input branch of a tool.
    Snippet(SnippetArgs),
    /// Print the input tree of a tool.
    Tree(TreeArgs),
    /// Count the test cases of every tool under a directory.
    Scan(ScanArgs),
}

#[derive(Debug, Args)]
pub(crate) struct SnippetArgs {
    #[arg(long = "tool")]
    pub(crate) tool: String,
    #[arg(long = "tab-size", default_value_t = 4)]
    pub(crate) tab_size: usize,
    #[arg(long = "numbering", value_enum, default_value_t = Numbering::PerFragment)]
    pub(crate) numbering: Numbering,
}

#[derive(Debug, Args)]
pub(crate) struct TreeArgs {
    #[arg(long = "tool")]
    pub(crate) tool: String,
    #[arg(long = "json")]
    pub(crate) json: bool,
}

#[derive(Debug, Args)]
pub(crate) struct ScanArgs {
    #[arg(long = "tools-dir")]
    pub(crate) tools_dir: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Numbering {
    PerFragment,
    Continuous,
}

impl From<Numbering> for PlaceholderNumbering {
    fn from(numbering: Numbering) -> Self {
        match numbering {
            Numbering::PerFragment => PlaceholderNumbering::PerFragment,
            Numbering::Continuous => PlaceholderNumbering::Continuous,
        }
    }
}
