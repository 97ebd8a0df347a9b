use crate::prelude::*;
use clap::Parser;

mod check;
mod deploy;
mod error;
mod generate;
mod github;
mod license;
mod prelude;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Generate small web apps with an LLM and publish them to GitHub"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "REPOPILOT_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Generate index.html and README.md from a brief
    Generate(crate::generate::GenerateOptions),

    /// GitHub repository operations
    #[command(name = "github")]
    GitHub(crate::github::App),

    /// Generate an app and publish it to a repository
    Deploy(crate::deploy::DeployOptions),

    /// Verify the GitHub and completion service credentials
    Check(crate::check::CheckOptions),

    /// Print an MIT license
    License(crate::license::LicenseOptions),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Generate(options) => crate::generate::run(options, app.global).await,
        SubCommands::GitHub(sub_app) => crate::github::run(sub_app, app.global).await,
        SubCommands::Deploy(options) => crate::deploy::run(options, app.global).await,
        SubCommands::Check(options) => crate::check::run(options, app.global).await,
        SubCommands::License(options) => crate::license::run(options, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
