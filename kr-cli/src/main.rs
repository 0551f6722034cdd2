mod completions;
mod describe;
mod get;
mod replay;
mod source;

use clap::{
    CommandFactory,
    Parser,
    Subcommand,
};
use kr_core::prelude::*;

#[derive(Parser)]
#[command(
    about = "Reconstruct the lifecycle of Kubernetes pods and nodes from API-server audit logs",
    version,
    propagate_version = true
)]
struct KubereplayCommand {
    #[command(subcommand)]
    subcommand: KubereplaySubcommand,

    #[arg(
        short,
        long,
        global = true,
        default_value = "info",
        long_help = "log filter directive (trace, debug, info, warn, error, or any EnvFilter directive)"
    )]
    verbosity: String,
}

#[derive(Subcommand)]
enum KubereplaySubcommand {
    #[command(about = "print the last recorded body of an object as YAML")]
    Get(replay::Args),

    #[command(about = "print the lifecycle timeline of an object")]
    Describe(replay::Args),

    #[command(about = "generate shell completions for kubereplay")]
    Completions(completions::Args),
}

#[tokio::main]
async fn main() -> EmptyResult {
    let args = KubereplayCommand::parse();
    logging::setup(&args.verbosity);

    match &args.subcommand {
        KubereplaySubcommand::Get(args) => get::cmd(args).await,
        KubereplaySubcommand::Describe(args) => describe::cmd(args).await,
        KubereplaySubcommand::Completions(args) => completions::cmd(args, KubereplayCommand::command()),
    }
}

#[cfg(test)]
mod tests;
