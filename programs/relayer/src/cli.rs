//! Contains the command line interface for the relayer.

use clap::Parser;

/// The command line interface for the relayer.
#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct RelayerCli {
    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// The subcommands for the relayer.
#[derive(Clone, Debug, Parser)]
pub enum Commands {
    /// Start relaying source blocks to the destination chain.
    Start(StartArgs),
}

/// The arguments of the start subcommand.
#[derive(Clone, Debug, Parser)]
pub struct StartArgs {
    /// Path to the JSON configuration file.
    #[clap(long, short = 'c', default_value = "relayer.json")]
    pub config: String,

    /// The first block to relay, overriding `scan.start`.
    #[clap(long)]
    pub start: Option<u32>,

    /// The block to stop before, overriding `scan.end`.
    #[clap(long)]
    pub end: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_start_with_overrides() {
        let cli = RelayerCli::parse_from([
            "bridge-relayer",
            "start",
            "--config",
            "cfg.json",
            "--start",
            "100",
        ]);
        let Commands::Start(args) = cli.command;
        assert_eq!(args.config, "cfg.json");
        assert_eq!(args.start, Some(100));
        assert_eq!(args.end, None);
    }

    #[test]
    fn config_defaults_to_relayer_json() {
        let cli = RelayerCli::parse_from(["bridge-relayer", "start"]);
        let Commands::Start(args) = cli.command;
        assert_eq!(args.config, "relayer.json");
    }
}
