//! Clap derive structures for the `meshprov` CLI.
//!
//! The default action (no subcommand) provisions every inventory AP on one
//! building floor; subcommands cover the standalone controller operations
//! and configuration helpers.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// meshprov -- provision mesh APs on a mobility controller from a CSV inventory
#[derive(Debug, Parser)]
#[command(
    name = "meshprov",
    version,
    about = "Provision wireless mesh APs from a CSV inventory",
    long_about = "Reads an inventory of APs (building, role, floor, MAC, name), selects\n\
        the rows for one building floor, and provisions each AP on the mobility\n\
        controller: name, AP group and mesh role, then reprovision (the AP reboots).\n\n\
        A building that collides with a subcommand name must follow `--`.",
    propagate_version = true,
    subcommand_negates_reqs = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(flatten)]
    pub provision: ProvisionArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "MESHPROV_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Controller profile to use
    #[arg(long, short = 'p', env = "MESHPROV_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller API URL (overrides profile)
    #[arg(long, short = 'c', env = "MESHPROV_CONTROLLER", global = true)]
    pub controller: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true, conflicts_with = "verify_tls")]
    pub insecure: bool,

    /// Verify the controller's TLS certificate
    #[arg(long, global = true)]
    pub verify_tls: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "MESHPROV_TIMEOUT", global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Progress lines plus a summary table
    Table,
    /// Pretty-printed JSON
    Json,
    /// Progress lines only (scripting)
    Plain,
}

// ── Provisioning ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProvisionArgs {
    /// Building to provision (case-insensitive)
    #[arg(required = true)]
    pub building: Option<String>,

    /// Floor to provision (exact match, "3" is not "03")
    #[arg(required = true)]
    pub floor: Option<String>,

    /// Print the matching APs without contacting the controller
    #[arg(long, short = 'd')]
    pub dry: bool,

    /// Inventory CSV file
    #[arg(
        long,
        short = 'i',
        env = "MESHPROV_INVENTORY",
        default_value = "input.csv",
        value_name = "PATH"
    )]
    pub inventory: PathBuf,

    /// Keep going after a failed step instead of stopping the run
    #[arg(long)]
    pub continue_on_error: bool,
}

// ── Subcommands ──────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rename an AP by serial number
    Rename(RenameArgs),

    /// Move an AP to another AP group by serial number
    Regroup(RegroupArgs),

    /// Manage meshprov configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct RenameArgs {
    /// AP serial number
    pub serial: String,

    /// New AP name
    pub name: String,
}

#[derive(Debug, Args)]
pub struct RegroupArgs {
    /// AP serial number
    pub serial: String,

    /// Target AP group
    pub group: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the resolved configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,

    /// Set the default profile
    Use {
        /// Profile name to make the default
        name: String,
    },

    /// Store a profile's password in the system keyring
    SetPassword {
        /// Profile to store the password for (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn positional_building_and_floor() {
        let cli = Cli::try_parse_from(["meshprov", "-d", "East", "3"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.provision.dry);
        assert_eq!(cli.provision.building.as_deref(), Some("East"));
        assert_eq!(cli.provision.floor.as_deref(), Some("3"));
    }

    #[test]
    fn subcommand_does_not_need_positionals() {
        let cli = Cli::try_parse_from(["meshprov", "rename", "CN123", "EAST-3-01"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Rename(_))));
    }

    #[test]
    fn floor_is_required_without_subcommand() {
        assert!(Cli::try_parse_from(["meshprov", "East"]).is_err());
    }
}
