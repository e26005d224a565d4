//! Clap derive structures for the `loomap` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// loomap -- find, add and review public toilets
#[derive(Debug, Parser)]
#[command(
    name = "loomap",
    version,
    about = "Find, add and review public toilets from the command line",
    long_about = "A command-line client for a loomap toilet-map backend.\n\n\
        Log in once, then list facilities, add new ones at a coordinate\n\
        (the address is looked up for you), and read or write reviews.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "LOOMAP_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend base URL (overrides profile)
    #[arg(long, short = 'u', env = "LOOMAP_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Your position as "lat,lng" (overrides profile)
    #[arg(long, env = "LOOMAP_LOCATION", global = true)]
    pub location: Option<String>,

    /// Where the login credential is kept (overrides profile)
    #[arg(long, env = "LOOMAP_CREDENTIAL_STORE", global = true)]
    pub credential_store: Option<CredentialStoreKind>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "LOOMAP_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "LOOMAP_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "LOOMAP_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CredentialStoreKind {
    /// System keyring
    Keyring,
    /// Owner-only file in the data directory
    File,
}

// ── Facility classifications ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GenderArg {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AccessArg {
    Free,
    Paid,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session credential
    Login(LoginArgs),

    /// Create a new account
    Register(LoginArgs),

    /// Forget the stored session credential
    Logout,

    /// Show the current session
    Whoami,

    /// List, inspect, add and delete toilets
    #[command(alias = "t")]
    Toilets(ToiletsArgs),

    /// Read and write reviews
    #[command(alias = "r")]
    Reviews(ReviewsArgs),

    /// Show your position, its address, and the map center
    Locate,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SESSION
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account name (prompted if omitted)
    #[arg(long, short = 'n')]
    pub username: Option<String>,

    /// Read the password from the first line of stdin
    #[arg(long)]
    pub password_stdin: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TOILETS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ToiletsArgs {
    #[command(subcommand)]
    pub command: ToiletsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ToiletsCommand {
    /// List all toilets
    #[command(alias = "ls")]
    List {
        /// Only entries with a valid location
        #[arg(long)]
        mappable: bool,
    },

    /// Show one toilet
    Show {
        /// Toilet ID
        id: String,
    },

    /// Add a toilet at a coordinate
    Add(AddToiletArgs),

    /// Delete a toilet
    #[command(alias = "rm")]
    Delete {
        /// Toilet ID
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct AddToiletArgs {
    /// Where it is, as "lat,lng"
    #[arg(long)]
    pub at: String,

    /// Display name
    #[arg(long)]
    pub name: String,

    #[arg(long, value_enum, default_value = "male")]
    pub gender: GenderArg,

    #[arg(long, value_enum, default_value = "free")]
    pub access: AccessArg,

    /// Street address (looked up from the coordinate if omitted)
    #[arg(long)]
    pub address: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  REVIEWS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ReviewsArgs {
    #[command(subcommand)]
    pub command: ReviewsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ReviewsCommand {
    /// List reviews of a toilet
    #[command(alias = "ls")]
    List {
        /// Toilet ID
        toilet: String,
    },

    /// Review a toilet
    Add {
        /// Toilet ID
        toilet: String,

        #[arg(long)]
        title: String,

        #[arg(long)]
        body: String,

        /// Score from 0 to 5
        #[arg(long, allow_negative_numbers = true)]
        score: i32,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a profile value
    Set {
        /// Profile key (e.g., "api_url", "location")
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the geocoder API key in the system keyring
    SetGeocoderKey {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
