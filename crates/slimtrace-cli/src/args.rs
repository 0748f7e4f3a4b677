use std::fmt;

use clap::{Parser, Subcommand, ValueEnum};

use slimtrace_catalog::ThinkingMode;

/// The three canonical prescriptions, as a `clap` value so `-rx` validates
/// at parse time instead of falling through to a runtime "unknown
/// prescription" error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum PrescriptionArg {
    Gentle,
    Standard,
    Aggressive,
}

impl PrescriptionArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrescriptionArg::Gentle => "gentle",
            PrescriptionArg::Standard => "standard",
            PrescriptionArg::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for PrescriptionArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn parse_thinking_mode(s: &str) -> Result<ThinkingMode, String> {
    ThinkingMode::parse(s).ok_or_else(|| format!("invalid thinking mode '{s}' (expected remove|truncate|signature-only)"))
}

#[derive(Parser)]
#[command(name = "slimtrace")]
#[command(about = "Slim down a coding agent's conversation transcript before it saturates the context window", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Override the slimtrace data directory (defaults to $SLIMTRACE_PATH
    /// or the platform data directory).
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List known sessions")]
    List {
        #[arg(long)]
        project: Option<String>,
    },

    #[command(about = "Diagnose the session bound to the current working directory")]
    Current {
        #[arg(short = 'd', long = "diagnose")]
        diagnose: bool,
    },

    #[command(about = "Show a full diagnosis of one session")]
    Diagnose { session: String },

    #[command(about = "Run a named prescription over one session")]
    Treat {
        session: String,

        #[arg(short = 'r', long = "prescription", default_value = "standard", help = "gentle|standard|aggressive (spec's '-rx' shorthand: a single-char short flag can't carry two letters in clap, so this is exposed as -r/--prescription)")]
        prescription: PrescriptionArg,

        #[arg(long, help = "Write the treated transcript back; otherwise this is a dry run")]
        execute: bool,

        #[arg(long = "thinking-mode", value_parser = parse_thinking_mode)]
        thinking_mode: Option<ThinkingMode>,
    },

    #[command(about = "Run a single named strategy over one session")]
    Strategy {
        name: String,
        session: String,

        #[arg(short = 'v', long, help = "Print every action the strategy would take")]
        verbose: bool,

        #[arg(long, help = "Write the treated transcript back; otherwise this is a dry run")]
        execute: bool,

        #[arg(long = "thinking-mode", value_parser = parse_thinking_mode)]
        thinking_mode: Option<ThinkingMode>,
    },

    #[command(about = "Force an immediate prune-and-resume cycle on the current session")]
    Reload {
        #[arg(short = 'r', long = "prescription", default_value = "standard", help = "gentle|standard|aggressive (spec's '-rx' shorthand: a single-char short flag can't carry two letters in clap, so this is exposed as -r/--prescription)")]
        prescription: PrescriptionArg,
    },

    #[command(about = "Print or show the last-written team-state checkpoint")]
    Checkpoint {
        #[arg(long, help = "Print the checkpoint file's contents")]
        show: bool,
    },

    #[command(about = "Run the long-lived guard loop against one session")]
    Guard {
        session: Option<String>,

        #[arg(long, help = "Hard threshold in MiB", default_value = "50")]
        threshold: u64,

        #[arg(long = "soft-threshold", help = "Soft threshold in MiB (default: 60% of --threshold)")]
        soft_threshold: Option<u64>,

        #[arg(long = "threshold-tokens", help = "Additional hard threshold on estimated token count")]
        threshold_tokens: Option<u64>,

        #[arg(long, default_value = "30")]
        interval: u64,

        #[arg(short = 'r', long = "prescription", default_value = "standard", help = "gentle|standard|aggressive (spec's '-rx' shorthand: a single-char short flag can't carry two letters in clap, so this is exposed as -r/--prescription)")]
        prescription: PrescriptionArg,

        #[arg(long = "no-reload")]
        no_reload: bool,

        #[arg(long = "no-reactive")]
        no_reactive: bool,

        #[arg(long, help = "Best-effort: detach from the controlling terminal")]
        daemon: bool,
    },

    #[command(about = "Run structural health checks (external collaborator, intentionally thin)")]
    Doctor {
        #[arg(long, help = "Attempt to repair what can be repaired automatically")]
        fix: bool,
    },

    #[command(about = "List every registered strategy and prescription")]
    Formulary,
}
