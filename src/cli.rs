use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "crmpilot", about = "End-to-end test suite for the RapidoCRM web app")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run scenarios against the live CRM and write the HTML report
    Run {
        /// Only run scenarios from this module
        /// (login, register_user, register_company, reset_password)
        #[arg(short, long)]
        module: Option<String>,

        /// Only run scenarios whose name contains this substring
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// List available scenarios
    List,
    /// Poll the reset mailbox once and print the extracted reset link
    CheckMail {
        /// Recipient to match (defaults to the configured mailbox address)
        #[arg(short, long)]
        recipient: Option<String>,

        /// Subject keyword to match (defaults to the configured keyword)
        #[arg(short, long)]
        subject_keyword: Option<String>,
    },
}
