use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "nokast", version)]
#[command(about = "Command-line client for the Nokast newsletter digest backend")]
pub struct Cli {
    /// Nokast backend URL
    #[arg(short, long, global = true, value_name = "URL")]
    pub server: Option<String>,

    /// Configuration file path
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show pipeline and model runtime status
    Status,

    /// Start a summary generation for the saved newsletters
    Run {
        /// Emails fetched per newsletter
        #[arg(long, value_name = "N")]
        fetch_limit: Option<u32>,

        /// Wait until the pipeline has finished
        #[arg(long)]
        wait: bool,
    },

    /// List generated stories
    Stories {
        /// Show at most N stories
        #[arg(short = 'n', long, value_name = "N")]
        limit: Option<usize>,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the newsletters the pipeline reads
    #[command(subcommand)]
    Newsletters(NewslettersCommand),

    /// Manage priority keywords
    #[command(subcommand)]
    Keywords(KeywordsCommand),

    /// Manage local models
    #[command(subcommand)]
    Models(ModelsCommand),

    /// Read or change pipeline configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Manage Gmail credentials and the environment file
    #[command(subcommand)]
    Credentials(CredentialsCommand),

    /// WhatsApp delivery pairing
    #[command(subcommand, name = "whatsapp")]
    WhatsApp(WhatsAppCommand),

    /// Ask the AI helper one question about the current digest
    Ask {
        #[arg(required = true, num_args = 1.., value_name = "PROMPT")]
        prompt: Vec<String>,
    },

    /// Chat with the AI helper about the current digest
    Chat,

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum NewslettersCommand {
    /// List saved newsletters
    List,
    /// Add a newsletter
    Add {
        sender: String,
        email: String,
        /// Priority from 1 (lowest) to 10
        #[arg(short, long, default_value_t = 5)]
        priority: i64,
    },
    /// Remove a newsletter by email
    Remove { email: String },
    /// Change a newsletter's priority
    Priority { email: String, priority: i64 },
}

#[derive(Subcommand, Debug)]
pub enum KeywordsCommand {
    /// List priority keywords
    List,
    /// Add one or more keywords
    Add {
        #[arg(required = true, num_args = 1..)]
        keywords: Vec<String>,
    },
    /// Remove one or more keywords
    Remove {
        #[arg(required = true, num_args = 1..)]
        keywords: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// List recommended and downloaded models
    List,
    /// Download a model
    Pull { name: String },
    /// Delete a downloaded model
    Remove { name: String },
    /// Load a model into the runtime
    Activate { name: String },
    /// Stop a running model
    Deactivate { name: String },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print configuration values (all when no key is given)
    Get { keys: Vec<String> },
    /// Set values given as KEY=VALUE
    Set {
        #[arg(required = true, num_args = 1.., value_name = "KEY=VALUE")]
        assignments: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CredentialsCommand {
    /// Show which secret files the backend has
    Status,
    /// Upload the Google OAuth client credentials file
    UploadCredentials { path: PathBuf },
    /// Upload a Google OAuth token file
    UploadToken { path: PathBuf },
    /// Upload the backend environment file
    UploadEnv { path: PathBuf },
    /// Delete the stored Gmail credentials and token
    Delete {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum WhatsAppCommand {
    /// Show pairing status
    Status {
        /// Write the pairing QR code PNG to FILE
        #[arg(long, value_name = "FILE")]
        qr_out: Option<PathBuf>,
    },
    /// Start pairing
    Connect,
}
