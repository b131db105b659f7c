use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "campus", version, about = "Campus auth core tooling")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Signing secret management
    Keys {
        #[command(subcommand)]
        cmd: KeysCommand,
    },

    /// Issue, verify and inspect tokens
    Token {
        #[command(subcommand)]
        cmd: TokenCommand,
    },

    /// Hash and verify passwords
    Password {
        #[command(subcommand)]
        cmd: PasswordCommand,
    },

    /// Configuration tooling
    Config {
        #[command(subcommand)]
        cmd: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Generate a new random signing secret
    Generate {
        /// Write the secret to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Issue a signed token
    Issue {
        /// Signing secret: a file path or the secret itself
        #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
        secret: Option<String>,

        /// Subject (user id)
        #[arg(long)]
        subject: String,

        /// Role claim
        #[arg(long, default_value = "member")]
        role: String,

        /// Token kind
        #[arg(long = "type", value_enum, default_value_t = Kind::Access)]
        kind: Kind,

        /// Lifetime such as "15m", "12h" or "7d" (defaults per kind)
        #[arg(long)]
        ttl: Option<String>,

        /// Configuration file supplying token lifetimes (and the secret when
        /// --secret is absent)
        #[arg(long, short, env = "CAMPUS_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Verify signature and expiry
    Verify {
        /// Token string or a file containing it
        token: String,

        /// Signing secret: a file path or the secret itself
        #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
        secret: Option<String>,

        /// Also require this token kind
        #[arg(long, value_enum)]
        expect: Option<Kind>,

        /// Configuration file supplying token lifetimes (and the secret when
        /// --secret is absent)
        #[arg(long, short, env = "CAMPUS_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Print the payload without verifying anything
    Inspect {
        /// Token string or a file containing it
        token: String,
    },
}

#[derive(Subcommand, Debug)]
enum PasswordCommand {
    /// Print the stored form of a password
    Hash {
        password: String,

        /// PBKDF2 iteration count
        #[arg(long)]
        iterations: Option<u32>,
    },

    /// Check a password against a stored hash
    Verify { password: String, hash: String },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a configuration file
    Check {
        /// Path to the YAML configuration (defaults only when omitted)
        #[arg(long, short, env = "CAMPUS_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Access,
    Refresh,
}

impl From<Kind> for campus_token::TokenType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Access => campus_token::TokenType::Access,
            Kind::Refresh => campus_token::TokenType::Refresh,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Keys { cmd } => match cmd {
            KeysCommand::Generate { output } => commands::keys::generate(output)?,
        },

        Command::Token { cmd } => match cmd {
            TokenCommand::Issue {
                secret,
                subject,
                role,
                kind,
                ttl,
                config,
            } => commands::token::issue(
                secret,
                config.as_deref(),
                subject,
                role,
                kind.into(),
                ttl,
            )?,
            TokenCommand::Verify {
                token,
                secret,
                expect,
                config,
            } => commands::token::verify(
                secret,
                config.as_deref(),
                token,
                expect.map(Into::into),
            )?,
            TokenCommand::Inspect { token } => commands::token::inspect(token)?,
        },

        Command::Password { cmd } => match cmd {
            PasswordCommand::Hash {
                password,
                iterations,
            } => commands::password::hash(password, iterations)?,
            PasswordCommand::Verify { password, hash } => {
                commands::password::verify(password, hash)?
            }
        },

        Command::Config { cmd } => match cmd {
            ConfigCommand::Check { config } => commands::check::run(config.as_deref())?,
        },
    }

    Ok(())
}
