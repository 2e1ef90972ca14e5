use crate::prelude::*;
use clap::{Parser, Subcommand};
use std::io::{stderr, stdout};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

mod api;
mod commands;
mod config;
mod environment;
mod outcome;

mod prelude {
    pub use crate::api::*;
    pub use crate::commands::*;
    pub use crate::config::*;
    pub use crate::environment::*;
    pub use crate::outcome::*;
    pub use anyhow::{anyhow, bail, Context, Result};
    pub use std::io::Write;

    #[cfg(test)]
    pub use pretty_assertions as pa;
}

/// OVH dedicated-server backup storage, reconciled
#[derive(Debug, Parser)]
struct Args {
    /// Runs application in a simulated safe-mode without applying any changes
    /// to the remote service
    #[arg(short, long)]
    dry_run: bool,

    /// Path to the configuration file with the OVH API credentials
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Ensures backup storage on a dedicated server is enabled or disabled
    EnsureStorage {
        /// Dedicated server's service name, e.g. `ns12345.ip-192-0-2.eu`
        #[arg(long)]
        service: String,

        /// Whether backup storage should be present or absent
        #[arg(long, value_enum, default_value_t)]
        state: DesiredState,

        /// How many times to poll the activation task before giving up
        #[arg(long, default_value_t = 240)]
        max_attempts: u32,

        /// How long to wait between two consecutive polls
        #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
        interval: Duration,
    },

    /// Ensures an ACL of the backup storage grants (or doesn't grant) access
    /// to an IP block
    EnsureAcl {
        /// Dedicated server's service name, e.g. `ns12345.ip-192-0-2.eu`
        #[arg(long)]
        service: String,

        /// IP block covered by the ACL, e.g. `192.0.2.0/24`; must belong to
        /// the server
        #[arg(long)]
        ip: String,

        /// Whether the ACL should be present or absent
        #[arg(long, value_enum, default_value_t)]
        state: DesiredState,

        /// Allows the CIFS (SMB) protocol for this ACL
        #[arg(long)]
        cifs: bool,

        /// Allows the FTP protocol for this ACL
        #[arg(long)]
        ftp: bool,

        /// Allows the NFS protocol for this ACL
        #[arg(long)]
        nfs: bool,
    },

    /// Validates configuration's syntax
    Validate,
}

fn main() -> Result<()> {
    use colored::Colorize;

    let args = Args::parse();

    if let Command::Validate = &args.cmd {
        return validate(&args.config);
    }

    let config = Config::load(&args.config)?;
    let mut api = OvhClient::new(&config)?;

    if args.dry_run {
        eprintln!(
            "{} --dry-run is active, no changes will be applied\n",
            "Note:".green(),
        );
    }

    // Progress goes to stderr, so that stdout carries nothing but the final
    // outcome record
    let stderr = &mut stderr();

    let mut env = Environment {
        sleep: Box::new(thread::sleep),
        stdout: stderr,
        api: &mut api,
        dry_run: args.dry_run,
    };

    let outcome = match args.cmd {
        Command::EnsureStorage {
            service,
            state,
            max_attempts,
            interval,
        } => EnsureStorage::new(&mut env, ServiceName::new(service), state)
            .with_budget(RetryBudget {
                max_attempts,
                interval,
            })
            .run()?,

        Command::EnsureAcl {
            service,
            ip,
            state,
            cifs,
            ftp,
            nfs,
        } => EnsureAcl::new(
            &mut env,
            ServiceName::new(service),
            IpBlock::new(ip),
            state,
            Permissions { cifs, ftp, nfs },
        )
        .run()?,

        Command::Validate => unreachable!(),
    };

    let mut stdout = stdout();

    serde_json::to_writer_pretty(&mut stdout, &outcome)?;
    writeln!(stdout)?;

    Ok(())
}

fn validate(path: &Path) -> Result<()> {
    use colored::Colorize;

    Config::load(path)?;

    println!("{} configuration file looks fine", "Ok:".green());

    Ok(())
}
