/*!
 * Kernel - Main Entry Point
 *
 * Boots the process layer on an in-memory filesystem with the built-in
 * programs and runs one command line as the first user process.
 */

use clap::{Parser, Subcommand};
use miette::IntoDiagnostic;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use userprog_kernel::{
    builtin_programs, init_tracing, Kernel, KernelConfig, KernelError, MemFs, StdConsole,
};

#[derive(Parser)]
#[command(name = "kernel", version, about = "Run user programs on a hosted teaching kernel")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a command line as the first user process and exit with its status
    Run {
        /// Program name followed by its arguments, e.g. "cat notes"
        command_line: String,

        /// Copy a host file into the filesystem before booting
        #[arg(long = "put", value_name = "NAME=PATH", value_parser = parse_put)]
        put: Vec<(String, PathBuf)>,

        /// Do not print `name: exit(code)` lines
        #[arg(long)]
        quiet: bool,

        /// JSON configuration file (overrides KERNEL_CONFIG)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Print syscall counters to stderr on shutdown
        #[arg(long)]
        metrics: bool,
    },

    /// List the built-in programs
    Programs,
}

fn parse_put(arg: &str) -> Result<(String, PathBuf), String> {
    match arg.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected NAME=PATH, got '{arg}'")),
    }
}

fn main() -> miette::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Programs => {
            for name in builtin_programs().names() {
                println!("{name}");
            }
            Ok(())
        }
        Command::Run {
            command_line,
            put,
            quiet,
            config,
            metrics,
        } => {
            let mut config = match config {
                Some(path) => KernelConfig::from_file(&path)?,
                None => KernelConfig::load()?,
            };
            if quiet {
                config = config.with_announce_exits(false);
            }

            let fs = MemFs::with_capacity(config.max_fs_bytes);
            for (name, path) in &put {
                let contents = std::fs::read(path).map_err(KernelError::from)?;
                fs.put(name, &contents).map_err(KernelError::from)?;
                info!(name = %name, bytes = contents.len(), "File loaded");
            }

            let kernel = Kernel::builder()
                .with_config(config)
                .with_filesystem(Arc::new(fs))
                .with_console(Arc::new(StdConsole))
                .with_loader(Arc::new(builtin_programs()))
                .build();

            let code = kernel.run_task(&command_line).map_err(KernelError::from)?;

            if metrics {
                let snapshot = serde_json::to_string_pretty(&kernel.metrics().snapshot())
                    .into_diagnostic()?;
                eprintln!("{snapshot}");
            }

            if kernel.is_powered_off() {
                info!("Machine halted");
                return Ok(());
            }
            std::process::exit(code);
        }
    }
}
