//! Shell completion scripts

use anyhow::{Context, Result};
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::args::Args as CliArgs;

/// Completions command arguments
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Render the completion script for `shell` into `out`
pub fn render(shell: Shell, out: &mut dyn Write) {
    let mut cmd = CliArgs::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, out);
}

/// Execute completions command
pub fn execute(args: CompletionsArgs) -> Result<()> {
    match args.output {
        Some(path) => {
            let mut file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            render(args.shell, &mut file);
            eprintln!("Wrote {} completions to {}", args.shell, path.display());
        }
        None => render(args.shell, &mut io::stdout()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripts_name_the_binary() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell] {
            let mut script = Vec::new();
            render(shell, &mut script);
            let script = String::from_utf8(script).unwrap();
            assert!(script.contains("nfapi"), "{shell} script lacks binary name");
        }
    }

    #[test]
    fn test_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nfapi.bash");

        execute(CompletionsArgs {
            shell: Shell::Bash,
            output: Some(path.clone()),
        })
        .unwrap();

        assert!(std::fs::read_to_string(&path).unwrap().contains("driver"));
    }
}
