//! CLI argument definitions using clap
//!
//! The entrypoint takes a command line, not options of its own:
//! - `docker-entrypoint mysqld [OPTIONS]`: bootstrap, then run the engine
//! - `docker-entrypoint --option ...`: same, engine command implied
//! - `docker-entrypoint <other command>`: run it untouched

use std::ffi::{OsStr, OsString};

use clap::Parser;

/// Help and version forms that bypass the bootstrap
pub const HELP_FLAGS: [&str; 5] = ["-?", "--help", "--print-defaults", "-V", "--version"];

/// Container entrypoint for the MySQL server
#[derive(Parser, Debug)]
#[command(name = "docker-entrypoint")]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Command to run, or engine options
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<OsString>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

/// Normalized command line: program plus its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
}

impl Invocation {
    /// Normalize a raw command line.
    ///
    /// An empty command line, or one starting with an option, runs the
    /// engine command with those options.
    pub fn normalize(mut command: Vec<OsString>, engine_command: &str) -> Self {
        let implied = command
            .first()
            .map_or(true, |first| first.as_encoded_bytes().starts_with(b"-"));
        if implied {
            command.insert(0, OsString::from(engine_command));
        }

        let mut parts = command.into_iter();
        let program = parts.next().unwrap_or_else(|| OsString::from(engine_command));
        Self {
            program,
            args: parts.collect(),
        }
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Whether the command is the engine itself
    pub fn is_engine_command(&self, engine_command: &str) -> bool {
        self.program.as_os_str() == OsStr::new(engine_command)
    }

    /// Whether any argument asks for help or version output
    pub fn wants_help(&self) -> bool {
        self.args
            .iter()
            .any(|arg| HELP_FLAGS.iter().any(|flag| arg.as_os_str() == OsStr::new(flag)))
    }

    pub fn into_parts(self) -> (OsString, Vec<OsString>) {
        (self.program, self.args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_option_implies_engine_command() {
        let inv = Invocation::normalize(argv(&["--character-set-server=utf8mb4"]), "mysqld");
        assert_eq!(inv.program(), "mysqld");
        assert_eq!(inv.args(), argv(&["--character-set-server=utf8mb4"]).as_slice());
        assert!(inv.is_engine_command("mysqld"));
    }

    #[test]
    fn test_empty_command_line_runs_engine() {
        let inv = Invocation::normalize(Vec::new(), "mysqld");
        assert_eq!(inv.program(), "mysqld");
        assert!(inv.args().is_empty());
    }

    #[test]
    fn test_other_command_untouched() {
        let inv = Invocation::normalize(argv(&["bash", "-c", "echo hi"]), "mysqld");
        assert_eq!(inv.program(), "bash");
        assert_eq!(inv.args().len(), 2);
        assert!(!inv.is_engine_command("mysqld"));
    }

    #[test]
    fn test_help_forms() {
        for flag in HELP_FLAGS {
            let inv = Invocation::normalize(argv(&["mysqld", "--user=mysql", flag]), "mysqld");
            assert!(inv.wants_help(), "{} should bypass bootstrap", flag);
        }
        let inv = Invocation::normalize(argv(&["mysqld", "--verbose"]), "mysqld");
        assert!(!inv.wants_help());
    }

    #[test]
    fn test_cli_accepts_hyphen_values() {
        let cli = Cli::try_parse_from(["docker-entrypoint", "--help", "--verbose"]).unwrap();
        assert_eq!(cli.command, argv(&["--help", "--verbose"]));

        let cli = Cli::try_parse_from(["docker-entrypoint", "mysqld", "--port=3307"]).unwrap();
        assert_eq!(cli.command, argv(&["mysqld", "--port=3307"]));
    }
}
