//! CLI argument parsing for ctf2prv

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "ctf2prv")]
#[command(version)]
#[command(about = "CTF kernel trace to Paraver converter", long_about = None)]
pub struct Cli {
    /// Input trace directory (searched recursively for trace metadata)
    pub trace: PathBuf,

    /// Basename of the output files (.prv/.pcf/.row)
    #[arg(short = 'o', long = "output", value_name = "NAME", default_value = "trace")]
    pub output: String,

    /// Enable verbose diagnostics on stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_trace_path() {
        let cli = Cli::parse_from(["ctf2prv", "/tmp/mytrace"]);
        assert_eq!(cli.trace, PathBuf::from("/tmp/mytrace"));
    }

    #[test]
    fn test_cli_default_output_basename() {
        let cli = Cli::parse_from(["ctf2prv", "/tmp/mytrace"]);
        assert_eq!(cli.output, "trace");
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_output_flag() {
        let cli = Cli::parse_from(["ctf2prv", "-o", "run1", "/tmp/mytrace"]);
        assert_eq!(cli.output, "run1");
    }

    #[test]
    fn test_cli_requires_trace_argument() {
        assert!(Cli::try_parse_from(["ctf2prv"]).is_err());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::parse_from(["ctf2prv", "-v", "/tmp/mytrace"]);
        assert!(cli.verbose);
    }
}
