use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "scopemap")]
#[command(about = "Per-scope complexity and line metrics for Python source trees", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory to scan recursively
    pub path: PathBuf,

    /// Relative subpaths to exclude from the walk
    #[arg(long = "skip", value_delimiter = ',')]
    pub skip: Vec<PathBuf>,

    /// Additional prefixes stripped when deriving module names
    #[arg(long = "search-path", value_delimiter = ',')]
    pub search_paths: Vec<PathBuf>,

    /// Configuration file (defaults to scopemap.toml in the scanned root)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Worker threads for file analysis (0 = all cores)
    #[arg(long, default_value = "0")]
    pub jobs: usize,

    /// Process files sequentially
    #[arg(long = "no-parallel")]
    pub no_parallel: bool,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_invocation_parses() {
        let cli = Cli::parse_from(["scopemap", "."]);
        assert_eq!(cli.path, PathBuf::from("."));
        assert!(cli.skip.is_empty());
        assert_eq!(cli.jobs, 0);
        assert!(!cli.no_parallel);
    }

    #[test]
    fn skip_lists_accept_comma_delimited_values() {
        let cli = Cli::parse_from(["scopemap", "src", "--skip", "vendor,build"]);
        assert_eq!(
            cli.skip,
            vec![PathBuf::from("vendor"), PathBuf::from("build")]
        );
    }

    #[test]
    fn search_paths_and_jobs_parse() {
        let cli = Cli::parse_from([
            "scopemap",
            "src",
            "--search-path",
            "/srv/lib",
            "--jobs",
            "4",
            "--no-parallel",
        ]);
        assert_eq!(cli.search_paths, vec![PathBuf::from("/srv/lib")]);
        assert_eq!(cli.jobs, 4);
        assert!(cli.no_parallel);
    }

    #[test]
    fn verbosity_counts_repeats() {
        let cli = Cli::parse_from(["scopemap", ".", "-vv"]);
        assert_eq!(cli.verbosity, 2);
    }
}
