use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    /// Set proxy
    #[arg(required = false, long, short = 'P', global = true)]
    pub proxy: Option<String>,

    /// Set request headers
    #[arg(required = false, long, short = 'H', global = true)]
    pub header: Option<Vec<String>>,

    /// Set user agent
    #[arg(required = false, long, short = 'A', global = true)]
    pub user_agent: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download collection metadata and artifacts
    #[clap(name = "grab", visible_alias = "g")]
    Grab {
        /// Collections as `namespace.name` or `namespace.name:CONSTRAINT`
        #[arg(required = false)]
        collections: Vec<String>,

        /// Read collections from a TOML or JSON file
        #[arg(required = false, short, long, value_hint = ValueHint::FilePath)]
        file: Option<String>,

        /// Root directory to mirror into
        #[arg(required = false, short, long, value_hint = ValueHint::DirPath)]
        destination: Option<String>,

        /// Keep artifacts that were already downloaded
        #[arg(required = false, long)]
        skip_existing: bool,

        /// Log registry response diagnostics
        #[arg(required = false, long)]
        trace: bool,
    },

    /// Print the effective configuration to stdout
    Config,

    /// Generate default config
    #[clap(name = "defconfig")]
    DefConfig,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_grab() {
        let args = Args::parse_from([
            "galaxy-grabber",
            "-vv",
            "grab",
            "community.general:>=2.0.0",
            "ansible.posix",
            "-d",
            "/srv/galaxy",
            "--skip-existing",
            "-H",
            "X-Token: abc",
        ]);

        assert_eq!(args.verbose, 2);
        assert_eq!(args.header, Some(vec!["X-Token: abc".to_string()]));
        match args.command {
            Commands::Grab {
                collections,
                destination,
                skip_existing,
                trace,
                file,
            } => {
                assert_eq!(collections, ["community.general:>=2.0.0", "ansible.posix"]);
                assert_eq!(destination.as_deref(), Some("/srv/galaxy"));
                assert!(skip_existing);
                assert!(!trace);
                assert!(file.is_none());
            }
            _ => panic!("expected grab"),
        }
    }
}
