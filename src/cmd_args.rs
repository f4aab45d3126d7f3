use std::ffi::OsString;

pub use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct ClapArgs {
    /// HTTP method: GET, POST or DELETE (case-insensitive)
    #[clap(required_unless_present = "configure")]
    method: Option<String>,

    /// Path relative to the configured server root
    #[clap(required_unless_present = "configure")]
    path: Option<String>,

    /// Request items: name=value, name:=json or Header:value
    #[clap(value_name = "ITEM")]
    items: Vec<String>,

    /// Configuration file path
    /// Optional. Overrides MACLINE_CONFIG and the default location.
    #[clap(short = 'c', long = "config", help = "configuration file path")]
    config: Option<String>,

    /// Prompt for server root and credentials and save them
    #[clap(long, conflicts_with_all = ["method", "path", "items"])]
    configure: bool,

    /// Verbose mode
    /// Optional. Print debug logs and the outgoing request.
    #[clap(
        short = 'v',
        long,
        help = "Print verbose message",
        default_value = "false"
    )]
    verbose: bool,

    /// Print the response status line and headers
    #[clap(short = 'H', long = "headers")]
    show_headers: bool,

    /// Build and print the request without sending it
    #[clap(short = 'n', long)]
    dry_run: bool,

    /// Do not print the response body
    #[clap(short = 'q', long)]
    quiet: bool,
}

#[derive(Debug, Clone)]
pub struct CommandLineArgs {
    method: Option<String>,
    path: Option<String>,
    items: Vec<String>,
    config: Option<String>,
    configure: bool,
    verbose: bool,
    show_headers: bool,
    dry_run: bool,
    quiet: bool,
}

impl From<ClapArgs> for CommandLineArgs {
    fn from(args: ClapArgs) -> Self {
        Self {
            method: args.method,
            path: args.path,
            items: args.items,
            config: args.config,
            configure: args.configure,
            verbose: args.verbose,
            show_headers: args.show_headers,
            dry_run: args.dry_run,
            quiet: args.quiet,
        }
    }
}

impl CommandLineArgs {
    pub fn parse() -> Self {
        ClapArgs::parse().into()
    }

    pub fn parse_from<I, T>(itr: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        ClapArgs::parse_from(itr).into()
    }

    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        ClapArgs::try_parse_from(itr).map(Into::into)
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn config(&self) -> Option<&str> {
        self.config.as_deref()
    }

    pub fn configure(&self) -> bool {
        self.configure
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn show_headers(&self) -> bool {
        self.show_headers
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_args_method_path_items() {
        let args = CommandLineArgs::parse_from([
            "macline",
            "post",
            "/posts",
            "name=widget",
            "meta.count:=5",
            "X-Trace:abc123",
        ]);
        assert_eq!(args.method(), Some("post"));
        assert_eq!(args.path(), Some("/posts"));
        assert_eq!(args.items(), ["name=widget", "meta.count:=5", "X-Trace:abc123"]);
        assert!(!args.configure());
        assert!(!args.verbose());
    }

    #[test]
    fn test_parse_args_flags() {
        let args =
            CommandLineArgs::parse_from(["macline", "-v", "-H", "-n", "-q", "GET", "/posts"]);
        assert!(args.verbose());
        assert!(args.show_headers());
        assert!(args.dry_run());
        assert!(args.quiet());
        assert!(args.items().is_empty());
    }

    #[test]
    fn test_parse_args_config_path() {
        let args = CommandLineArgs::parse_from(["macline", "--config", "/tmp/m.json", "GET", "/"]);
        assert_eq!(args.config(), Some("/tmp/m.json"));
    }

    #[test]
    fn test_parse_args_configure_alone() {
        let args = CommandLineArgs::parse_from(["macline", "--configure"]);
        assert!(args.configure());
        assert_eq!(args.method(), None);
    }

    #[test]
    fn test_method_and_path_required_without_configure() {
        assert!(CommandLineArgs::try_parse_from(["macline"]).is_err());
        assert!(CommandLineArgs::try_parse_from(["macline", "GET"]).is_err());
    }

    #[test]
    fn test_configure_conflicts_with_request() {
        assert!(CommandLineArgs::try_parse_from(["macline", "--configure", "GET", "/"]).is_err());
    }
}
