//! Command-line argument definitions for `gogrep`.

use clap::Parser;

use crate::output::Color;
use crate::telemetry::LogFormat;

/// Template used when `--format` is not given.
pub(crate) const DEFAULT_FORMAT: &str = "{{.Filename}}:{{.Line}}: {{.MatchLine}}";

const AFTER_HELP: &str = "\
Examples:
  # Find f calls with a single argument.
  gogrep file.go 'f($_)'
  # Find any fmt.Println calls (any number of args).
  gogrep file.go 'fmt.Println($*_)'
  # Run gogrep on 2 folders (recursively).
  gogrep dir1,dir2 '\"some string\"'
  # Run gogrep in src folder, ignoring all auto-generated files.
  gogrep src 'os.Exit($_)' '!file.IsAutogen()'
  # Ignore third_party folder while searching.
  gogrep --exclude '/third_party/' project/ 'pattern'

Exit status:
  0 if something is matched
  1 if nothing is matched
  2 if an error occurred";

/// Structural search for Go source.
#[derive(Parser, Debug)]
#[command(name = "gogrep", version, after_help = AFTER_HELP)]
pub(crate) struct Cli {
    /// Comma-separated list of files or directories to search in.
    #[arg(value_name = "TARGETS")]
    pub(crate) targets: String,
    /// The Go pattern to match, with `$name` and `$*name` wildcards.
    #[arg(value_name = "PATTERN")]
    pub(crate) pattern: String,
    /// A filter expression that can reject matches.
    #[arg(value_name = "FILTER")]
    pub(crate) filter: Option<String>,

    /// Turns on debug logging.
    #[arg(short = 'v')]
    pub(crate) verbose: bool,
    /// Stops after this many match results, 0 for unlimited.
    #[arg(long, default_value_t = 1000)]
    pub(crate) limit: u64,
    /// Number of concurrent workers; defaults to the number of cores.
    #[arg(long)]
    pub(crate) workers: Option<usize>,
    /// Disables syntax normalisations, so 10 and 0xA are not identical.
    #[arg(long)]
    pub(crate) strict_syntax: bool,
    /// Excludes files and directories whose absolute path matches.
    #[arg(long, value_name = "REGEX")]
    pub(crate) exclude: Option<String>,
    /// Output template, with `{{.Filename}}`, `{{.Line}}`, `{{.Match}}`,
    /// `{{.MatchLine}}` and capture placeholders such as `{{.x}}`.
    #[arg(long, default_value = DEFAULT_FORMAT)]
    pub(crate) format: String,
    /// Prints only the number of matches.
    #[arg(short = 'c')]
    pub(crate) count: bool,
    /// Prints absolute filenames.
    #[arg(long)]
    pub(crate) abs: bool,
    /// Prints matches without escaping newlines to `\n`.
    #[arg(short = 'm')]
    pub(crate) multiline: bool,

    /// Disables coloured output.
    #[arg(long)]
    pub(crate) no_color: bool,
    /// Colour of `{{.Filename}}`.
    #[arg(long, env = "GOGREP_COLOR_FILENAME", default_value_t = Color::DarkMagenta)]
    pub(crate) color_filename: Color,
    /// Colour of `{{.Line}}`.
    #[arg(long, env = "GOGREP_COLOR_LINE", default_value_t = Color::DarkGreen)]
    pub(crate) color_line: Color,
    /// Colour of `{{.Match}}`.
    #[arg(long, env = "GOGREP_COLOR_MATCH", default_value_t = Color::DarkRed)]
    pub(crate) color_match: Color,

    /// Log output format.
    #[arg(long, default_value_t = LogFormat::Compact)]
    pub(crate) log_format: LogFormat,
    /// Log filter directives; `-v` raises the default to `debug`.
    #[arg(long, env = "GOGREP_LOG")]
    pub(crate) log_filter: Option<String>,
}

impl Cli {
    /// The effective log filter.
    pub(crate) fn log_filter(&self) -> &str {
        match (&self.log_filter, self.verbose) {
            (Some(filter), _) => filter,
            (None, true) => "debug",
            (None, false) => "info",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("gogrep").chain(args.iter().copied()))
            .unwrap_or_else(|err| panic!("parse {args:?}: {err}"))
    }

    #[test]
    fn positional_arguments_are_read_in_order() {
        let cli = parse(&["src,lib", "f($_)", "$x.IsPure()"]);
        assert_eq!(cli.targets, "src,lib");
        assert_eq!(cli.pattern, "f($_)");
        assert_eq!(cli.filter.as_deref(), Some("$x.IsPure()"));
        assert_eq!(cli.format, DEFAULT_FORMAT);
        assert_eq!(cli.limit, 1000);
    }

    #[rstest]
    #[case(&["a", "b"], "info")]
    #[case(&["-v", "a", "b"], "debug")]
    #[case(&["-v", "--log-filter", "warn", "a", "b"], "warn")]
    fn verbosity_selects_the_log_filter(#[case] args: &[&str], #[case] expected: &str) {
        assert_eq!(parse(args).log_filter(), expected);
    }

    #[test]
    fn colours_parse_by_name() {
        let cli = parse(&["--color-match", "blue", "--log-format", "json", "a", "b"]);
        assert_eq!(cli.color_match, Color::Blue);
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn unknown_colours_are_usage_errors() {
        assert!(Cli::try_parse_from(["gogrep", "--color-line", "pink", "a", "b"]).is_err());
    }

    #[test]
    fn pattern_is_required() {
        assert!(Cli::try_parse_from(["gogrep", "a"]).is_err());
    }
}
