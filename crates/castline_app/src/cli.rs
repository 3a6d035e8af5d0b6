// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command line options.

use clap::Parser;
use std::path::PathBuf;

/// Headless broadcast timeline editor
///
/// Opens a timeline document, replays an event script against it and writes
/// the edited document or the final read model.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "castline")]
#[command(author, version, about, long_about = None)]
pub struct Options {
    /// Document to open (JSON)
    #[arg(required_unless_present = "write_config")]
    pub document: Option<PathBuf>,

    /// Editor settings (RON, defaults when omitted)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Event script to replay against the document (JSON)
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Write the edited document here instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Print the final read model instead of the document
    #[arg(long = "model")]
    pub print_model: bool,

    /// Write the settings in effect as RON and exit
    #[arg(long)]
    pub write_config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Options, clap::Error> {
        Options::try_parse_from(std::iter::once("castline").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_full_command_line() {
        let options = parse(&[
            "show.json",
            "--config",
            "editor.ron",
            "--events",
            "session.json",
            "-o",
            "out.json",
            "--model",
        ])
        .unwrap();
        assert_eq!(options.document, Some(PathBuf::from("show.json")));
        assert_eq!(options.config, Some(PathBuf::from("editor.ron")));
        assert_eq!(options.events, Some(PathBuf::from("session.json")));
        assert_eq!(options.output, Some(PathBuf::from("out.json")));
        assert!(options.print_model);
        assert_eq!(options.write_config, None);
    }

    #[test]
    fn test_help() {
        assert_eq!(parse(&["--help"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse(&[]).unwrap_err().kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(parse(&["a.json", "--bogus"]).unwrap_err().kind(), ErrorKind::UnknownArgument);
        assert!(parse(&["a.json", "--events"]).is_err());
        assert!(parse(&["a.json", "b.json"]).is_err());
    }

    #[test]
    fn test_write_config_without_document() {
        let options = parse(&["--write-config", "editor.ron"]).unwrap();
        assert_eq!(options.document, None);
        assert_eq!(options.write_config, Some(PathBuf::from("editor.ron")));
    }

    #[test]
    fn test_command_definition() {
        use clap::CommandFactory;
        Options::command().debug_assert();
    }
}
