use crate::CLAP_STYLING;
use clap::arg;
use patchwalk_core::config::{DEFAULT_CACHE_DIR, parse_after_date};
use patchwalk_scanner::revisions::DEFAULT_REPOSITORY;
use url::Url;

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("patchwalk")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("patchwalk")
        .about(
            "Walk a bug's resolved dependencies and total the lines changed by every \
            landed revision.",
        )
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(arg!(-v --"verbose" "Log every fetch and cache decision").required(false))
        .arg(
            arg!(--"bug" <URL>)
                .required(true)
                .help(
                    "The root bug (for example: \
                    https://bugzilla.mozilla.org/show_bug.cgi?id=1566221)",
                )
                .value_parser(clap::value_parser!(Url)),
        )
        .arg(
            arg!(--"after" <DATE>)
                .required(false)
                .help("Only count bugs whose last fix comment is on or after this YYYY-MM-DD date")
                .value_parser(parse_after_date),
        )
        .arg(
            arg!(--"headless")
                .required(false)
                .help("No interactive progress output")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(--"disable-cache")
                .required(false)
                .help("Download every patch again even if it is cached")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(--"max-depth" <DEPTH>)
                .required(false)
                .help("How many dependency levels below the root to walk")
                .value_parser(clap::value_parser!(usize))
                .default_value("1"),
        )
        .arg(
            arg!(--"cache-dir" <PATH>)
                .required(false)
                .help("Where downloaded patches are kept")
                .default_value(DEFAULT_CACHE_DIR),
        )
        .arg(
            arg!(--"repo" <URL>)
                .required(false)
                .help("Revision server repository whose /rev/ links count as fixes")
                .value_parser(clap::value_parser!(Url))
                .default_value(DEFAULT_REPOSITORY),
        )
        .arg(
            arg!(--"diffstat" <PROGRAM>)
                .required(false)
                .help("diffstat binary used to measure patches")
                .default_value("diffstat"),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Request timeout in seconds")
                .value_parser(clap::value_parser!(u64))
                .default_value("30"),
        )
        .arg(
            arg!(--"retries" <NUM>)
                .required(false)
                .help("Retries for timeouts, connection failures and 5xx responses")
                .value_parser(clap::value_parser!(u32))
                .default_value("2"),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Report format: text, json")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            arg!(-o --"output" <PATH>)
                .required(false)
                .help("Save report to file (default: display to screen)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
}
