use patchwalk::commands::command_argument_builder;
use patchwalk::handlers::handle_run;
use patchwalk_core::print_banner;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let matches = cmd.get_matches();

    // Banner goes to stdout, so keep it out of JSON printed there
    let json_to_stdout = matches.get_one::<String>("format").map(String::as_str) == Some("json")
        && matches.get_one::<std::path::PathBuf>("output").is_none();
    if !matches.get_flag("quiet") && !json_to_stdout {
        print_banner();
    }

    handle_run(&matches).await;
}
