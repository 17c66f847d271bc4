use clap::Parser;
use focus::cli::commands::Cli;
use focus::cli::handlers;
use focus::io::paths;

fn main() {
    let cli = Cli::parse();

    if cli.command.is_none() {
        // No subcommand → launch TUI
        let data_dir = paths::resolve_data_dir(cli.data_dir.as_deref());
        if let Err(e) = focus::tui::run(Some(&data_dir)) {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
