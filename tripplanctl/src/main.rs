use clap::Parser;

fn main() {
    let cli = tripplanctl::Cli::parse();
    tripplanctl::init_tracing();
    if let Err(err) = tripplanctl::run(cli) {
        eprintln!("error: {err}");
        std::process::exit(err.exit_code());
    }
}
