use clap::Parser;
use miette::Result;
use rateq::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior so piping into `head` exits quietly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    // RUST_LOG wins over --verbose
    let default_level = if global.verbose { "rateq=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init(args) => rateq::cli::commands::init::run(args, &global),
        Commands::Quote(args) => rateq::cli::commands::quote::run(args, &global),
        Commands::Check(args) => rateq::cli::commands::check::run(args, &global),
        Commands::Zip(args) => rateq::cli::commands::zip::run(args, &global),
        Commands::Import(cmd) => rateq::cli::commands::import::run(cmd, &global),
        Commands::Status(args) => rateq::cli::commands::status::run(args, &global),
        Commands::Validate(args) => rateq::cli::commands::validate::run(args, &global),
        Commands::Config(cmd) => rateq::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => rateq::cli::commands::completions::run(args),
    }
}
