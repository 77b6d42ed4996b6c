use clap::Parser;
use std::panic::{self, PanicHookInfo};
use tiltbridge_jr::app::{self, HciSource, Options};
use tiltbridge_jr::target::HttpTransport;
use tiltbridge_jr::target::fermentrack::FermentrackTarget;

/// Exit codes for the application
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_PANIC: i32 = 2;

/// Initialize the logger: warnings only by default, per-reading info lines
/// with `--verbose`. `RUST_LOG` still overrides either.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Set up panic hook to ensure clean exit codes for process managers
    // (e.g., systemd, docker restart policies) that monitor exit status
    panic::set_hook(Box::new(move |info: &PanicHookInfo| {
        eprintln!("Panic! {}", info);
        std::process::exit(EXIT_PANIC);
    }));

    let options = Options::parse();
    init_logging(options.verbose);

    let transport = match HttpTransport::new() {
        Ok(transport) => transport,
        Err(why) => {
            eprintln!("error: {}", why);
            std::process::exit(EXIT_ERROR);
        }
    };

    let mut target = FermentrackTarget::new(
        options.enable_fermentrack,
        options.fermentrack_url.clone(),
        options.send_interval,
        Box::new(transport),
    );

    match app::run(&options, &HciSource, &mut target).await {
        Ok(_) => std::process::exit(EXIT_SUCCESS),
        Err(why) => {
            eprintln!("error: {}", why);
            std::process::exit(EXIT_ERROR);
        }
    }
}
