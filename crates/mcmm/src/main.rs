//! The `mcmm` binary.

use mcmm::Mcmm;
use mcmm::cli::{self, EXIT_ERROR};
use mcmm::tracing::{TracingConfig, TracingFormat, init_tracing};

#[allow(clippy::print_stderr)]
fn main() {
    let cli = cli::parse();

    let tracing_config = TracingConfig {
        format: if cli.json {
            TracingFormat::Json
        } else {
            TracingFormat::Compact
        },
        level: cli.level.into(),
        ..Default::default()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("{e:?}");
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start the async runtime: {e}");
            std::process::exit(EXIT_ERROR);
        }
    };

    let code = runtime.block_on(Mcmm::with_defaults().run(cli));
    std::process::exit(code);
}
