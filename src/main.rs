use anyhow::Result;
use typehinter::cli::{configure_thread_pool, init_logging, parse_args, run};

fn main() -> Result<()> {
    let cli = parse_args();
    init_logging(cli.verbosity);
    configure_thread_pool(cli.jobs);
    run(cli)
}
