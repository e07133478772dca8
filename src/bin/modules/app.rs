use super::cli::Cli;
use super::error::CliError;
use super::io;
use super::report::RunTimer;
use indicatif::{ProgressBar, ProgressStyle};
use moleq::{ChargeEquilibrator, EquilibrationOptions};

pub fn run(args: Cli) -> Result<(), CliError> {
    let loaded = io::read_batch(&args.input)?;

    let source_name = if args.input == "-" {
        "stdin".to_string()
    } else {
        args.input.clone()
    };

    let options = EquilibrationOptions {
        strict_hardness: args.equilibration.strict,
        hardness_epsilon: args.equilibration.hardness_epsilon,
    };
    let equilibrator = ChargeEquilibrator::new().with_options(options);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message("Equilibrating charges...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let mut timer = RunTimer::start();
    let result = equilibrator.equilibrate(
        &loaded.batch,
        &loaded.electronegativity,
        &loaded.hardness,
    )?;
    timer.record(loaded.batch.molecule_count(), loaded.batch.atom_count());

    pb.finish_and_clear();

    let writer = io::get_writer(&args.output.output)?;
    io::write_results(
        writer,
        &loaded,
        &result,
        &args.output.format,
        args.output.precision,
        &source_name,
    )?;

    if args.output.timings {
        timer.report(&mut std::io::stderr())?;
    }

    Ok(())
}
