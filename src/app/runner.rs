use crate::app::report::{report_burnout, report_sweep_summary};
use crate::config::{BurnoutArgs, Config};
use crate::io::{
    load_results, write_burnout_report, BurnoutReport, RunDirectory, SweepRecord, Timer,
};
use crate::ising::{Sweep, SweepOutcome, TracingObserver};
use color_eyre::eyre::{Result, WrapErr};
use tracing::{info, info_span};

/// Everything produced by one `simulate` invocation
pub struct SimulationRun {
    pub outcome: SweepOutcome,
    pub record: SweepRecord,
    pub directory: RunDirectory,
}

pub fn run_simulation(config: &Config) -> Result<SimulationRun> {
    let params = config
        .to_sweep_params()
        .wrap_err("Invalid sweep configuration")?;

    info!(
        "Lattice {}x{}, {} steps per chain, recording from step {}",
        params.lattice_size, params.lattice_size, params.total_steps, params.record_from
    );

    let sweep = Sweep::new(params.clone())?;
    let span = info_span!("sweep", size = params.lattice_size);
    let timer = Timer::start("Sweep");
    let outcome = span.in_scope(|| sweep.run(&TracingObserver))?;
    timer.stop();

    report_sweep_summary(&outcome);

    let label = config.run_label(outcome.master_seed);
    let directory = RunDirectory::create(&config.output_directory(), &label)?;
    let mut resolved = config.clone();
    resolved.simulation.seed = Some(outcome.master_seed);
    directory.write_config(&resolved)?;

    let record = SweepRecord::from_outcome(&outcome, &params);
    directory.write_results(&record)?;

    Ok(SimulationRun {
        outcome,
        record,
        directory,
    })
}

pub fn run_burnout(config: &Config, args: &BurnoutArgs) -> Result<BurnoutReport> {
    let record = load_results(&args.results)?;
    let series = record.series(args.temperature_index, args.field_index)?;
    let cell = record.cell(args.temperature_index, args.field_index)?;

    let params = config.burnout_params();
    let result = params
        .detect(series)
        .wrap_err("Invalid burnout parameters")?;

    let report = BurnoutReport {
        temperature_index: args.temperature_index,
        field_index: args.field_index,
        temperature: cell.temperature,
        field: cell.field,
        series_len: series.len(),
        params,
        result,
    };
    report_burnout(&report);
    write_burnout_report(&args.results, &report)?;
    Ok(report)
}
