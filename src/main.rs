use anyhow::{Context, Result};
use occupant_schedules::{config, schedule::ScheduleColumn, simulation, tables, telemetry};
use config::Config;
use simulation::ScheduleGenerator;
use strum::IntoEnumIterator;
use tables::TableLoader;
use telemetry::init_tracing;
use tracing::info;

fn main() -> Result<()> {
    init_tracing();

    let cfg = Config::load()?;
    let settings = cfg.generator_settings()?;

    let tables = TableLoader::new(&cfg.paths.tables_dir)
        .load()
        .with_context(|| format!("loading tables from {}", cfg.paths.tables_dir.display()))?;

    let schedules = ScheduleGenerator::new(&tables, settings)?.generate()?;
    schedules.validate()?;
    schedules.write_csv_file(&cfg.paths.output_csv)?;

    for column in ScheduleColumn::iter() {
        info!(%column, full_load_hours = schedules.full_load_hours(column)?, "summary");
    }
    info!(path = %cfg.paths.output_csv.display(), "done");
    Ok(())
}
