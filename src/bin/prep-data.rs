use anyhow::{Context, Result};
use molecule_dataset::*;

fn main() -> Result<()> {
    let arguments: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    check_arguments(&arguments)?;

    init_logging("info");
    let config = PrepConfig::locate().context("Failed to load configuration")?;
    let mut source =
        build_source(&config.source).context("Failed to set up the candidate source")?;
    let mut builder = build_builder(&config).context("Failed to set up the molecule builder")?;
    let mut persister = CsvPersister::new(&config.output_dir);

    run(&config, &mut *source, &mut builder, &mut persister)
        .context("Dataset preparation failed")?;
    Ok(())
}
