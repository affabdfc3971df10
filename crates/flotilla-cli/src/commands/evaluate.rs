use std::path::Path;

use flotilla_core::Catalog;
use flotilla_strategy::{Executor, SystemClock, TracingRecorder};

use crate::OutputFormat;

pub fn evaluate(snapshot: &Path, app: &str, format: OutputFormat) -> anyhow::Result<()> {
    let catalog = Catalog::from_file(snapshot)?;
    let (contender, incumbent) = catalog.rollout_pair(app)?;
    let patches = Executor::new(&contender, incumbent.as_ref(), &TracingRecorder, &SystemClock)
        .execute()?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&patches)?);
        }
        OutputFormat::Text => {
            for patch in &patches {
                println!("{patch}");
            }
        }
    }

    Ok(())
}
