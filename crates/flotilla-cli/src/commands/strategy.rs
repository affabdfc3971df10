use std::path::Path;

use flotilla_core::Catalog;
use flotilla_strategy::resolve_step;

pub fn show(snapshot: &Path, app: &str) -> anyhow::Result<()> {
    let catalog = Catalog::from_file(snapshot)?;
    let contender = catalog.contender(app)?;
    let key = contender.key().to_string();
    let strategy = &contender.environment.strategy;

    println!("{key} (target step {})", contender.spec.target_step);
    for index in 0..strategy.steps.len() {
        let step = resolve_step(strategy, index as i32, &key)?;
        let marker = if index as i32 == contender.spec.target_step { "*" } else { " " };
        println!(
            "{marker} [{}] {:<12} capacity {:>3}/{:<3} traffic {:>3}/{:<3}",
            step.index,
            step.name,
            step.capacity.contender,
            step.capacity.incumbent,
            step.traffic.contender,
            step.traffic.incumbent,
        );
    }
    println!("  (values are contender/incumbent)");
    Ok(())
}
