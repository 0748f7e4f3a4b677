use slimtrace_catalog::{all_strategies, PRESCRIPTIONS};

use crate::context::ExecutionContext;
use crate::output;

/// `slimtrace formulary`: list every registered strategy and the three
/// canonical prescriptions, with the registry as the single source of
/// truth (spec §9 "global registry, initialized once").
pub fn handle(_ctx: &ExecutionContext) -> anyhow::Result<()> {
    output::heading("strategies");
    for strategy in all_strategies() {
        println!(
            "  {:<24} [{:<10}] {}  ({})",
            strategy.name(),
            strategy.tier().as_str(),
            strategy.description(),
            strategy.expected_savings_label()
        );
    }

    println!();
    output::heading("prescriptions");
    for prescription in PRESCRIPTIONS {
        println!("  {:<12} {}", prescription.name, prescription.description);
        println!("               {}", prescription.strategies.join(", "));
    }

    Ok(())
}
