//! Net-energy decomposition for stacked energy charts.
//!
//! A bucket's generation and use are split so that the generated bar, the
//! usage bar (negative) and the net bar stack to show surplus or deficit.

use crate::models::{EnergyBreakdown, EnergyRecord};

// ---

/// Decompose one energy bucket into net, generated and usage components.
///
/// With `net = generation - use`:
/// - generated is `generation - net` on a surplus, otherwise `generation`
/// - usage is `-use - net` on a deficit, otherwise `-use`
pub fn decompose_net_energy(record: &EnergyRecord) -> EnergyBreakdown {
    // ---
    let net_energy = record.energy_generation - record.energy_use;

    let energy_generated = if net_energy > 0.0 {
        record.energy_generation - net_energy
    } else {
        record.energy_generation
    };

    let energy_usage = if net_energy < 0.0 {
        -record.energy_use - net_energy
    } else {
        -record.energy_use
    };

    EnergyBreakdown {
        datetime: record.datetime,
        net_energy,
        energy_generated,
        energy_usage,
    }
}

/// Decompose every record, keeping order.
pub fn decompose_series(records: &[EnergyRecord]) -> Vec<EnergyBreakdown> {
    records.iter().map(decompose_net_energy).collect()
}
