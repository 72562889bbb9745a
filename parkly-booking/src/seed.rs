use parkly_core::repository::SlotRepository;
use parkly_core::{CoreResult, NewSlot};
use parkly_store::app_config::SeedConfig;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedOutcome {
    /// Slots in the store after the call
    pub count: i64,
    /// False when the store already held slots and nothing was written
    pub created: bool,
}

/// Demo catalog: `{zone}{index:02}` numbering, one price tier per zone
pub fn demo_catalog(config: &SeedConfig) -> Vec<NewSlot> {
    config
        .zones
        .iter()
        .flat_map(|tier| {
            (1..=tier.count).map(move |index| NewSlot {
                slot_number: format!("{}{:02}", tier.zone, index),
                zone: tier.zone.clone(),
                price_per_hour: tier.price_per_hour,
            })
        })
        .collect()
}

/// Populate an empty slot store. A store that already has slots is left untouched.
pub async fn seed_slots(slots: &dyn SlotRepository, config: &SeedConfig) -> CoreResult<SeedOutcome> {
    let existing = slots.count_slots().await?;
    if existing > 0 {
        info!("Slot store already holds {} slots, skipping seed", existing);
        return Ok(SeedOutcome { count: existing, created: false });
    }

    let inserted = slots.insert_slots(&demo_catalog(config)).await?;
    info!("Seeded {} parking slots", inserted.len());

    Ok(SeedOutcome {
        count: inserted.len() as i64,
        created: true,
    })
}
