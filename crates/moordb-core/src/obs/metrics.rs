use crate::obs::sink::TrackEvent;
use serde::Serialize;
use std::collections::BTreeMap;

///
/// Metrics
/// Ephemeral, in-memory counters for one unit of work.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub entities: BTreeMap<String, EntityCounters>,
}

fn bump(counter: &mut u64) {
    *counter = counter.saturating_add(1);
}

impl EventState {
    pub(crate) fn apply(&mut self, event: TrackEvent) {
        match event {
            TrackEvent::Attached { entity_path } => {
                bump(&mut self.ops.entries_attached);
                bump(&mut self.entity(entity_path).attached);
            }
            TrackEvent::Detached { entity_path } => {
                bump(&mut self.ops.entries_detached);
                bump(&mut self.entity(entity_path).detached);
            }
            TrackEvent::DetectSweep { entries } => {
                bump(&mut self.ops.detect_sweeps);
                self.ops.entries_swept = self.ops.entries_swept.saturating_add(entries);
            }
            TrackEvent::PropertyFlagged { entity_path } => {
                bump(&mut self.ops.properties_flagged);
                bump(&mut self.entity(entity_path).properties_flagged);
            }
            TrackEvent::KeyRemapped { entity_path } => {
                bump(&mut self.ops.key_remaps);
                bump(&mut self.entity(entity_path).key_remaps);
            }
            TrackEvent::Linked { entity_path } => {
                bump(&mut self.ops.fixup_links);
                bump(&mut self.entity(entity_path).fixup_links);
            }
            TrackEvent::Unlinked { entity_path } => {
                bump(&mut self.ops.fixup_unlinks);
                bump(&mut self.entity(entity_path).fixup_unlinks);
            }
            TrackEvent::UniqueSteal { entity_path } => {
                bump(&mut self.ops.unique_steals);
                bump(&mut self.entity(entity_path).unique_steals);
            }
            TrackEvent::CascadeRewrite { entity_path } => {
                bump(&mut self.ops.cascade_rewrites);
                bump(&mut self.entity(entity_path).cascade_rewrites);
            }
            TrackEvent::ValueGenerated {
                entity_path,
                temporary,
            } => {
                bump(&mut self.ops.values_generated);
                if temporary {
                    bump(&mut self.ops.temporary_values);
                }
                bump(&mut self.entity(entity_path).values_generated);
            }
        }
    }

    fn entity(&mut self, path: &str) -> &mut EntityCounters {
        self.entities.entry(path.to_string()).or_default()
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EventOps {
    // Registry churn
    pub entries_attached: u64,
    pub entries_detached: u64,

    // Detection
    pub detect_sweeps: u64,
    pub entries_swept: u64,
    pub properties_flagged: u64,

    // Identity map
    pub key_remaps: u64,

    // Fixup
    pub fixup_links: u64,
    pub fixup_unlinks: u64,
    pub unique_steals: u64,
    pub cascade_rewrites: u64,

    // Generation
    pub values_generated: u64,
    pub temporary_values: u64,
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EntityCounters {
    pub attached: u64,
    pub detached: u64,
    pub properties_flagged: u64,
    pub key_remaps: u64,
    pub fixup_links: u64,
    pub fixup_unlinks: u64,
    pub unique_steals: u64,
    pub cascade_rewrites: u64,
    pub values_generated: u64,
}
