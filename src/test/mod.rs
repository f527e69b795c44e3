use std::sync::{Arc, Mutex};

use crate::catalog::{Catalog, Phase};
use crate::link::{LinkProbe, ScriptedAdapter, SharedProbe};
use crate::session::{ConfigWorld, MemoryLog};
use crate::settings::Profile;
use crate::sim::Scheduler;

mod settings;
mod transcript;
mod ubx;

pub(crate) fn probe() -> SharedProbe {
    Arc::new(Mutex::new(LinkProbe::default()))
}

pub(crate) struct Fixture {
    pub sched: Scheduler,
    pub world: ConfigWorld,
    pub log: MemoryLog,
    pub probe: SharedProbe,
}

impl Fixture {
    pub fn with_adapter(adapter: ScriptedAdapter, probe: SharedProbe) -> Self {
        let log = MemoryLog::new();
        let world = ConfigWorld::new(
            Box::new(adapter),
            &Profile::default(),
            Box::new(log.clone()),
        );
        Self {
            sched: Scheduler::default(),
            world,
            log,
            probe,
        }
    }

    pub fn new() -> Self {
        let probe = probe();
        Self::with_adapter(ScriptedAdapter::new(Arc::clone(&probe)), probe)
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.probe.lock().expect("probe lock").writes.clone()
    }

    pub fn close_calls(&self) -> u32 {
        self.probe.lock().expect("probe lock").close_calls
    }
}

/// Every payload the default catalog sends, in send order.
pub(crate) fn expected_writes(catalog: &Catalog) -> Vec<Vec<u8>> {
    Phase::ALL
        .iter()
        .flat_map(|&p| catalog.queue(p).iter().map(|pkt| pkt.payload.clone()).collect::<Vec<_>>())
        .collect()
}
