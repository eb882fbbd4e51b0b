//! Reusable deque scenarios, driven from `tests/` for each `PayloadOps`
//! flavour.


use crate::data_structures::Keyed;

/// Payload used by the shared scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Job {
    pub id: u64,
    pub producer: usize,
}

impl Job {
    pub fn new(id: u64) -> Self {
        Job { id, producer: 0 }
    }

    pub fn from_producer(producer: usize, id: u64) -> Self {
        Job { id, producer }
    }
}

impl Keyed for Job {
    type Key = u64;

    fn key(&self) -> &u64 {
        &self.id
    }
}

pub(crate) fn ids(jobs: &[Job]) -> Vec<u64> {
    jobs.iter().map(|job| job.id).collect()
}
