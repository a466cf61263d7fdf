use std::sync::Arc;
use std::time::Instant;

use crate::balance::TeamPartitioner;
use crate::optimizer::OptimizerClient;
use crate::profile::ProfileAggregator;

#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<ProfileAggregator>,
    pub partitioner: Arc<TeamPartitioner>,
    /// Probed by the health endpoint; `None` when disabled.
    pub optimizer: Option<Arc<dyn OptimizerClient>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        profiles: Arc<ProfileAggregator>,
        partitioner: Arc<TeamPartitioner>,
        optimizer: Option<Arc<dyn OptimizerClient>>,
    ) -> Self {
        Self {
            profiles,
            partitioner,
            optimizer,
            started_at: Instant::now(),
        }
    }
}
