use super::{DeliveryAttempts, DeliveryAttemptsServiceConfig};
use bson::oid::ObjectId;
use std::{collections::HashMap, sync::Arc, time::Duration};
use time::OffsetDateTime;
use tokio::{
    sync::{Mutex, Notify},
    time::{interval, Interval, MissedTickBehavior},
};

pub struct DeliveryAttemptsServiceGarbageCollector {
    attempts: Arc<Mutex<HashMap<ObjectId, DeliveryAttempts>>>,

    interval: Interval,
    attempts_lifespan: Duration,
}

impl DeliveryAttemptsServiceGarbageCollector {
    pub fn new(
        config: DeliveryAttemptsServiceConfig,
        attempts: Arc<Mutex<HashMap<ObjectId, DeliveryAttempts>>>,
    ) -> Self {
        let mut interval = interval(config.garbage_collector_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            attempts,
            interval,
            attempts_lifespan: config.attempts_lifespan,
        }
    }

    #[tracing::instrument(name = "Delivery Attempts Garbage Collector", skip_all)]
    pub async fn run(mut self, close_notify: Arc<Notify>) {
        tokio::select! {
            biased;

            _ = close_notify.notified() => {},

            _ = async { loop {
                self.interval.tick().await;
                self.collect().await;
            }} => {}
        }
    }

    async fn collect(&self) {
        let min_timestamp = OffsetDateTime::now_utc() - self.attempts_lifespan;

        tracing::debug!("garbage collection started");

        let len_before;
        let len_after;
        {
            let mut map = self.attempts.lock().await;
            len_before = map.len();

            map.retain(|_, attempts| attempts.last_attempt_at > min_timestamp);
            len_after = map.len();

            if map.len() < map.capacity() / 4 {
                let new_capacity = map.capacity() / 2;
                map.shrink_to(new_capacity);
            }
        }

        let removed_entries = len_before - len_after;
        tracing::debug!(removed_entries, "garbage collection finished");
    }
}
