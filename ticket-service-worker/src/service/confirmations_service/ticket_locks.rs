use bson::oid::ObjectId;
use std::{
    collections::{hash_map::Entry, HashMap},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Locks = HashMap<ObjectId, TicketLock>;

#[derive(Default)]
struct TicketLock {
    mutex: Arc<AsyncMutex<()>>,

    // holders and waiters
    users: usize,
}

///
/// Async lock per ticket id.
///
/// Entries live only while somebody holds or waits for the lock.
///
#[derive(Default)]
pub struct TicketLocks {
    locks: Mutex<Locks>,
}

pub struct TicketLockGuard<'a> {
    ticket_locks: &'a TicketLocks,
    ticket_id: ObjectId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl TicketLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, ticket_id: ObjectId) -> TicketLockGuard<'_> {
        let mutex = {
            let mut locks = self.locks();
            let ticket_lock = locks.entry(ticket_id).or_default();
            ticket_lock.users += 1;
            Arc::clone(&ticket_lock.mutex)
        };

        // Exists before waiting, so dropping this future releases the entry too
        let mut ticket_guard = TicketLockGuard {
            ticket_locks: self,
            ticket_id,
            guard: None,
        };
        ticket_guard.guard = Some(mutex.lock_owned().await);

        ticket_guard
    }

    fn locks(&self) -> MutexGuard<'_, Locks> {
        // Map stays consistent even if a holder panicked
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks().len()
    }
}

impl Drop for TicketLockGuard<'_> {
    fn drop(&mut self) {
        let mut locks = self.ticket_locks.locks();

        // Released under map lock so nobody can join entry in between
        drop(self.guard.take());

        if let Entry::Occupied(mut entry) = locks.entry(self.ticket_id) {
            entry.get_mut().users -= 1;
            if entry.get().users == 0 {
                entry.remove();
            }
        }
    }
}
