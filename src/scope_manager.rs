//! Per-scope instance caches.
//!
//! Singleton cells live in a container-wide table guarded by a mutex and a
//! condition variable: the first thread to request a component claims its
//! cell and builds outside the lock, concurrent requesters wait for the
//! result. Thread-scoped cells live in thread-local storage, partitioned by
//! container so two containers on one thread never share instances.

use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};

use crate::descriptor::AnyArc;
use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::scope::Scope;

static NEXT_PARTITION: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_CELLS: RefCell<HashMap<(u64, TypeId), Cell>> = RefCell::new(HashMap::new());
}

enum Cell {
    /// Claimed by a builder that has not published yet
    Creating(ThreadId),
    Ready(AnyArc),
}

#[derive(Default)]
struct SingletonTable {
    cells: HashMap<TypeId, Cell>,
    /// Which cell each blocked thread is waiting on
    waiting: HashMap<ThreadId, TypeId>,
}

impl SingletonTable {
    // Would `me` waiting on `owner` close a wait-for cycle?
    fn closes_cycle(&self, owner: ThreadId, me: ThreadId) -> bool {
        let mut current = owner;
        for _ in 0..=self.waiting.len() {
            if current == me {
                return true;
            }
            let next = self.waiting.get(&current).and_then(|id| match self.cells.get(id) {
                Some(Cell::Creating(holder)) => Some(*holder),
                _ => None,
            });
            match next {
                Some(holder) => current = holder,
                None => return false,
            }
        }
        false
    }

    fn ready_count(&self) -> usize {
        self.cells.values().filter(|c| matches!(c, Cell::Ready(_))).count()
    }
}

/// Instance caches for the singleton and thread scopes.
pub(crate) struct ScopeManager {
    partition: u64,
    singletons: Mutex<SingletonTable>,
    published: Condvar,
}

impl ScopeManager {
    pub(crate) fn new() -> Self {
        Self {
            partition: NEXT_PARTITION.fetch_add(1, Ordering::Relaxed),
            singletons: Mutex::new(SingletonTable::default()),
            published: Condvar::new(),
        }
    }

    /// Returns the cached instance for `key` under `scope`, running `build`
    /// at most once per cell. Prototype never caches.
    ///
    /// A failed or panicking build leaves the cell empty, so a later request
    /// retries.
    pub(crate) fn get_or_create<F>(&self, scope: Scope, key: Key, build: F) -> DiResult<AnyArc>
    where
        F: FnOnce() -> DiResult<AnyArc>,
    {
        match scope {
            Scope::Singleton => self.singleton(key, build),
            Scope::Thread => self.per_thread(key, build),
            Scope::Prototype => build(),
        }
    }

    fn singleton<F>(&self, key: Key, build: F) -> DiResult<AnyArc>
    where
        F: FnOnce() -> DiResult<AnyArc>,
    {
        let me = thread::current().id();
        let id = key.type_id();
        {
            let mut table = self.singletons.lock();
            loop {
                let owner = match table.cells.get(&id) {
                    Some(Cell::Ready(instance)) => return Ok(instance.clone()),
                    Some(Cell::Creating(owner)) => *owner,
                    None => {
                        table.cells.insert(id, Cell::Creating(me));
                        break;
                    }
                };
                if table.closes_cycle(owner, me) {
                    return Err(DiError::RecursionDetected(key.display_name()));
                }
                table.waiting.insert(me, id);
                self.published.wait(&mut table);
                table.waiting.remove(&me);
            }
        }

        let claim = SingletonClaim {
            manager: self,
            id,
            armed: true,
        };
        let instance = build()?;
        claim.publish(instance.clone());
        Ok(instance)
    }

    fn per_thread<F>(&self, key: Key, build: F) -> DiResult<AnyArc>
    where
        F: FnOnce() -> DiResult<AnyArc>,
    {
        let slot = (self.partition, key.type_id());
        let cached = THREAD_CELLS.with(|cells| {
            let mut cells = cells.borrow_mut();
            match cells.get(&slot) {
                Some(Cell::Ready(instance)) => Ok(Some(instance.clone())),
                Some(Cell::Creating(_)) => Err(DiError::RecursionDetected(key.display_name())),
                None => {
                    cells.insert(slot, Cell::Creating(thread::current().id()));
                    Ok(None)
                }
            }
        })?;
        if let Some(instance) = cached {
            return Ok(instance);
        }

        let claim = ThreadClaim { slot, armed: true };
        let instance = build()?;
        claim.publish(instance.clone());
        Ok(instance)
    }

    /// Drops every thread-scoped instance this container cached on the
    /// calling thread.
    pub(crate) fn clear_current_thread(&self) {
        let partition = self.partition;
        let _ = THREAD_CELLS.try_with(|cells| {
            cells.borrow_mut().retain(|(p, _), _| *p != partition);
        });
    }

    pub(crate) fn singleton_count(&self) -> usize {
        self.singletons.lock().ready_count()
    }

    /// Thread-scoped instances cached on the calling thread.
    pub(crate) fn thread_count(&self) -> usize {
        let partition = self.partition;
        THREAD_CELLS
            .try_with(|cells| {
                cells
                    .borrow()
                    .iter()
                    .filter(|((p, _), cell)| *p == partition && matches!(cell, Cell::Ready(_)))
                    .count()
            })
            .unwrap_or(0)
    }
}

impl Drop for ScopeManager {
    fn drop(&mut self) {
        self.clear_current_thread();
    }
}

struct SingletonClaim<'a> {
    manager: &'a ScopeManager,
    id: TypeId,
    armed: bool,
}

impl SingletonClaim<'_> {
    fn publish(mut self, instance: AnyArc) {
        self.armed = false;
        self.manager.singletons.lock().cells.insert(self.id, Cell::Ready(instance));
        self.manager.published.notify_all();
    }
}

impl Drop for SingletonClaim<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.manager.singletons.lock().cells.remove(&self.id);
            self.manager.published.notify_all();
        }
    }
}

struct ThreadClaim {
    slot: (u64, TypeId),
    armed: bool,
}

impl ThreadClaim {
    fn publish(mut self, instance: AnyArc) {
        self.armed = false;
        let slot = self.slot;
        let _ = THREAD_CELLS.try_with(|cells| {
            cells.borrow_mut().insert(slot, Cell::Ready(instance));
        });
    }
}

impl Drop for ThreadClaim {
    fn drop(&mut self) {
        if self.armed {
            let slot = self.slot;
            let _ = THREAD_CELLS.try_with(|cells| {
                cells.borrow_mut().remove(&slot);
            });
        }
    }
}
