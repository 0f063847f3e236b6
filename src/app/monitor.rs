//! Monitor: the smoothed belief and the measurement log.
//!
//! Single writer (the sampling loop), many readers (status queries).  All
//! state sits behind one `RwLock`, so a reader always sees the state
//! between two complete updates, never a half-applied one.
//!
//! ```text
//!   update(sample) ─▶ belief = (1-α)·belief + α·sample
//!                  ─▶ conserve && sample ≡ last?  ── yes ─▶ done
//!                  ─▶ history.push(sample) ─▶ store.append(sample)
//! ```

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info};

use super::ports::RecordStore;
use crate::error::StoreError;
use crate::measurement::Measurement;

/// A record store that can be shared with the status server thread.
pub type SharedStore = Box<dyn RecordStore + Send + Sync>;

struct State {
    belief: Option<Measurement>,
    history: Vec<Measurement>,
    store: Option<SharedStore>,
    closed: bool,
}

pub struct Monitor {
    state: RwLock<State>,
    lag: f64,
    conserve: bool,
}

impl Monitor {
    /// Load the existing log from `store` and seed the belief from its
    /// most recent record.  With an empty log the first sample seeds it.
    pub fn new(store: Option<SharedStore>, lag: f64, conserve: bool) -> Result<Self, StoreError> {
        let mut store = store;
        let history = match store.as_mut() {
            Some(s) => s.load_all()?,
            None => Vec::new(),
        };
        let belief = history.last().copied();
        info!(
            "Monitor: {} records loaded (lag={}, conserve={})",
            history.len(),
            lag,
            conserve
        );
        Ok(Self {
            state: RwLock::new(State {
                belief,
                history,
                store,
                closed: false,
            }),
            lag,
            conserve,
        })
    }

    /// Fold `sample` into the belief and record it.
    ///
    /// Returns `Ok(false)` when conserve mode suppressed the record.  A store
    /// failure is returned only after belief and history were updated.
    pub fn update(&self, sample: Measurement) -> Result<bool, StoreError> {
        let mut guard = self.write();
        let st = &mut *guard;

        match st.belief.as_mut() {
            Some(belief) => belief.smooth(self.lag, &sample),
            None => st.belief = Some(sample),
        }

        if self.conserve && st.history.last().is_some_and(|last| last.same(&sample)) {
            debug!("Monitor: unchanged sample conserved");
            return Ok(false);
        }

        st.history.push(sample);
        if st.closed {
            return Ok(true);
        }
        if let Some(store) = st.store.as_mut() {
            store.append(&sample)?;
        }
        Ok(true)
    }

    /// Current smoothed estimate; `None` until a record or sample exists.
    pub fn belief(&self) -> Option<Measurement> {
        self.read().belief
    }

    /// Snapshot of every recorded sample, oldest first.
    pub fn series(&self) -> Vec<Measurement> {
        self.read().history.clone()
    }

    /// Most recent recorded sample.
    pub fn latest(&self) -> Option<Measurement> {
        self.read().history.last().copied()
    }

    pub fn len(&self) -> usize {
        self.read().history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().history.is_empty()
    }

    /// Flush and release the store.  Later updates stay in memory only;
    /// a second call does nothing.
    pub fn close(&self) -> Result<(), StoreError> {
        let mut st = self.write();
        if st.closed {
            return Ok(());
        }
        st.closed = true;
        info!("Monitor: closing with {} records", st.history.len());
        match st.store.as_mut() {
            Some(store) => store.close(),
            None => Ok(()),
        }
    }

    // A panic while holding the lock cannot leave the state torn: every
    // mutation above is a single assignment or push.
    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
