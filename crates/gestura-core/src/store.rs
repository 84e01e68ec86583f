//! In-memory gesture event store.
//!
//! Holds every gesture submitted during the process lifetime. Nothing is
//! persisted: a restart starts from an empty store.

use crate::clock::{local_date, local_day_window, Clock, SystemClock};
use crate::types::{Gesture, NewGesture};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    /// Events in insertion order.
    events: Vec<Gesture>,
    /// Event id -> position in `events`.
    index: HashMap<String, usize>,
}

impl Inner {
    fn insert(&mut self, gesture: Gesture) {
        self.index.insert(gesture.id.clone(), self.events.len());
        self.events.push(gesture);
    }
}

/// Exclusive owner of the gesture event collection.
pub struct GestureStore {
    inner: RwLock<Inner>,
    clock: Arc<dyn Clock>,
}

impl GestureStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            clock,
        }
    }

    /// The clock this store stamps events with.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Store a new event with a fresh id and the current time.
    ///
    /// Performs no validation; callers pass already-validated input.
    pub fn create(&self, input: NewGesture) -> Gesture {
        let mut inner = self.write();
        let gesture = self.stamp(&inner, input);
        inner.insert(gesture.clone());
        gesture
    }

    /// Like [`create`](Self::create), but runs `prepare` on the stamped event
    /// before committing it. If `prepare` fails nothing is stored.
    pub fn create_with<T, E>(
        &self,
        input: NewGesture,
        prepare: impl FnOnce(&Gesture) -> Result<T, E>,
    ) -> Result<(Gesture, T), E> {
        let mut inner = self.write();
        let gesture = self.stamp(&inner, input);
        let prepared = prepare(&gesture)?;
        inner.insert(gesture.clone());
        Ok((gesture, prepared))
    }

    fn stamp(&self, inner: &Inner, input: NewGesture) -> Gesture {
        let mut id = Uuid::new_v4().to_string();
        while inner.index.contains_key(&id) {
            id = Uuid::new_v4().to_string();
        }

        // Never stamp an event earlier than the one before it.
        let now = self.clock.now();
        let timestamp = match inner.events.last() {
            Some(prev) if prev.timestamp > now => prev.timestamp,
            _ => now,
        };

        Gesture {
            id,
            student_name: input.student_name,
            gesture_type: input.gesture_type,
            message: input.message,
            timestamp,
        }
    }

    pub fn get_by_id(&self, id: &str) -> Option<Gesture> {
        let inner = self.read();
        inner.index.get(id).map(|&i| inner.events[i].clone())
    }

    /// Every stored event, in insertion order.
    pub fn all(&self) -> Vec<Gesture> {
        self.read().events.clone()
    }

    /// Events from the current local calendar day.
    pub fn today(&self) -> Vec<Gesture> {
        self.today_at(self.clock.now())
    }

    /// Events inside `[local midnight, next local midnight)` of the day containing `now`.
    pub fn today_at(&self, now: DateTime<Utc>) -> Vec<Gesture> {
        let (start, end) = local_day_window(local_date(now));
        self.between(start, end)
    }

    /// Events no older than `days * 24h` before now.
    pub fn within_days(&self, days: u32) -> Vec<Gesture> {
        self.within_days_at(days, self.clock.now())
    }

    /// Events with `timestamp >= now - days * 24h`. The lower bound is inclusive.
    ///
    /// A window reaching past the earliest representable instant covers everything.
    pub fn within_days_at(&self, days: u32, now: DateTime<Utc>) -> Vec<Gesture> {
        let cutoff = now
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.filter(|g| g.timestamp >= cutoff)
    }

    /// Events with `start <= timestamp < end`.
    pub fn between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Gesture> {
        self.filter(|g| g.timestamp >= start && g.timestamp < end)
    }

    pub fn len(&self) -> usize {
        self.read().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().events.is_empty()
    }

    fn filter(&self, keep: impl Fn(&Gesture) -> bool) -> Vec<Gesture> {
        self.read()
            .events
            .iter()
            .filter(|g| keep(g))
            .cloned()
            .collect()
    }

    // The lock is never held across a panic-prone section, so a poisoned
    // lock still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for GestureStore {
    fn default() -> Self {
        Self::new()
    }
}
