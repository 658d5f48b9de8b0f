//! Shared display lock.
//!
//! Every mutation of the visible surface (widget creation, text updates, tab
//! switches and the flush to the panel) happens while holding this lock, so
//! a half-built tab is never observed by another task.
//!
//! The lock is held for short bounded sections only. Never await a timer
//! while holding a guard; [`DisplayLock::with`] takes a synchronous closure
//! so the critical section cannot span a yield by construction.

use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    mutex::{
        Mutex,
        MutexGuard,
    },
};

/// Scoped access to the surface; released on drop, on every exit path.
pub type DisplayGuard<'a, S> = MutexGuard<'a, CriticalSectionRawMutex, S>;

/// Exclusive, non-reentrant lock around the display surface.
pub struct DisplayLock<S> {
    surface: Mutex<CriticalSectionRawMutex, S>,
}

impl<S> DisplayLock<S> {
    pub const fn new(surface: S) -> Self {
        Self {
            surface: Mutex::new(surface),
        }
    }

    /// Wait, without timeout, until the surface is free.
    pub async fn acquire(&self) -> DisplayGuard<'_, S> {
        self.surface.lock().await
    }

    /// Take the lock only if nobody holds it.
    pub fn try_acquire(&self) -> Option<DisplayGuard<'_, S>> {
        self.surface.try_lock().ok()
    }

    /// Run `f` with exclusive access to the surface.
    pub async fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut guard = self.acquire().await;
        f(&mut guard)
    }

    /// Consume the lock and hand back the surface.
    pub fn into_inner(self) -> S {
        self.surface.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use std::vec::Vec;

    use embassy_futures::{
        block_on,
        join::join3,
        yield_now,
    };

    use super::DisplayLock;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        Enter(u8),
        Exit(u8),
    }

    async fn writer(lock: &DisplayLock<Vec<Event>>, id: u8, rounds: usize) {
        for _ in 0..rounds {
            let mut guard = lock.acquire().await;
            guard.push(Event::Enter(id));
            // Give the other writers a chance to barge in while we hold it.
            drop(guard);
            yield_now().await;
            let mut guard = lock.acquire().await;
            guard.push(Event::Exit(id));
            drop(guard);
            yield_now().await;
        }
    }

    async fn holder(lock: &DisplayLock<Vec<Event>>, id: u8, rounds: usize) {
        for _ in 0..rounds {
            let mut guard = lock.acquire().await;
            guard.push(Event::Enter(id));
            yield_now().await;
            yield_now().await;
            guard.push(Event::Exit(id));
            drop(guard);
            yield_now().await;
        }
    }

    fn assert_no_overlap(events: &[Event]) {
        let mut holder = None;
        for event in events {
            match *event {
                Event::Enter(id) => {
                    assert_eq!(holder, None, "{id} entered while {holder:?} held the lock");
                    holder = Some(id);
                }
                Event::Exit(id) => {
                    assert_eq!(holder, Some(id));
                    holder = None;
                }
            }
        }
        assert_eq!(holder, None);
    }

    #[test]
    fn at_most_one_holder_at_a_time() {
        let lock = DisplayLock::new(Vec::new());
        block_on(join3(holder(&lock, 1, 20), holder(&lock, 2, 20), holder(&lock, 3, 20)));
        let events = lock.into_inner();
        assert_eq!(events.len(), 120);
        assert_no_overlap(&events);
    }

    #[test]
    fn unguarded_sections_do_interleave() {
        // Sanity check for the model: releasing between enter and exit lets
        // others in, which the overlap checker must notice.
        let lock = DisplayLock::new(Vec::new());
        block_on(join3(writer(&lock, 1, 3), writer(&lock, 2, 3), writer(&lock, 3, 3)));
        let events = lock.into_inner();
        let interleaved = events
            .windows(2)
            .any(|w| matches!(w, [Event::Enter(a), Event::Enter(b)] if a != b));
        assert!(interleaved);
    }

    #[test]
    fn try_acquire_fails_while_held() {
        let lock = DisplayLock::new(0_u32);
        let guard = lock.try_acquire();
        assert!(guard.is_some());
        assert!(lock.try_acquire().is_none());
        drop(guard);
        assert!(lock.try_acquire().is_some());
    }

    #[test]
    fn with_releases_after_closure() {
        let lock = DisplayLock::new(0_u32);
        let value = block_on(lock.with(|n| {
            *n += 5;
            *n
        }));
        assert_eq!(value, 5);
        assert!(lock.try_acquire().is_some());
    }
}
