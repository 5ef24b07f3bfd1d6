use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};

const LOG_TARGET: &str = " throttler";

/// Bounds how many pages are processed at once.
///
/// Call [`Throttler::acquire`] before each page and hold the permit until the page is done.
/// [`Throttler::pause_for`] holds back new pages for a while (a server asked us to slow down) and
/// [`Throttler::abort`] stops new pages from starting at all while letting running ones finish.
#[derive(Debug)]
pub struct Throttler {
    semaphore: Arc<Semaphore>,
    paused: AtomicBool,
    aborted: AtomicBool,
    resume: Notify,
    resume_at: std::sync::Mutex<Option<Instant>>,
}

impl Throttler {
    /// Minimum extension required for a new pause to override an active one.
    const MIN_PAUSE_EXTENSION: Duration = Duration::from_millis(250);

    /// Create a throttler that allows at most `max_concurrent` pages at a time.
    #[must_use]
    pub fn new(max_concurrent: usize) -> Arc<Self> {
        Arc::new(Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            paused: AtomicBool::new(false),
            aborted: AtomicBool::new(false),
            resume: Notify::new(),
            resume_at: std::sync::Mutex::new(None),
        })
    }

    /// Wait until unpaused, then take a slot. Returns `None` once the throttler is aborted.
    pub async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        loop {
            if self.is_aborted() {
                return None;
            }

            if self.paused.load(Ordering::Acquire) {
                self.resume.notified().await;
                continue;
            }

            // closing the semaphore is how abort wakes tasks waiting for a slot
            return Arc::clone(&self.semaphore).acquire_owned().await.ok();
        }
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Refuse all further [`acquire`](Self::acquire) calls. Pages already running are not interrupted.
    pub fn abort(&self) {
        if !self.aborted.swap(true, Ordering::AcqRel) {
            log::warn!(target: LOG_TARGET, "Stopping: no new pages will be started");
        }

        self.semaphore.close();
        self.resume.notify_waiters();
    }

    /// Hold back new pages for `duration`.
    ///
    /// If a similar or longer pause is already active this is a no-op and returns `false`.
    pub fn pause_for(self: &Arc<Self>, duration: Duration) -> bool {
        let new_resume_at = Instant::now() + duration;

        {
            let mut guard = self.resume_at.lock().expect("lock not poisoned");
            if guard.is_some_and(|existing| existing + Self::MIN_PAUSE_EXTENSION >= new_resume_at) {
                return false;
            }
            *guard = Some(new_resume_at);
        }

        self.paused.store(true, Ordering::Release);
        let this = Arc::clone(self);
        drop(tokio::spawn(async move {
            tokio::time::sleep(duration).await;

            let should_resume = {
                let mut guard = this.resume_at.lock().expect("lock not poisoned");
                if guard.is_some_and(|t| Instant::now() >= t) {
                    *guard = None;
                    true
                } else {
                    false // a longer pause was scheduled after us
                }
            };

            if should_resume {
                this.paused.store(false, Ordering::Release);
                this.resume.notify_waiters();
            }
        }));

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::AtomicUsize;

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call CreateIoCompletionPort on Windows")]
    async fn test_limits_concurrency() {
        let throttler = Throttler::new(2);
        let active = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let throttler = Arc::clone(&throttler);
                let active = Arc::clone(&active);
                let max_seen = Arc::clone(&max_seen);
                tokio::spawn(async move {
                    let _permit = throttler.acquire().await;
                    let current = active.fetch_add(1, Ordering::SeqCst) + 1;
                    _ = max_seen.fetch_max(current, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    _ = active.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        _ = futures_util::future::join_all(tasks).await;

        assert!(max_seen.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call CreateIoCompletionPort on Windows")]
    async fn test_pause_blocks_new_work() {
        let throttler = Throttler::new(5);
        assert!(throttler.pause_for(Duration::from_millis(200)));
        assert!(throttler.is_paused());

        let start = tokio::time::Instant::now();
        let permit = throttler.acquire().await;
        assert!(permit.is_some());
        assert!(start.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call CreateIoCompletionPort on Windows")]
    async fn test_shorter_pause_ignored() {
        let throttler = Throttler::new(1);
        assert!(throttler.pause_for(Duration::from_secs(5)));
        assert!(!throttler.pause_for(Duration::from_millis(10)));
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call CreateIoCompletionPort on Windows")]
    async fn test_abort_releases_waiters() {
        let throttler = Throttler::new(1);
        let held = throttler.acquire().await;
        assert!(held.is_some());

        let waiter = {
            let throttler = Arc::clone(&throttler);
            tokio::spawn(async move { throttler.acquire().await.is_some() })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        throttler.abort();

        assert!(!waiter.await.unwrap());
        assert!(throttler.is_aborted());
        assert!(throttler.acquire().await.is_none());
    }
}
