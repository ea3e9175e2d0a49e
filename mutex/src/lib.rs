#![cfg_attr(not(test), no_std)]

use core::cell::UnsafeCell;
use core::fmt;
use core::ops::Deref;
use core::ops::DerefMut;
use core::sync::atomic::AtomicBool;
use core::sync::atomic::Ordering;

/// Busy-waiting mutual exclusion.
///
/// A driver shared between contexts lives behind one of these; the lock then
/// covers its whole read-modify-write sequence, not just single accesses.
pub struct SpinLock<T: ?Sized> {
    locked: AtomicBool,
    data: UnsafeCell<T>,
}

pub struct SpinLockGuard<'a, T: ?Sized> {
    lock: &'a SpinLock<T>,
}

unsafe impl<T: ?Sized + Send> Send for SpinLock<T> {}
unsafe impl<T: ?Sized + Send> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    pub const fn new(data: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            data: UnsafeCell::new(data),
        }
    }

    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: ?Sized> SpinLock<T> {
    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            core::hint::spin_loop();
        }
        SpinLockGuard { lock: self }
    }

    pub fn try_lock(&self) -> Option<SpinLockGuard<'_, T>> {
        if self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            Some(SpinLockGuard { lock: self })
        } else {
            None
        }
    }

    /// Runs `f` with the lock held and releases it afterwards.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.lock();
        f(&mut guard)
    }

    /// Exclusive access without locking; the borrow already proves exclusivity.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for SpinLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(g) = self.try_lock() {
            f.debug_struct("SpinLock").field("data", &&*g).finish()
        } else {
            f.debug_struct("SpinLock")
                .field("data", &"<locked>")
                .finish()
        }
    }
}

impl<T: Default> Default for SpinLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: ?Sized> Drop for SpinLockGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}

impl<T: ?Sized> Deref for SpinLockGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        unsafe { &*self.lock.data.get() }
    }
}

impl<T: ?Sized> DerefMut for SpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { &mut *self.lock.data.get() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn spinlock_test() {
        let spinlock = Arc::new(SpinLock::new(0));
        let mut handles = vec![];

        for _ in 0..10 {
            let spinlock_clone = Arc::clone(&spinlock);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    let mut guard = spinlock_clone.lock();
                    *guard += 1;
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(*spinlock.lock(), 10 * 1000);
    }

    #[test]
    fn read_modify_write_under_with_is_not_lost() {
        // Two fields updated as one unit; a torn update would leave them unequal.
        let lock = Arc::new(SpinLock::new((0u32, 0u32)));
        let mut handles = vec![];

        for _ in 0..8 {
            let lock = Arc::clone(&lock);
            handles.push(thread::spawn(move || {
                for _ in 0..500 {
                    lock.with(|(a, b)| {
                        let seen = *a;
                        *a = seen + 1;
                        *b += 1;
                    });
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(*lock.lock(), (4000, 4000));
    }

    #[test]
    fn try_lock_fails_while_held() {
        let lock = SpinLock::new(5);
        let guard = lock.lock();

        assert!(lock.try_lock().is_none());
        assert_eq!(format!("{:?}", lock), "SpinLock { data: \"<locked>\" }");
        drop(guard);

        assert_eq!(lock.try_lock().map(|g| *g), Some(5));
        assert_eq!(format!("{:?}", lock), "SpinLock { data: 5 }");
        assert_eq!(lock.into_inner(), 5);
    }
}
