/// A monotonic millisecond clock.
///
/// Only used to bound the busy-wait for a finished measurement. The counter
/// may wrap; elapsed time is computed with wrapping arithmetic.
pub trait Clock {
    /// Current time in milliseconds.
    fn now_ms(&mut self) -> u32;
}

impl<T: Clock + ?Sized> Clock for &mut T {
    #[inline]
    fn now_ms(&mut self) -> u32 {
        T::now_ms(self)
    }
}

/// Milliseconds elapsed between `start` and `now`, tolerating one wrap.
#[inline]
pub(crate) fn elapsed_ms(start: u32, now: u32) -> u32 {
    now.wrapping_sub(start)
}
