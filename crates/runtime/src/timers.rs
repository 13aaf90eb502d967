use foundation::time::Millis;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Pending<T> {
    id: TimerId,
    due: Millis,
    payload: T,
}

/// Deterministic one-shot timer queue driven by caller-supplied timestamps.
///
/// Nothing here reads a wall clock: the host (or a test) advances time by calling
/// [`TimerQueue::pop_due`] with the current timestamp. Timers fire in
/// `(due, insertion_order)` order, so two timers due at the same instant fire in
/// the order they were scheduled.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Schedules `payload` to fire `delay_ms` after `now`.
    pub fn schedule(&mut self, now: Millis, delay_ms: f64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.pending.push(Pending {
            id,
            due: now.after(delay_ms.max(0.0)),
            payload,
        });
        id
    }

    /// Returns `true` if the timer was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// Cancels every pending timer whose payload matches; returns how many were removed.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| !pred(&p.payload));
        before - self.pending.len()
    }

    pub fn clear(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn contains(&self, mut pred: impl FnMut(&T) -> bool) -> bool {
        self.pending.iter().any(|p| pred(&p.payload))
    }

    /// Earliest deadline among pending timers.
    pub fn next_due(&self) -> Option<Millis> {
        self.earliest().map(|i| self.pending[i].due)
    }

    /// Removes and returns the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: Millis) -> Option<(TimerId, T)> {
        let idx = self.earliest()?;
        if self.pending[idx].due > now {
            return None;
        }
        let p = self.pending.remove(idx);
        Some((p.id, p.payload))
    }

    fn earliest(&self) -> Option<usize> {
        // Ids are handed out in insertion order, so they break ties deterministically.
        self.pending
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.due
                    .0
                    .total_cmp(&b.due.0)
                    .then_with(|| a.id.cmp(&b.id))
            })
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::TimerQueue;
    use foundation::time::Millis;

    fn drain(q: &mut TimerQueue<&'static str>, now: f64) -> Vec<&'static str> {
        let mut out = Vec::new();
        while let Some((_, p)) = q.pop_due(Millis(now)) {
            out.push(p);
        }
        out
    }

    #[test]
    fn fires_in_deadline_order() {
        let mut q = TimerQueue::new();
        q.schedule(Millis(0.0), 2000.0, "settle");
        q.schedule(Millis(0.0), 100.0, "ease");
        assert_eq!(q.next_due(), Some(Millis(100.0)));
        assert!(drain(&mut q, 99.0).is_empty());
        assert_eq!(drain(&mut q, 100.0), vec!["ease"]);
        assert_eq!(drain(&mut q, 5000.0), vec!["settle"]);
        assert!(q.is_empty());
    }

    #[test]
    fn equal_deadlines_fire_in_insertion_order() {
        let mut q = TimerQueue::new();
        q.schedule(Millis(10.0), 5.0, "a");
        q.schedule(Millis(0.0), 15.0, "b");
        q.schedule(Millis(5.0), 10.0, "c");
        assert_eq!(drain(&mut q, 15.0), vec!["a", "b", "c"]);
    }

    #[test]
    fn cancel_removes_pending_timers() {
        let mut q = TimerQueue::new();
        let a = q.schedule(Millis(0.0), 10.0, "a");
        q.schedule(Millis(0.0), 10.0, "b");
        q.schedule(Millis(0.0), 10.0, "resume");
        assert!(q.cancel(a));
        assert!(!q.cancel(a));
        assert_eq!(q.cancel_where(|p| *p == "resume"), 1);
        assert_eq!(drain(&mut q, 10.0), vec!["b"]);
    }

    #[test]
    fn clear_reports_dropped_count() {
        let mut q = TimerQueue::new();
        q.schedule(Millis(0.0), 1.0, "a");
        q.schedule(Millis(0.0), 2.0, "b");
        assert_eq!(q.clear(), 2);
        assert_eq!(q.next_due(), None);
    }
}
