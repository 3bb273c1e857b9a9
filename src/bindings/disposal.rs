// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Deferred destruction of GPU resources.

A resident texture may still be referenced by command lists already submitted when its handle
is disposed. The queue holds such textures until a number of pool-clean cycles have passed with
no new disposal. That number must be at least the renderer's frames in flight.
*/

/// Pool-clean cycles a disposed texture survives.
pub const DEFAULT_DISPOSAL_DELAY: u32 = 5;

/// What one clean cycle did.
#[derive(Debug, PartialEq, Eq)]
pub enum Tick<T> {
    /// Still inside the delay window since the last enqueue.
    Pending,
    /// The window just closed; destroy these.
    Drained(Vec<T>),
    /// The window closed on an earlier tick and nothing was enqueued since.
    Idle,
}

#[derive(Debug)]
pub struct DisposalQueue<T> {
    queued: Vec<T>,
    frames: u32,
    delay: u32,
}

impl<T> DisposalQueue<T> {
    pub fn new(delay: u32) -> Self {
        DisposalQueue {
            queued: Vec::new(),
            frames: 0,
            delay,
        }
    }

    /// Queues `item` and restarts the delay window.
    pub fn enqueue(&mut self, item: T) {
        self.queued.push(item);
        self.frames = 0;
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    pub fn delay(&self) -> u32 {
        self.delay
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.queued.iter()
    }

    /// Advances one clean cycle.
    pub fn tick(&mut self) -> Tick<T> {
        if self.frames >= self.delay {
            return Tick::Idle;
        }
        self.frames += 1;
        if self.frames == self.delay {
            Tick::Drained(std::mem::take(&mut self.queued))
        } else {
            Tick::Pending
        }
    }

    /// Puts drained items back ahead of anything queued since, and restarts the window.
    pub fn hold(&mut self, mut items: Vec<T>) {
        items.append(&mut self.queued);
        self.queued = items;
        self.frames = 0;
    }

    /// Removes everything regardless of the window.
    pub fn drain_all(&mut self) -> Vec<T> {
        self.frames = self.delay;
        std::mem::take(&mut self.queued)
    }
}
