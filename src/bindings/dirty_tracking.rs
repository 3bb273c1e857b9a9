// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
This module implements a "dirty tracking" flag shared between the code that changes
resources and the code that rebuilds something from them.

This differs from a channel as in this programming model, each resource can freely mutate
the signal between clean/dirty, whereas it would be challenging to yank values from a channel.
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone)]
pub struct DirtySender {
    shared: Arc<AtomicBool>,
}

impl DirtySender {
    pub fn new(dirty: bool) -> Self {
        DirtySender {
            shared: Arc::new(AtomicBool::new(dirty)),
        }
    }
    pub fn mark_dirty(&self, dirty: bool) {
        self.shared.store(dirty, Ordering::Release);
    }
}

#[derive(Debug, Clone)]
pub struct DirtyReceiver {
    shared: Arc<AtomicBool>,
}

impl DirtyReceiver {
    pub fn new(sender: &DirtySender) -> DirtyReceiver {
        DirtyReceiver {
            shared: sender.shared.clone(),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.shared.load(Ordering::Acquire)
    }
}

impl PartialEq for DirtyReceiver {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}
impl Eq for DirtyReceiver {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn receivers_see_sender_changes() {
        let s = DirtySender::new(false);
        let r = DirtyReceiver::new(&s);
        assert!(!r.is_dirty());
        s.clone().mark_dirty(true);
        assert!(r.is_dirty());
        s.mark_dirty(false);
        assert!(!r.is_dirty());
        assert_eq!(r, DirtyReceiver::new(&s));
    }
}
