// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Deferred GPU work.

Creating resident textures, recording staging copies and rebuilding the descriptor table all
have to happen where the renderer records its commands. The pool pushes that work here;
the rendering frontend calls [`UploadQueue::drain`] once per frame, before anything samples
the table.
*/

use crate::imp::GpuDevice;
use std::fmt::Debug;
use std::sync::Mutex;

type Task<D> = Box<dyn FnOnce(&D, &mut <D as GpuDevice>::CommandList) + Send>;

pub struct UploadQueue<D: GpuDevice> {
    tasks: Mutex<Vec<(String, Task<D>)>>,
}

impl<D: GpuDevice> Debug for UploadQueue<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadQueue")
            .field("pending", &self.len())
            .finish()
    }
}

impl<D: GpuDevice> Default for UploadQueue<D> {
    fn default() -> Self {
        UploadQueue {
            tasks: Mutex::new(Vec::new()),
        }
    }
}

impl<D: GpuDevice> UploadQueue<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<F>(&self, label: impl Into<String>, task: F)
    where
        F: FnOnce(&D, &mut D::CommandList) + Send + 'static,
    {
        self.tasks.lock().unwrap().push((label.into(), Box::new(task)));
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs every queued task in submission order and returns how many ran.
    ///
    /// Tasks pushed while draining run on the next call.
    pub fn drain(&self, device: &D, command_list: &mut D::CommandList) -> usize {
        let tasks = std::mem::take(&mut *self.tasks.lock().unwrap());
        let count = tasks.len();
        for (label, task) in tasks {
            logwise::trace_sync!("upload task {label}", label = logwise::privacy::LogIt(&label));
            task(device, command_list);
        }
        count
    }
}
