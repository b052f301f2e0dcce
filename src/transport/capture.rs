use std::collections::VecDeque;

use parking_lot::Mutex;

/// Output lines from a shell process, in arrival order.
///
/// One producer (the stdout reader task) pushes; one consumer drains.
#[derive(Debug, Default)]
pub struct CaptureBuffer {
  lines: Mutex<VecDeque<String>>,
}

impl CaptureBuffer {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&self, line: String) {
    self.lines.lock().push_back(line);
  }

  pub fn clear(&self) {
    self.lines.lock().clear();
  }

  /// Take everything captured so far, leaving the buffer empty.
  pub fn drain(&self) -> Vec<String> {
    self.lines.lock().drain(..).collect()
  }

  pub fn len(&self) -> usize {
    self.lines.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.lines.lock().is_empty()
  }
}
