use crate::prelude::*;
use std::time::Duration;

/// Capabilities a reconciliation runs with; everything that touches the
/// outside world (the OVH API, the progress sink, the poll's blocking wait)
/// is injected here, which keeps the commands testable.
pub struct Environment<'a> {
    pub sleep: Box<dyn FnMut(Duration) + 'a>,
    pub stdout: &'a mut dyn Write,
    pub api: &'a mut dyn BackupApi,
    pub dry_run: bool,
}

impl<'a> Environment<'a> {
    #[cfg(test)]
    pub fn test(stdout: &'a mut dyn Write, api: &'a mut dyn BackupApi) -> Self {
        Self {
            sleep: Box::new(|_| ()),
            stdout,
            api,
            dry_run: false,
        }
    }

    pub fn sleep(&mut self, duration: Duration) {
        (self.sleep)(duration)
    }
}
