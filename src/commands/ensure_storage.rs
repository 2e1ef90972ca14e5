use crate::prelude::*;
use std::time::Duration;

/// Bounds the activation poll; with the defaults the reconciliation gives up
/// after roughly forty minutes.
#[derive(Copy, Clone, Debug)]
pub struct RetryBudget {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self {
            max_attempts: 240,
            interval: Duration::from_secs(10),
        }
    }
}

impl RetryBudget {
    /// Time spent sleeping when every attempt comes up short; the poll sleeps
    /// between attempts, not after the last one.
    pub fn waited(self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

/// Drives the backup-storage feature of one dedicated server to the desired
/// state: enables it (and waits for the provider-side activation task to
/// finish), disables it, or does nothing when observed and desired state
/// already agree.
pub struct EnsureStorage<'a, 'b> {
    env: &'a mut Environment<'b>,
    service: ServiceName,
    state: DesiredState,
    budget: RetryBudget,
}

impl<'a, 'b> EnsureStorage<'a, 'b> {
    pub fn new(env: &'a mut Environment<'b>, service: ServiceName, state: DesiredState) -> Self {
        Self {
            env,
            service,
            state,
            budget: Default::default(),
        }
    }

    pub fn with_budget(mut self, budget: RetryBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn run(mut self) -> Result<Outcome> {
        let observed = self
            .env
            .api
            .backup_storage(&self.service)
            .context("Couldn't fetch backup storage's state")?;

        match (self.state, observed) {
            (DesiredState::Present, Some(attributes)) => Ok(Outcome::unchanged(format!(
                "Backup storage of {} is already enabled",
                self.service,
            ))
            .with_attributes(attributes)),

            (DesiredState::Present, None) => self.enable(),

            (DesiredState::Absent, Some(_)) => self.disable(),

            (DesiredState::Absent, None) => Ok(Outcome::unchanged(format!(
                "Backup storage of {} is already disabled",
                self.service,
            ))),
        }
    }

    fn enable(&mut self) -> Result<Outcome> {
        if self.env.dry_run {
            return Ok(Outcome::changed(format!(
                "Backup storage of {} would be enabled",
                self.service,
            )));
        }

        let attributes = self
            .env
            .api
            .enable_backup_storage(&self.service)
            .context("Couldn't enable backup storage")?;

        self.await_activation()?;

        Ok(Outcome::changed(format!(
            "Backup storage of {} has been enabled",
            self.service,
        ))
        .with_attributes(attributes))
    }

    fn disable(&mut self) -> Result<Outcome> {
        if self.env.dry_run {
            return Ok(Outcome::changed(format!(
                "Backup storage of {} would be disabled",
                self.service,
            )));
        }

        let attributes = self
            .env
            .api
            .disable_backup_storage(&self.service)
            .context("Couldn't disable backup storage")?;

        Ok(Outcome::changed(format!(
            "Backup storage of {} has been disabled, all stored data will be erased",
            self.service,
        ))
        .with_attributes(attributes))
    }

    fn await_activation(&mut self) -> Result<()> {
        for attempt in 1..=self.budget.max_attempts {
            match self.latest_activation_task()? {
                Some(task) if task.is_done() => return Ok(()),

                Some(task) => {
                    writeln!(
                        self.env.stdout,
                        "- attempt {}/{}: task {} reported `{}` ({})",
                        attempt,
                        self.budget.max_attempts,
                        task.task_id,
                        task.status,
                        task.comment,
                    )?;
                }

                None => {
                    writeln!(
                        self.env.stdout,
                        "- attempt {}/{}: no activation task reported yet",
                        attempt, self.budget.max_attempts,
                    )?;
                }
            }

            if attempt < self.budget.max_attempts {
                self.env.sleep(self.budget.interval);
            }
        }

        bail!(
            "Backup storage activation didn't reach the `done` status within {} attempts \
             (waited ~{})",
            self.budget.max_attempts,
            humantime::format_duration(self.budget.waited()),
        );
    }

    /// Enabling backup storage doesn't tell us which task tracks it, so we
    /// trust the newest task with the activation function name; under
    /// concurrent activations of the same server this can observe the wrong
    /// task.
    fn latest_activation_task(&mut self) -> Result<Option<Task>> {
        let ids = self
            .env
            .api
            .tasks(&self.service, ACTIVATION_FUNCTION)
            .context("Couldn't list activation tasks")?;

        let id = match ids.into_iter().max() {
            Some(id) => id,
            None => return Ok(None),
        };

        let task = self
            .env
            .api
            .task(&self.service, id)
            .context("Couldn't fetch activation task")?;

        Ok(Some(task))
    }
}
