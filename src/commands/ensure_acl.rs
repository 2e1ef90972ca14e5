use crate::prelude::*;

/// Drives one ACL of a server's backup storage to the desired state.
///
/// An existing entry is always re-applied with the full permission set (no
/// per-field diffing), so an entry somebody edited by hand converges back to
/// the declared permissions.
pub struct EnsureAcl<'a, 'b> {
    env: &'a mut Environment<'b>,
    service: ServiceName,
    ip: IpBlock,
    state: DesiredState,
    permissions: Permissions,
}

impl<'a, 'b> EnsureAcl<'a, 'b> {
    pub fn new(
        env: &'a mut Environment<'b>,
        service: ServiceName,
        ip: IpBlock,
        state: DesiredState,
        permissions: Permissions,
    ) -> Self {
        Self {
            env,
            service,
            ip,
            state,
            permissions,
        }
    }

    pub fn run(mut self) -> Result<Outcome> {
        let observed = self
            .env
            .api
            .acl(&self.service, &self.ip)
            .context("Couldn't fetch ACL's state")?;

        match (self.state, observed) {
            (DesiredState::Present, Some(attributes)) => self.reapply(attributes),

            (DesiredState::Present, None) => self.create(),

            (DesiredState::Absent, Some(_)) => self.revoke(),

            (DesiredState::Absent, None) => Ok(Outcome::unchanged(format!(
                "ACL of backup storage {} is already revoked for {}",
                self.service, self.ip,
            ))),
        }
    }

    fn reapply(&mut self, observed: Payload) -> Result<Outcome> {
        if self.env.dry_run {
            return Ok(Outcome::changed(format!(
                "ACL of backup storage {} would be reapplied for {}",
                self.service, self.ip,
            ))
            .with_attributes(observed));
        }

        self.env
            .api
            .replace_acl(&self.service, &self.ip, self.permissions)
            .context("Couldn't reapply ACL")?;

        let attributes = self.refetch()?;

        Ok(Outcome::changed(format!(
            "ACL of backup storage {} has been reapplied for {}",
            self.service, self.ip,
        ))
        .with_attributes(attributes))
    }

    fn create(&mut self) -> Result<Outcome> {
        if self.env.dry_run {
            return Ok(Outcome::changed(format!(
                "ACL of backup storage {} would be created for {}",
                self.service, self.ip,
            )));
        }

        self.env
            .api
            .create_acl(&self.service, &self.ip, self.permissions)
            .context("Couldn't create ACL")?;

        let attributes = self.refetch()?;

        Ok(Outcome::changed(format!(
            "ACL of backup storage {} has been created for {}",
            self.service, self.ip,
        ))
        .with_attributes(attributes))
    }

    fn revoke(&mut self) -> Result<Outcome> {
        if self.env.dry_run {
            return Ok(Outcome::changed(format!(
                "ACL of backup storage {} would be revoked for {}",
                self.service, self.ip,
            )));
        }

        let attributes = self
            .env
            .api
            .delete_acl(&self.service, &self.ip)
            .context("Couldn't revoke ACL")?;

        Ok(Outcome::changed(format!(
            "ACL of backup storage {} has been revoked for {}",
            self.service, self.ip,
        ))
        .with_attributes(attributes))
    }

    fn refetch(&mut self) -> Result<Payload> {
        self.env
            .api
            .acl(&self.service, &self.ip)
            .context("Couldn't re-fetch ACL after applying it")?
            .ok_or_else(|| anyhow!("ACL of {} vanished right after applying it", self.service))
    }
}
