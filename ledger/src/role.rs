//! Caller role resolution.

use std::collections::HashSet;

use custodia_common::Address;
use serde::{Deserialize, Serialize};

/// The role a caller holds for the duration of a single operation.
///
/// Resolved fresh on every mutating call: there are no sessions, no caching
/// of authorization decisions, and no time-based expiry of agent status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallerRole {
    /// The caller is the current owner.
    Owner,
    /// The caller is a currently-authorized agent.
    Agent,
    /// The caller holds no role.
    Unauthorized,
}

impl CallerRole {
    /// Resolve a caller against the current owner and agent set.
    ///
    /// The owner is implicitly authorized regardless of the agent set.
    pub fn resolve(caller: &Address, owner: &Address, agents: &HashSet<Address>) -> Self {
        if caller == owner {
            CallerRole::Owner
        } else if agents.contains(caller) {
            CallerRole::Agent
        } else {
            CallerRole::Unauthorized
        }
    }

    /// Check if this role may withdraw on behalf of any account.
    pub fn may_withdraw(&self) -> bool {
        matches!(self, CallerRole::Owner | CallerRole::Agent)
    }

    /// Check if this role holds administrative rights.
    pub fn is_owner(&self) -> bool {
        matches!(self, CallerRole::Owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Address, HashSet<Address>) {
        let owner = Address::new("OWNER");
        let mut agents = HashSet::new();
        agents.insert(Address::new("AGENT"));
        (owner, agents)
    }

    #[test]
    fn test_owner_resolution() {
        let (owner, agents) = setup();
        let role = CallerRole::resolve(&owner, &owner, &agents);
        assert_eq!(role, CallerRole::Owner);
        assert!(role.may_withdraw());
        assert!(role.is_owner());
    }

    #[test]
    fn test_agent_resolution() {
        let (owner, agents) = setup();
        let role = CallerRole::resolve(&Address::new("AGENT"), &owner, &agents);
        assert_eq!(role, CallerRole::Agent);
        assert!(role.may_withdraw());
        assert!(!role.is_owner());
    }

    #[test]
    fn test_stranger_resolution() {
        let (owner, agents) = setup();
        let role = CallerRole::resolve(&Address::new("MALLORY"), &owner, &agents);
        assert_eq!(role, CallerRole::Unauthorized);
        assert!(!role.may_withdraw());
        assert!(!role.is_owner());
    }

    #[test]
    fn test_owner_wins_over_agent_entry() {
        // An owner listed in the agent set still resolves as owner.
        let (owner, mut agents) = setup();
        agents.insert(owner.clone());
        assert_eq!(
            CallerRole::resolve(&owner, &owner, &agents),
            CallerRole::Owner
        );
    }
}
