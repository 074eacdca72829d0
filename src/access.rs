use serenity::all::{RoleId, UserId};

use crate::commands::Tier;
use crate::config::BotConfig;

/// Who is invoking a command. Derived from the interaction event and
/// discarded after the dispatch; never persisted.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: UserId,
    pub roles: Vec<RoleId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deny {
    OwnerOnly,
    AdminOnly,
    BoosterOnly,
    NotConfigured,
}

impl Deny {
    pub fn message(self) -> &'static str {
        match self {
            Deny::OwnerOnly => "This command is only available to the bot owner.",
            Deny::AdminOnly => "This command is only available to administrators.",
            Deny::BoosterOnly => "This command is only available to server boosters.",
            Deny::NotConfigured => {
                "This command is not configured on this server. Please contact an administrator."
            }
        }
    }
}

/// Pure tier check. Tiers are labels, not a hierarchy: the owner does not
/// implicitly pass admin checks. A tier whose id is not configured denies
/// every caller rather than waving them through.
pub fn authorize(tier: Tier, caller: &Caller, config: &BotConfig) -> Result<(), Deny> {
    match tier {
        Tier::Public => Ok(()),
        Tier::Owner => match config.owner_id {
            None => Err(Deny::NotConfigured),
            Some(owner) if caller.user_id == owner => Ok(()),
            Some(_) => Err(Deny::OwnerOnly),
        },
        Tier::Admin => role_check(config.admin_role_id, &caller.roles, Deny::AdminOnly),
        Tier::Booster => role_check(config.booster_role_id, &caller.roles, Deny::BoosterOnly),
    }
}

fn role_check(required: Option<RoleId>, held: &[RoleId], deny: Deny) -> Result<(), Deny> {
    match required {
        None => Err(Deny::NotConfigured),
        Some(role) if held.contains(&role) => Ok(()),
        Some(_) => Err(deny),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(user_id: u64, roles: &[u64]) -> Caller {
        Caller {
            user_id: UserId::new(user_id),
            roles: roles.iter().map(|r| RoleId::new(*r)).collect(),
        }
    }

    #[test]
    fn public_allows_anyone() {
        let config = BotConfig::for_tests();
        assert!(authorize(Tier::Public, &caller(1, &[]), &config).is_ok());
    }

    #[test]
    fn owner_allows_only_the_configured_user() {
        let config = BotConfig::for_tests();
        assert!(authorize(Tier::Owner, &caller(100, &[]), &config).is_ok());
        assert_eq!(
            authorize(Tier::Owner, &caller(101, &[]), &config),
            Err(Deny::OwnerOnly)
        );
    }

    #[test]
    fn owner_does_not_satisfy_admin() {
        let config = BotConfig::for_tests();
        assert_eq!(
            authorize(Tier::Admin, &caller(100, &[]), &config),
            Err(Deny::AdminOnly)
        );
    }

    #[test]
    fn admin_requires_the_configured_role() {
        let config = BotConfig::for_tests();
        assert!(authorize(Tier::Admin, &caller(1, &[200]), &config).is_ok());
        assert_eq!(
            authorize(Tier::Admin, &caller(1, &[300]), &config),
            Err(Deny::AdminOnly)
        );
    }

    #[test]
    fn booster_requires_the_configured_role() {
        let config = BotConfig::for_tests();
        assert!(authorize(Tier::Booster, &caller(1, &[300, 5]), &config).is_ok());
        assert_eq!(
            authorize(Tier::Booster, &caller(1, &[]), &config),
            Err(Deny::BoosterOnly)
        );
    }

    #[test]
    fn missing_configuration_fails_closed() {
        let config = BotConfig {
            owner_id: None,
            admin_role_id: None,
            booster_role_id: None,
            ..BotConfig::for_tests()
        };
        // Even a caller with no roles at all gets NotConfigured, not a
        // role-specific denial, and never an Allow.
        assert_eq!(
            authorize(Tier::Owner, &caller(100, &[]), &config),
            Err(Deny::NotConfigured)
        );
        assert_eq!(
            authorize(Tier::Admin, &caller(1, &[200]), &config),
            Err(Deny::NotConfigured)
        );
        assert_eq!(
            authorize(Tier::Booster, &caller(1, &[300]), &config),
            Err(Deny::NotConfigured)
        );
    }
}
