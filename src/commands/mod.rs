//! The command catalog: one module per command, grouped by tier the same
//! way the descriptor sources are grouped, plus the registry that indexes
//! them at startup.

pub mod admin;
pub mod booster;
pub mod owner;
pub mod public;

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use serenity::all::CreateCommand;
use thiserror::Error;
use tracing::{info, warn};

use crate::access::{self, Caller};
use crate::config::BotConfig;
use crate::dispatch::CommandCtx;

/// Access tier of a command. Exactly one per command, and the tiers are
/// plain labels with no ordering between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Public,
    Booster,
    Admin,
    Owner,
}

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// A command handler: borrows the invocation context, produces nothing but
/// side effects on it.
pub type Handler = for<'a> fn(&'a CommandCtx<'a>) -> HandlerFuture<'a>;

/// Immutable registration record for one command. Created once by its
/// module's `spec()` and never mutated afterwards.
#[derive(Clone)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub tier: Tier,
    /// Builds the typed registration payload (options, bounds, choices).
    pub build: fn() -> CreateCommand,
    pub run: Handler,
}

impl CommandSpec {
    fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("name is empty".to_string());
        }
        if !self
            .name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(format!("name {:?} is not lowercase alphanumeric", self.name));
        }
        if self.description.is_empty() || self.description.len() > 100 {
            return Err("description must be 1-100 characters".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate command name: {0}")]
    DuplicateName(String),
}

/// Name → descriptor map, built once at startup and read-only afterwards.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandSpec>,
    /// Registration order, for stable listings and payload export.
    names: Vec<String>,
}

impl CommandRegistry {
    /// Build the registry from the per-tier descriptor sources. A
    /// descriptor that fails validation is skipped with a warning so one
    /// bad command cannot take the rest down; a duplicate name is fatal
    /// because silent shadowing would be worse.
    pub fn build() -> Result<Self, RegistryError> {
        let sources = public::specs()
            .into_iter()
            .chain(booster::specs())
            .chain(admin::specs())
            .chain(owner::specs());

        let mut registry = Self::default();
        for spec in sources {
            if let Err(reason) = spec.validate() {
                warn!("skipping invalid command descriptor {:?}: {}", spec.name, reason);
                continue;
            }
            registry.register(spec)?;
        }
        info!("loaded {} commands", registry.count());
        Ok(registry)
    }

    fn register(&mut self, spec: CommandSpec) -> Result<(), RegistryError> {
        if self.commands.contains_key(spec.name) {
            return Err(RegistryError::DuplicateName(spec.name.to_string()));
        }
        self.names.push(spec.name.to_string());
        self.commands.insert(spec.name.to_string(), spec);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.get(name)
    }

    pub fn all(&self) -> impl Iterator<Item = &CommandSpec> {
        self.names.iter().filter_map(|name| self.commands.get(name))
    }

    pub fn by_tier(&self, tier: Tier) -> Vec<&CommandSpec> {
        self.all().filter(|spec| spec.tier == tier).collect()
    }

    /// Commands the gate would let this caller run.
    pub fn accessible_to(&self, caller: &Caller, config: &BotConfig) -> Vec<&CommandSpec> {
        self.all()
            .filter(|spec| access::authorize(spec.tier, caller, config).is_ok())
            .collect()
    }

    /// The slash-command payload registered with the gateway at startup.
    pub fn registration_payload(&self) -> Vec<CreateCommand> {
        self.all().map(|spec| (spec.build)()).collect()
    }

    pub fn count(&self) -> usize {
        self.names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop<'a>(_ctx: &'a CommandCtx<'a>) -> HandlerFuture<'a> {
        Box::pin(async { Ok(()) })
    }

    fn spec(name: &'static str, tier: Tier) -> CommandSpec {
        CommandSpec {
            name,
            description: "test command",
            tier,
            build: || CreateCommand::new("test"),
            run: noop,
        }
    }

    #[test]
    fn duplicate_registration_fails_and_keeps_the_first() {
        let mut registry = CommandRegistry::default();
        registry.register(spec("dupe", Tier::Public)).unwrap();
        let err = registry.register(spec("dupe", Tier::Admin)).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName(name) if name == "dupe"));
        assert_eq!(registry.resolve("dupe").unwrap().tier, Tier::Public);
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn resolve_misses_return_none() {
        let registry = CommandRegistry::default();
        assert!(registry.resolve("ghost").is_none());
    }

    #[test]
    fn invalid_descriptors_fail_validation() {
        assert!(spec("", Tier::Public).validate().is_err());
        assert!(spec("BadName", Tier::Public).validate().is_err());
        let mut long = spec("ok", Tier::Public);
        long.description = "";
        assert!(long.validate().is_err());
        assert!(spec("fine2", Tier::Public).validate().is_ok());
    }

    #[test]
    fn build_loads_the_full_catalog() {
        let registry = CommandRegistry::build().unwrap();
        assert!(registry.resolve("dog").is_some());
        assert!(registry.resolve("amazonprice").is_some());
        assert!(registry.resolve("tracked").is_some());
        assert!(registry.resolve("botstatus").is_some());
        assert_eq!(registry.registration_payload().len(), registry.count());
    }

    #[test]
    fn by_tier_partitions_the_catalog() {
        let registry = CommandRegistry::build().unwrap();
        let total: usize = [Tier::Public, Tier::Booster, Tier::Admin, Tier::Owner]
            .into_iter()
            .map(|tier| registry.by_tier(tier).len())
            .sum();
        assert_eq!(total, registry.count());
    }

    #[test]
    fn accessible_to_matches_the_gate() {
        use serenity::all::{RoleId, UserId};

        let registry = CommandRegistry::build().unwrap();
        let config = BotConfig::for_tests();
        let booster = Caller {
            user_id: UserId::new(1),
            roles: vec![RoleId::new(300)],
        };
        let accessible = registry.accessible_to(&booster, &config);
        assert!(accessible.iter().any(|spec| spec.name == "amazonprice"));
        assert!(accessible.iter().all(|spec| {
            matches!(spec.tier, Tier::Public | Tier::Booster)
        }));
    }
}
