pub mod botstatus;

use super::CommandSpec;

pub fn specs() -> Vec<CommandSpec> {
    vec![botstatus::spec()]
}
