pub mod tracked;

use super::CommandSpec;

pub fn specs() -> Vec<CommandSpec> {
    vec![tracked::spec()]
}
