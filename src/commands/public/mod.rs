pub mod checkbooster;
pub mod dog;
pub mod joke;
pub mod listofcommands;
pub mod opensource;
pub mod randomword;
pub mod swcard;
pub mod urban;
pub mod weather;

use super::CommandSpec;

pub fn specs() -> Vec<CommandSpec> {
    vec![
        dog::spec(),
        joke::spec(),
        urban::spec(),
        randomword::spec(),
        weather::spec(),
        swcard::spec(),
        opensource::spec(),
        checkbooster::spec(),
        listofcommands::spec(),
    ]
}
