pub mod amazonprice;
pub mod boosterperks;
pub mod imageperm;

use super::CommandSpec;

pub fn specs() -> Vec<CommandSpec> {
    vec![
        amazonprice::spec(),
        boosterperks::spec(),
        imageperm::spec(),
    ]
}
