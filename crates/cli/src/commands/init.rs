//! Print the default configuration.

use strata_config::ComposerConfig;

pub fn run() {
    print!("{}", ComposerConfig::default_toml());
}
