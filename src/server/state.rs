use crate::config::Config;
use crate::location::DirectBackend;

use super::i18n::LanguageCatalog;

pub struct AppState {
    pub upstream: DirectBackend,
    pub catalog: LanguageCatalog,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            upstream: DirectBackend::new(config.upstream.clone(), config.timeout()),
            catalog: LanguageCatalog::new(config.server.i18n_dir.clone()),
        }
    }
}
