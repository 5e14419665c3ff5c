use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LEVEL: &str = "info";
const MODULE_LEVEL_PREFIX: &str = "LOG_LEVEL_";

/// Logging options read from the environment.
///
/// - `LOG_LEVEL`: default level for everything (`info` when unset)
/// - `LOG_LEVEL_<MODULE>`: level for one crate, e.g. `LOG_LEVEL_STORAGE=debug`
///   becomes the directive `dynamo_storage=debug`
/// - `RUN_ENV=prod`: JSON output instead of compact console lines
///
/// `RUST_LOG`, when set, overrides the levels entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    pub module_levels: Vec<(String, String)>,
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_string(),
            module_levels: Vec::new(),
            json: false,
        }
    }
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars_os().filter_map(|(name, value)| {
            Some((name.into_string().ok()?, value.into_string().ok()?))
        }))
    }

    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut settings = Self::default();
        for (name, value) in vars {
            let value = value.trim().to_lowercase();
            if value.is_empty() {
                continue;
            }
            if name == "LOG_LEVEL" {
                settings.level = value;
            } else if let Some(module) = name.strip_prefix(MODULE_LEVEL_PREFIX) {
                if !module.is_empty() {
                    settings
                        .module_levels
                        .push((format!("dynamo_{}", module.to_lowercase()), value));
                }
            } else if name == "RUN_ENV" {
                settings.json = matches!(value.as_str(), "prod" | "production");
            }
        }
        settings.module_levels.sort();
        settings
    }

    /// `EnvFilter` directives, e.g. `info,dynamo_storage=debug`.
    pub fn directives(&self) -> String {
        std::iter::once(self.level.clone())
            .chain(
                self.module_levels
                    .iter()
                    .map(|(module, level)| format!("{}={}", module, level)),
            )
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Install the global tracing subscriber.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_telemetry(settings: &LogSettings) -> Result<(), Box<dyn std::error::Error>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(settings.directives())?,
    };

    let json_layer = settings
        .json
        .then(|| tracing_subscriber::fmt::layer().json().with_current_span(true));
    let console_layer = (!settings.json).then(|| tracing_subscriber::fmt::layer().compact());

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(console_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(
            directives = %settings.directives(),
            json = settings.json,
            "Logging initialized"
        );
    } else {
        tracing::debug!("Tracing subscriber already installed");
    }
    Ok(())
}
