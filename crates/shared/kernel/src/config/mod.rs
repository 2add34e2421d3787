use campus_domain::config::ApiConfig;
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment prefix of configuration overrides (`CAMPUS__SERVER__PORT=8080`).
pub const ENV_PREFIX: &str = "CAMPUS";
/// Legacy variables naming the website record and the published shops.
pub const WEBSITE_ENV: &str = "TRYTON_GALATEA_SITE";
pub const SHOPS_ENV: &str = "TRYTON_SALE_SHOPS";

#[campus_derive::campus_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Invalid config value{}: {message}", format_context(.context))]
    Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Layered configuration: a base file (default `server`, any extension supported by
/// the `config` crate) overlaid by `CAMPUS__*` environment variables, `__` separating
/// nested keys.
///
/// # Errors
/// Missing file, malformed environment values or a shape that does not fit `T`.
///
/// ```rust
/// use campus_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let config = builder(path)
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

/// [`load_config`] for [`ApiConfig`], also honoring `TRYTON_GALATEA_SITE` (website id)
/// and `TRYTON_SALE_SHOPS` (comma separated shop ids).
///
/// # Errors
/// See [`load_config`]; [`ConfigError::Invalid`] for unparsable legacy variables.
pub fn load_api_config(path: Option<impl AsRef<Path>>) -> Result<ApiConfig, ConfigError> {
    let website = std::env::var(WEBSITE_ENV).ok();
    let shops = std::env::var(SHOPS_ENV).ok();

    let mut builder = builder(path);
    if let Some(raw) = website {
        builder = builder.set_override("website.id", parse_id(&raw, WEBSITE_ENV)?).context(WEBSITE_ENV)?;
    }
    if let Some(raw) = shops {
        let ids = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| parse_id(s, SHOPS_ENV))
            .collect::<Result<Vec<_>, _>>()?;
        builder = builder.set_override("website.shops", ids).context(SHOPS_ENV)?;
    }

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<ApiConfig>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

fn builder(path: Option<impl AsRef<Path>>) -> ConfigBuilder<DefaultState> {
    let effective_path = path.map_or_else(|| PathBuf::from("server"), |p| p.as_ref().to_path_buf());
    info!("Loading config from {}", effective_path.display());

    Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("i18n.languages")
                .with_list_parse_key("website.shops")
                .with_list_parse_key("catalog.filter_fields")
                .try_parsing(true),
        )
}

fn parse_id(raw: &str, variable: &'static str) -> Result<i64, ConfigError> {
    raw.trim().parse::<i64>().map_err(|e| ConfigError::Invalid {
        message: format!("'{raw}': {e}").into(),
        context: Some(variable.into()),
    })
}
