use error_stack::{Report, Result, ResultExt};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroU32;

use super::ParseError;
use crate::util::{figment::FigmentErrorAttachable, Sensitive};

#[derive(Debug, Deserialize)]
pub struct Server {
    pub db: super::Database,
    /// Secret key used to verify session tokens handed out by the
    /// authentication subsystem.
    pub jwt_secret: Sensitive<String>,
    /// How many posts a single listing page holds.
    ///
    /// **Environment variables**:
    /// - `MURMUR_POSTS_PER_PAGE`
    #[serde(default = "Server::default_posts_per_page")]
    pub posts_per_page: NonZeroU32,
    /// Where anonymous visitors are sent when they hit an
    /// author-only page. The login flow itself lives outside of
    /// this application.
    ///
    /// **Environment variables**:
    /// - `MURMUR_LOGIN_URL`
    #[serde(default = "Server::default_login_url")]
    pub login_url: String,
    #[serde(default = "Server::default_ip")]
    pub ip: IpAddr,
    #[serde(default = "Server::default_port")]
    pub port: u16,
}

impl Server {
    pub fn load() -> Result<Self, ParseError> {
        dotenvy::dotenv().ok();

        let config = Self::figment()
            .extract::<Self>()
            .map_err(|e| Report::new(ParseError).attach_figment_error(e))?;

        config.validate()?;

        Ok(config)
    }
}

impl Server {
    const DEFAULT_CONFIG_FILE: &'static str = "murmur.toml";
    const JWT_SECRET_MIN: usize = 12;
    const JWT_SECRET_MAX: usize = 1024;

    /// Creates a default [`figment::Figment`] object to load server
    /// configuration. This function is there for implementing
    /// [`Server::load`] and testing.
    pub(crate) fn figment() -> figment::Figment {
        use figment::{
            providers::{Env, Format, Toml},
            Figment,
        };

        Figment::new()
            .merge(Toml::file(Self::DEFAULT_CONFIG_FILE))
            // One big con about figment (env provider to be specific) especially
            // these fields with underscore in it.
            .merge(Env::prefixed("MURMUR_").map(|v| match v.as_str() {
                "DB_PRIMARY_MIN_IDLE" => "db.primary.min_idle".into(),
                "DB_PRIMARY_POOL_SIZE" => "db.primary.pool_size".into(),

                "DB_REPLICA_MIN_IDLE" => "db.replica.min_idle".into(),
                "DB_REPLICA_POOL_SIZE" => "db.replica.pool_size".into(),

                "DB_ENFORCE_TLS" => "db.enforce_tls".into(),
                "DB_TIMEOUT_SECS" => "db.timeout_secs".into(),

                "JWT_SECRET" => "jwt_secret".into(),
                "LOGIN_URL" => "login_url".into(),
                "POSTS_PER_PAGE" => "posts_per_page".into(),

                _ => v.as_str().replace('_', ".").into(),
            }))
            // Environment variable aliases
            .merge(Env::raw().map(|v| match v.as_str() {
                "DATABASE_URL" => "db.primary.url".into(),
                _ => v.into(),
            }))
    }

    fn validate(&self) -> Result<(), ParseError> {
        let secret_len = self.jwt_secret.as_str().len();
        if !(Self::JWT_SECRET_MIN..=Self::JWT_SECRET_MAX).contains(&secret_len) {
            return Err(Report::new(ParseError)
                .attach_printable("`jwt_secret` must be 12 to 1024 characters long"));
        }

        if !self.login_url.starts_with('/') {
            return Err(Report::new(ParseError)
                .attach_printable("`login_url` must be an absolute path like `/auth/login/`"));
        }

        self.db.validate().change_context(ParseError)?;
        Ok(())
    }

    // Required by serde
    const fn default_posts_per_page() -> NonZeroU32 {
        match NonZeroU32::new(10) {
            Some(n) => n,
            None => panic!("default posts_per_page is accidentally set to 0"),
        }
    }

    fn default_login_url() -> String {
        "/auth/login/".to_string()
    }

    const fn default_ip() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    const fn default_port() -> u16 {
        8080
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use std::num::{NonZeroU32, NonZeroU64};

    #[test]
    fn env_aliases() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://localhost/murmur");

            jail.set_env("MURMUR_DB_PRIMARY_MIN_IDLE", "100");
            jail.set_env("MURMUR_DB_PRIMARY_POOL_SIZE", "100");

            jail.set_env("MURMUR_DB_REPLICA_URL", "postgres://replica/murmur");
            jail.set_env("MURMUR_DB_REPLICA_MIN_IDLE", "589");
            jail.set_env("MURMUR_DB_REPLICA_POOL_SIZE", "589");

            jail.set_env("MURMUR_DB_ENFORCE_TLS", "false");
            jail.set_env("MURMUR_DB_TIMEOUT_SECS", "3030");

            jail.set_env("MURMUR_JWT_SECRET", "somewhat-long-secret");
            jail.set_env("MURMUR_POSTS_PER_PAGE", "25");
            jail.set_env("MURMUR_LOGIN_URL", "/accounts/login/");

            let config: Server = Server::figment().extract()?;
            assert_eq!(config.db.primary.url.as_str(), "postgres://localhost/murmur");
            assert_eq!(
                config.db.primary.min_idle.unwrap(),
                NonZeroU32::new(100).unwrap()
            );
            assert_eq!(config.db.primary.pool_size, NonZeroU32::new(100).unwrap());
            assert_eq!(
                config.db.replica.as_ref().unwrap().min_idle.unwrap(),
                NonZeroU32::new(589).unwrap()
            );
            assert_eq!(
                config.db.replica.as_ref().unwrap().pool_size,
                NonZeroU32::new(589).unwrap()
            );

            assert_eq!(config.db.enforce_tls, false);
            assert_eq!(config.db.timeout_secs, NonZeroU64::new(3030).unwrap());

            assert_eq!(config.jwt_secret.as_str(), "somewhat-long-secret");
            assert_eq!(config.posts_per_page, NonZeroU32::new(25).unwrap());
            assert_eq!(config.login_url, "/accounts/login/");

            Ok(())
        });
    }

    #[test]
    fn defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://localhost/murmur");
            jail.set_env("MURMUR_JWT_SECRET", "somewhat-long-secret");

            let config: Server = Server::figment().extract()?;
            assert_eq!(config.posts_per_page, NonZeroU32::new(10).unwrap());
            assert_eq!(config.login_url, "/auth/login/");
            assert_eq!(config.port, 8080);

            Ok(())
        });
    }

    #[test]
    fn rejects_short_jwt_secret() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://localhost/murmur");
            jail.set_env("MURMUR_JWT_SECRET", "short");

            let config: Server = Server::figment().extract()?;
            assert!(config.validate().is_err());

            Ok(())
        });
    }
}
