//! Server configuration from command-line arguments and environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::record::AdminCredential;

/// `academia` server arguments. Every flag can also be set through the
/// environment variable named next to it.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "academia",
    about = "Course registration server for administrators, faculty and students",
    version
)]
pub struct Config {
    /// Address to accept client connections on.
    #[arg(long, env = "ACADEMIA_LISTEN", default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,

    /// Directory holding students.dat, faculty.dat and admin.dat.
    #[arg(long, env = "ACADEMIA_DATA_DIR", default_value = ".", value_name = "path")]
    pub data_dir: PathBuf,

    /// Maximum number of concurrent client sessions.
    #[arg(long, env = "ACADEMIA_MAX_CONNECTIONS", default_value_t = 100)]
    pub max_connections: usize,

    /// Admin username written on first start (when admin.dat is empty).
    #[arg(long, env = "ACADEMIA_ADMIN_USERNAME", default_value = "admin")]
    pub admin_username: String,

    /// Admin password written on first start (when admin.dat is empty).
    #[arg(
        long,
        env = "ACADEMIA_ADMIN_PASSWORD",
        default_value = "admin123",
        hide_env_values = true
    )]
    pub admin_password: String,
}

impl Config {
    /// The credential used to seed an empty admin store.
    pub fn default_admin(&self) -> AdminCredential {
        AdminCredential::new(&self.admin_username, &self.admin_password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["academia"]).unwrap();
        assert_eq!(config.listen, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.data_dir, PathBuf::from("."));
        assert_eq!(config.max_connections, 100);
        assert_eq!(
            config.default_admin(),
            AdminCredential::new("admin", "admin123")
        );
    }

    #[test]
    fn test_flags_override() {
        let config = Config::try_parse_from([
            "academia",
            "--listen",
            "0.0.0.0:9000",
            "--data-dir",
            "/var/lib/academia",
            "--max-connections",
            "8",
            "--admin-username",
            "root",
        ])
        .unwrap();
        assert_eq!(config.listen.port(), 9000);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/academia"));
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.default_admin().username, "root");
    }

    #[test]
    fn test_rejects_bad_address() {
        assert!(Config::try_parse_from(["academia", "--listen", "nowhere"]).is_err());
    }
}
