use std::path::PathBuf;

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_CLIENT_DIST_DIR: &str = "client/dist";

pub const PLEDGERS_FILE: &str = "pledgers.json";
pub const DYJ_FILE: &str = "do_your_job_districts.json";

pub const DATASET_CACHE_CONTROL: &str = "public, max-age=3600";

pub fn server_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

fn dir_from_env(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

/// Boundary GeoJSON plus the two datasets.
pub fn data_dir() -> PathBuf {
    dir_from_env("DATA_DIR", DEFAULT_DATA_DIR)
}

/// Built client bundle.
pub fn client_dist_dir() -> PathBuf {
    dir_from_env("CLIENT_DIST_DIR", DEFAULT_CLIENT_DIST_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_falls_back_on_missing_zero_or_garbage() {
        temp_env::with_var_unset("PORT", || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
        temp_env::with_var("PORT", Some("0"), || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
        temp_env::with_var("PORT", Some("eighty"), || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
        temp_env::with_var("PORT", Some(" 8080 "), || {
            assert_eq!(server_port(), 8080);
        });
    }

    #[test]
    fn directories_fall_back_when_blank() {
        temp_env::with_vars(
            [("DATA_DIR", Some("  ")), ("CLIENT_DIST_DIR", None::<&str>)],
            || {
                assert_eq!(data_dir(), PathBuf::from(DEFAULT_DATA_DIR));
                assert_eq!(client_dist_dir(), PathBuf::from(DEFAULT_CLIENT_DIST_DIR));
            },
        );
        temp_env::with_var("DATA_DIR", Some("/srv/pledges"), || {
            assert_eq!(data_dir(), PathBuf::from("/srv/pledges"));
        });
    }
}
