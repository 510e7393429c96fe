use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroUsize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Http {
    /// **Environment variables**:
    /// - `FEEDBACK_HTTP_IP`
    pub ip: IpAddr,
    /// **Environment variables**:
    /// - `FEEDBACK_HTTP_PORT`
    pub port: u16,
    /// Amount of HTTP workers. Defaults to the available
    /// parallelism of the machine.
    ///
    /// **Environment variables**:
    /// - `FEEDBACK_HTTP_WORKERS`
    pub workers: NonZeroUsize,
}

impl Default for Http {
    fn default() -> Self {
        Self {
            ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 5000,
            workers: std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN),
        }
    }
}
