//! Swappable sources for the auto-generated fields: submission id and address.

use crate::error::IdError;
use crate::notice::{Notice, Notifier};
use log::{info, warn};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::io;
use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use std::time::Duration;
use uuid::Uuid;

pub const DEFAULT_UUID_API_URL: &str = "https://www.uuidtools.com/api/generate/v1";
pub const FALLBACK_ID: &str = "fallback_id";
pub const FALLBACK_ADDRESS: &str = "127.0.0.1";

pub trait IdSource {
    fn generate(&self) -> Result<String, IdError>;
}

/// Fetches an id from an HTTP endpoint answering with a JSON array of ids.
#[derive(Debug, Clone)]
pub struct RemoteIdSource {
    client: Client,
    url: String,
}

impl RemoteIdSource {
    pub fn new(url: impl Into<String>) -> Result<Self, IdError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl IdSource for RemoteIdSource {
    fn generate(&self) -> Result<String, IdError> {
        info!("Requesting unique id from {}", self.url);
        let response = self.client.get(&self.url).send()?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(IdError::Status(status));
        }

        let ids: Vec<serde_json::Value> = response.json()?;
        ids.first()
            .and_then(|id| id.as_str())
            .map(str::to_owned)
            .ok_or(IdError::Empty)
    }
}

/// Random v4 UUIDs, no network needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalIdSource;

impl IdSource for LocalIdSource {
    fn generate(&self) -> Result<String, IdError> {
        Ok(Uuid::new_v4().to_string())
    }
}

/// Asks `source` for an id and falls back to [`FALLBACK_ID`] with a warning.
pub fn generate_unique_id(source: &dyn IdSource, notifier: &dyn Notifier) -> String {
    match source.generate() {
        Ok(id) => id,
        Err(IdError::Status(status)) => {
            warn!("Unique id endpoint answered with status {}", status);
            notifier.notify(Notice::warning(
                "Error generating unique ID, fallback to internal ID.",
            ));
            FALLBACK_ID.to_string()
        }
        Err(e) => {
            warn!("Unique id request failed: {}", e);
            notifier.notify(Notice::warning(format!(
                "Error generating unique ID: {}, using fallback.",
                e
            )));
            FALLBACK_ID.to_string()
        }
    }
}

pub trait AddressSource {
    fn address(&self) -> io::Result<IpAddr>;
}

/// Asks `source` for the address to record and falls back to
/// [`FALLBACK_ADDRESS`] with a warning.
pub fn capture_address(source: &dyn AddressSource, notifier: &dyn Notifier) -> String {
    match source.address() {
        Ok(address) => address.to_string(),
        Err(e) => {
            warn!("Could not determine network address: {}", e);
            notifier.notify(Notice::warning(format!(
                "Error capturing IP address: {}, using fallback.",
                e
            )));
            FALLBACK_ADDRESS.to_string()
        }
    }
}

/// Address of the machine's outbound interface. This is the server's own
/// address, not the address of the person submitting the form.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalNetworkAddress;

impl AddressSource for LocalNetworkAddress {
    fn address(&self) -> io::Result<IpAddr> {
        // connect() on UDP sends nothing, it only picks the route
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.connect((Ipv4Addr::new(192, 0, 2, 1), 80))?;
        Ok(socket.local_addr()?.ip())
    }
}

/// An address supplied by the caller, e.g. the peer address of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAddress(pub IpAddr);

impl AddressSource for FixedAddress {
    fn address(&self) -> io::Result<IpAddr> {
        Ok(self.0)
    }
}
