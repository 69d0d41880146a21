//! Client/server version compatibility.

/// Server version this client was generated against.
pub const COMPATIBLE_SERVER_VERSION: &str = "2.0.0";

/// Outcome of comparing client and server `major.minor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionCheck {
    Compatible,
    /// Some client features may not be implemented by the server.
    ClientNewer { client: String, server: String },
    ClientOlder { client: String, server: String },
    /// The server version could not be read or parsed.
    Unknown { server: Option<String> },
}

/// Compare `major.minor` of two version strings, ignoring any `-suffix`.
pub fn compare_versions(client: &str, server: &str) -> VersionCheck {
    let (Some(client_mm), Some(server_mm)) = (major_minor(client), major_minor(server)) else {
        return VersionCheck::Unknown {
            server: Some(server.to_string()),
        };
    };
    let client = release(client).to_string();
    let server = release(server).to_string();
    match client_mm.cmp(&server_mm) {
        std::cmp::Ordering::Equal => VersionCheck::Compatible,
        std::cmp::Ordering::Greater => VersionCheck::ClientNewer { client, server },
        std::cmp::Ordering::Less => VersionCheck::ClientOlder { client, server },
    }
}

/// Log the outcome. Never fails.
pub(crate) fn report(check: &VersionCheck) {
    match check {
        VersionCheck::Compatible => {}
        VersionCheck::ClientNewer { client, server } => tracing::warn!(
            client = %client,
            server = %server,
            "Client version is higher than server version; some client features may not be implemented in the server"
        ),
        VersionCheck::ClientOlder { client, server } => tracing::info!(
            client = %client,
            server = %server,
            "Client version is lower than server version"
        ),
        VersionCheck::Unknown { server } => tracing::warn!(
            server = server.as_deref().unwrap_or("unavailable"),
            "Could not determine server version"
        ),
    }
}

fn release(version: &str) -> &str {
    version.trim().split('-').next().unwrap_or_default()
}

fn major_minor(version: &str) -> Option<(u64, u64)> {
    let mut parts = release(version).split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next().unwrap_or("0").parse().ok()?;
    Some((major, minor))
}
