//! API endpoint implementations.

use crate::error::{Error, Result};

mod audits;
mod auth;
mod contractors;
mod incidents;
mod stations;
mod usage;
mod users;
mod work_permits;

pub use audits::{AuditsApi, ListAuditsQuery};
pub use auth::AuthApi;
pub use contractors::ContractorsApi;
pub use incidents::{IncidentsApi, ListIncidentsQuery};
pub use stations::StationsApi;
pub use usage::UsageApi;
pub use users::UsersApi;
pub use work_permits::WorkPermitsApi;

/// Default page size for paged list endpoints.
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Path to one record under `collection`, with `id` encoded as a single
/// path segment.
pub(crate) fn record_path(collection: &str, id: &str) -> Result<String> {
    if id.is_empty() || id == "." || id == ".." {
        return Err(Error::generic(format!("Invalid record id '{}'", id)));
    }
    Ok(format!("{}/{}", collection, urlencoding::encode(id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_record_path_encodes_id() {
        assert_eq!(record_path("/api/audits", "a-1").unwrap(), "/api/audits/a-1");
        assert_eq!(
            record_path("/api/stations", "../users").unwrap(),
            "/api/stations/..%2Fusers"
        );
        assert_eq!(
            record_path("/api/incidents", "i1?x=1").unwrap(),
            "/api/incidents/i1%3Fx%3D1"
        );
    }

    #[test]
    fn test_record_path_rejects_dot_segments() {
        for id in ["", ".", ".."] {
            let err = record_path("/api/stations", id).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Generic);
        }
    }
}
