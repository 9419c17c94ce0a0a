//! Directory records: what the employee directory sends back.
//!
//! The directory answers `GET /api/1.0/employees/?rfid_tag=...` with a
//! paginated list:
//!
//! ```json
//! {
//!   "count": 1,
//!   "results": [
//!     { "id": 12, "rfid_tag": "023af76c", "employee_type": [1], "employee_status": [2] }
//!   ]
//! }
//! ```
//!
//! Unknown fields are ignored so the server can grow its schema without
//! breaking kiosks in the field.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::PayloadError;

// ---------------------------------------------------------------------------
// Employee
// ---------------------------------------------------------------------------

/// One employee record from the directory.
///
/// `id`, `rfid_tag` and `employee_type` are required. A record missing any
/// of them fails to decode, which the client reports as a protocol failure.
///
/// Role and status codes are sets: the directory may list a code more than
/// once and order carries no meaning. `BTreeSet` keeps them sorted, which
/// makes log output and test assertions stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// The directory's primary key for this employee.
    pub id: i64,

    /// The card identifier bound to this employee (e.g. `"023af76c"`).
    pub rfid_tag: String,

    /// Role codes. These drive screen selection on the kiosk.
    pub employee_type: BTreeSet<u32>,

    /// Status codes. The directory sends these as `employee_status` and
    /// older servers omit them entirely.
    #[serde(rename = "employee_status", default)]
    pub status: BTreeSet<u32>,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,
}

impl Employee {
    /// Returns `true` if the employee holds the given role code.
    pub fn has_role(&self, role: u32) -> bool {
        self.employee_type.contains(&role)
    }

    /// "First Last", falling back to whichever half is present.
    pub fn display_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(name), None) | (None, Some(name)) => Some(name.clone()),
            (None, None) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// DirectoryResponse
// ---------------------------------------------------------------------------

/// A decoded and sanity-checked directory payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryResponse {
    /// Total number of records matching the query.
    pub count: u64,

    /// The records on this page. Never longer than `count`.
    pub results: Vec<Employee>,
}

impl DirectoryResponse {
    /// Decodes a payload and checks that `results` agrees with `count`.
    ///
    /// The check is deliberately loose: the directory paginates, so a large
    /// `count` with a short page is fine. What is not fine is more results
    /// than `count`, or a non-zero `count` with an empty page; either means
    /// the server is confused and its answer cannot be trusted.
    ///
    /// # Errors
    /// - [`PayloadError::Malformed`] for bad JSON or missing fields.
    /// - [`PayloadError::Inconsistent`] when `results` and `count` disagree.
    pub fn from_json(body: &[u8]) -> Result<Self, PayloadError> {
        let response: Self = serde_json::from_slice(body).map_err(PayloadError::Malformed)?;
        response.check()?;
        Ok(response)
    }

    fn check(&self) -> Result<(), PayloadError> {
        let results = self.results.len();
        let too_many = (results as u64) > self.count;
        let missing = self.count > 0 && results == 0;
        if too_many || missing {
            return Err(PayloadError::Inconsistent {
                count: self.count,
                results,
            });
        }
        Ok(())
    }
}
