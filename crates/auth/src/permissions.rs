use serde::{Deserialize, Serialize};

/// Operation class guarded by a role check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Submit IN / OUT / RETURN requests.
    SubmitRequest,
    /// Read stock cards, aggregates, forecasts and history.
    ViewReports,
    /// Approve or reject pending requests, and see every requester's queue entries.
    ManageRequests,
    /// Add master items.
    ManageCatalog,
    /// Wipe a brand's catalog, queue and ledger.
    ResetTenant,
}

impl Permission {
    pub const ALL: &'static [Permission] = &[
        Permission::SubmitRequest,
        Permission::ViewReports,
        Permission::ManageRequests,
        Permission::ManageCatalog,
        Permission::ResetTenant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::SubmitRequest => "inventory.request.submit",
            Permission::ViewReports => "inventory.reports.view",
            Permission::ManageRequests => "inventory.request.manage",
            Permission::ManageCatalog => "inventory.catalog.manage",
            Permission::ResetTenant => "inventory.tenant.reset",
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
