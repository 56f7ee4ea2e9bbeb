// ABOUTME: The fixed set of gYS API resources that gysd snapshots and replays.
// ABOUTME: Maps each resource to its REST path and marks which ones restore replays.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A remote gYS resource. Four of the five are record collections; `company`
/// is a single profile object and is captured but never replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Products,
    Clients,
    Sales,
    Categories,
    Company,
}

impl Resource {
    /// Every tracked resource, in collection order.
    pub const ALL: [Resource; 5] = [
        Resource::Products,
        Resource::Clients,
        Resource::Sales,
        Resource::Categories,
        Resource::Company,
    ];

    /// The resources whose records restore re-creates through the API.
    pub const REPLAYABLE: [Resource; 4] = [
        Resource::Products,
        Resource::Clients,
        Resource::Sales,
        Resource::Categories,
    ];

    /// The REST path for this resource, relative to the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Products => "/api/products",
            Resource::Clients => "/api/clients",
            Resource::Sales => "/api/sales",
            Resource::Categories => "/api/categories",
            Resource::Company => "/api/company",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Products => "products",
            Resource::Clients => "clients",
            Resource::Sales => "sales",
            Resource::Categories => "categories",
            Resource::Company => "company",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
