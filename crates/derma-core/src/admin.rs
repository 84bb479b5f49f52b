use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Read-only debug resources exposed under `/admin/debug/{resource}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminResource {
    Info,
    Users,
    Products,
    Carts,
    Tables,
}

impl AdminResource {
    pub const ALL: [AdminResource; 5] = [
        AdminResource::Info,
        AdminResource::Users,
        AdminResource::Products,
        AdminResource::Carts,
        AdminResource::Tables,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Users => "users",
            Self::Products => "products",
            Self::Carts => "carts",
            Self::Tables => "tables",
        }
    }
}

impl fmt::Display for AdminResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminResource {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        AdminResource::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or(ValidationError::AdminResource(s))
    }
}
