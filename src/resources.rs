//! HCB resources and their endpoints
//!
//! Dispatch is a static table keyed by [`Resource`]; every resource maps to
//! an API path segment plus the display metadata for its identifier.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// API version prefix
const API_PREFIX: [&str; 2] = ["api", "v3"];

// ============================================================================
// Resource
// ============================================================================

/// A resource exposed by the HCB API
///
/// Variants are declared in [`RESOURCES`] row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    Activity,
    AchTransfer,
    Card,
    CardCharge,
    Check,
    CheckDeposit,
    Donation,
    HcbFee,
    Invoice,
    Organization,
    ReimbursedExpense,
    Transaction,
    Transfer,
    WireTransfer,
    WiseTransfer,
}

/// Static metadata for one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceInfo {
    pub resource: Resource,
    /// Host-facing tag, e.g. `cardCharge`
    pub tag: &'static str,
    /// Path segment under `/api/v3`
    pub path: &'static str,
    /// Human readable name
    pub display_name: &'static str,
    /// Label for the identifier parameter of `get`
    pub id_display_name: &'static str,
    /// Example identifier
    pub id_placeholder: &'static str,
}

const fn info(
    resource: Resource,
    tag: &'static str,
    path: &'static str,
    display_name: &'static str,
    id_display_name: &'static str,
    id_placeholder: &'static str,
) -> ResourceInfo {
    ResourceInfo {
        resource,
        tag,
        path,
        display_name,
        id_display_name,
        id_placeholder,
    }
}

/// Every resource, in display order and in [`Resource`] declaration order
pub static RESOURCES: [ResourceInfo; 15] = [
    info(Resource::Activity, "activity", "activities", "Activity", "Activity ID", "act_abc123"),
    info(
        Resource::AchTransfer,
        "achTransfer",
        "ach_transfers",
        "ACH Transfer",
        "ACH Transfer ID",
        "ach_abc123",
    ),
    info(Resource::Card, "card", "cards", "Card", "Card ID", "crd_abc123"),
    info(
        Resource::CardCharge,
        "cardCharge",
        "card_charges",
        "Card Charge",
        "Card Charge ID",
        "chg_abc123",
    ),
    info(Resource::Check, "check", "checks", "Check", "Check ID", "chk_abc123"),
    info(
        Resource::CheckDeposit,
        "checkDeposit",
        "check_deposits",
        "Check Deposit",
        "Check Deposit ID",
        "cdp_abc123",
    ),
    info(Resource::Donation, "donation", "donations", "Donation", "Donation ID", "don_abc123"),
    info(Resource::HcbFee, "hcbFee", "hcb_fees", "HCB Fee", "HCB Fee ID", "bfe_abc123"),
    info(Resource::Invoice, "invoice", "invoices", "Invoice", "Invoice ID", "inv_abc123"),
    info(
        Resource::Organization,
        "organization",
        "organizations",
        "Organization",
        "Organization ID or Slug",
        "hackclub",
    ),
    info(
        Resource::ReimbursedExpense,
        "reimbursedExpense",
        "reimbursed_expenses",
        "Reimbursed Expense",
        "Reimbursed Expense ID",
        "rbe_abc123",
    ),
    info(
        Resource::Transaction,
        "transaction",
        "transactions",
        "Transaction",
        "Transaction ID",
        "txn_abc123",
    ),
    info(Resource::Transfer, "transfer", "transfers", "Transfer", "Transfer ID", "xfr_abc123"),
    info(
        Resource::WireTransfer,
        "wireTransfer",
        "wire_transfers",
        "Wire Transfer",
        "Wire Transfer ID",
        "wir_abc123",
    ),
    info(
        Resource::WiseTransfer,
        "wiseTransfer",
        "wise_transfers",
        "Wise Transfer",
        "Wise Transfer ID",
        "wis_abc123",
    ),
];

impl Resource {
    /// Static metadata for this resource
    pub fn info(self) -> &'static ResourceInfo {
        &RESOURCES[self as usize]
    }

    /// Host-facing tag
    pub fn tag(self) -> &'static str {
        self.info().tag
    }

    /// API path segment
    pub fn path(self) -> &'static str {
        self.info().path
    }

    /// Organization and activity listings are top-level; the rest are
    /// nested under an organization.
    pub fn is_org_scoped(self) -> bool {
        !matches!(self, Resource::Organization | Resource::Activity)
    }

    /// Endpoint for listing this resource
    pub fn list_endpoint(self, organization_id: Option<&str>) -> Result<Endpoint> {
        if !self.is_org_scoped() {
            return Ok(Endpoint::api([self.path()]));
        }

        let org = organization_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| Error::missing_parameter("organizationId"))?;
        Ok(Endpoint::api(["organizations", org, self.path()]))
    }

    /// Endpoint for fetching a single object of this resource
    pub fn get_endpoint(self, id: &str) -> Result<Endpoint> {
        if id.trim().is_empty() {
            let name = if self == Resource::Organization {
                "organizationId"
            } else {
                "resourceId"
            };
            return Err(Error::missing_parameter(name));
        }
        Ok(Endpoint::api([self.path(), id]))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Resource {
    type Err = Error;

    /// Accepts the host tag (`cardCharge`) or the API path (`card_charges`)
    fn from_str(s: &str) -> Result<Self> {
        RESOURCES
            .iter()
            .find(|i| i.tag == s || i.path == s)
            .map(|i| i.resource)
            .ok_or_else(|| Error::unknown_resource(s))
    }
}

// ============================================================================
// Operation
// ============================================================================

/// Operation performed on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    /// Fetch one object by identifier
    Get,
    /// List objects
    #[default]
    GetAll,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Get => f.write_str("get"),
            Operation::GetAll => f.write_str("getAll"),
        }
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "get" => Ok(Operation::Get),
            "getAll" | "get_all" | "list" => Ok(Operation::GetAll),
            other => Err(Error::invalid_parameter(
                "operation",
                format!("expected 'get' or 'getAll', got '{other}'"),
            )),
        }
    }
}

// ============================================================================
// Trigger Resource
// ============================================================================

/// Resources the polling trigger can watch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TriggerResource {
    #[default]
    Transaction,
    Donation,
}

impl TriggerResource {
    /// The underlying API resource
    pub fn resource(self) -> Resource {
        match self {
            TriggerResource::Transaction => Resource::Transaction,
            TriggerResource::Donation => Resource::Donation,
        }
    }
}

impl fmt::Display for TriggerResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource().tag())
    }
}

impl FromStr for TriggerResource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.parse::<Resource>() {
            Ok(Resource::Transaction) => Ok(TriggerResource::Transaction),
            Ok(Resource::Donation) => Ok(TriggerResource::Donation),
            _ => Err(Error::invalid_parameter(
                "resource",
                format!("trigger supports 'transaction' or 'donation', got '{s}'"),
            )),
        }
    }
}

// ============================================================================
// Endpoint
// ============================================================================

/// A path on the API host, stored as unencoded segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    segments: Vec<String>,
}

impl Endpoint {
    /// Build an endpoint under `/api/v3`
    pub fn api<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments = API_PREFIX
            .iter()
            .map(|s| (*s).to_string())
            .chain(segments.into_iter().map(Into::into))
            .collect();
        Self { segments }
    }

    /// Resolve against a base URL, percent-encoding each segment
    pub fn url(&self, base_url: &str) -> Result<Url> {
        let mut url = Url::parse(base_url)?;
        url.path_segments_mut()
            .map_err(|()| Error::config(format!("Base URL cannot have a path: {base_url}")))?
            .pop_if_empty()
            .extend(&self.segments);
        Ok(url)
    }

    /// Unencoded path, for logging
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
