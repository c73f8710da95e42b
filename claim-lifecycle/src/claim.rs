use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Result, SimulatorError};

/// Position of a claim in its lifecycle, always within `1..=7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct ClaimStatus(u8);

impl ClaimStatus {
    /// Status every new claim starts at
    pub const SUBMITTED: ClaimStatus = ClaimStatus(1);
    /// Status at which the claim cost is assigned
    pub const COSTED: ClaimStatus = ClaimStatus(5);
    /// Final status, never advanced past
    pub const TERMINAL: ClaimStatus = ClaimStatus(7);

    /// Const constructor for statuses known to be in range.
    pub(crate) const fn known(value: u8) -> ClaimStatus {
        ClaimStatus(value)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_terminal(self) -> bool {
        self >= Self::TERMINAL
    }

    /// The default successor, or `None` once terminal.
    pub fn next(self) -> Option<ClaimStatus> {
        if self.is_terminal() {
            None
        } else {
            Some(ClaimStatus(self.0 + 1))
        }
    }
}

impl TryFrom<i32> for ClaimStatus {
    type Error = SimulatorError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            1..=7 => Ok(ClaimStatus(value as u8)),
            other => Err(SimulatorError::InvalidStatus(other)),
        }
    }
}

impl From<ClaimStatus> for i32 {
    fn from(status: ClaimStatus) -> Self {
        status.0 as i32
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Intake channel a claim arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    Mobile,
    Web,
    Email,
    Letter,
    #[serde(rename = "Call Center")]
    CallCenter,
    Police,
}

impl Source {
    pub const NON_MOBILE: [Source; 5] = [
        Source::Web,
        Source::Email,
        Source::Letter,
        Source::CallCenter,
        Source::Police,
    ];

    /// The value stored in the `Source` column
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Mobile => "Mobile",
            Source::Web => "Web",
            Source::Email => "Email",
            Source::Letter => "Letter",
            Source::CallCenter => "Call Center",
            Source::Police => "Police",
        }
    }

    pub fn lane(self) -> Lane {
        match self {
            Source::Mobile => Lane::Mobile,
            _ => Lane::NonMobile,
        }
    }
}

impl FromStr for Source {
    type Err = SimulatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Mobile" => Ok(Source::Mobile),
            "Web" => Ok(Source::Web),
            "Email" => Ok(Source::Email),
            "Letter" => Ok(Source::Letter),
            "Call Center" => Ok(Source::CallCenter),
            "Police" => Ok(Source::Police),
            other => Err(SimulatorError::UnknownSource(other.to_string())),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partition of claims used to pick which claim to advance on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    Mobile,
    NonMobile,
}

impl Lane {
    pub fn contains(self, source: Source) -> bool {
        source.lane() == self
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lane::Mobile => f.write_str("mobile"),
            Lane::NonMobile => f.write_str("non-mobile"),
        }
    }
}

/// Customer details copied verbatim onto each generated claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub name: String,
    pub email: String,
    pub address: String,
    pub us_state: String,
    pub license_plate: String,
}

impl CustomerProfile {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        address: impl Into<String>,
        us_state: impl Into<String>,
        license_plate: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            address: address.into(),
            us_state: us_state.into(),
            license_plate: license_plate.into(),
        }
    }
}

/// One row of the `quotes` table.
///
/// Serialized field names match the table's columns, which is also the shape
/// change-data consumers see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "QuoteID")]
    pub quote_id: Uuid,
    #[serde(rename = "ClaimStatus")]
    pub status: ClaimStatus,
    #[serde(rename = "ClaimCost")]
    pub claim_cost: Option<i32>,
    #[serde(rename = "Source")]
    pub source: Source,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "EMail")]
    pub email: String,
    #[serde(rename = "Age")]
    pub age: i32,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "USState")]
    pub us_state: String,
    #[serde(rename = "LicensePlate")]
    pub license_plate: String,
    #[serde(rename = "DescriptionOfDamage")]
    pub description_of_damage: String,
}

impl Claim {
    /// A freshly submitted claim: status 1, no cost yet.
    pub fn submitted(
        quote_id: Uuid,
        source: Source,
        customer: &CustomerProfile,
        age: i32,
        description_of_damage: impl Into<String>,
    ) -> Self {
        Self {
            quote_id,
            status: ClaimStatus::SUBMITTED,
            claim_cost: None,
            source,
            name: customer.name.clone(),
            email: customer.email.clone(),
            age,
            address: customer.address.clone(),
            us_state: customer.us_state.clone(),
            license_plate: customer.license_plate.clone(),
            description_of_damage: description_of_damage.into(),
        }
    }

    pub fn lane(&self) -> Lane {
        self.source.lane()
    }
}

/// A claim picked for advancement, as returned by selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutstandingClaim {
    pub quote_id: Uuid,
    pub status: ClaimStatus,
}
