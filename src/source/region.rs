//! Object storage regions

use std::fmt;
use std::str::FromStr;

/// Every region identifier the object storage client knows about
const KNOWN_REGIONS: &[&str] = &[
    "af-south-1",
    "ap-east-1",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ap-south-1",
    "ap-south-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-southeast-3",
    "ap-southeast-4",
    "aws-cn-global",
    "aws-global",
    "aws-iso-b-global",
    "aws-iso-global",
    "aws-us-gov-global",
    "ca-central-1",
    "ca-west-1",
    "cn-north-1",
    "cn-northwest-1",
    "eu-central-1",
    "eu-central-2",
    "eu-north-1",
    "eu-south-1",
    "eu-south-2",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "il-central-1",
    "me-central-1",
    "me-south-1",
    "sa-east-1",
    "us-east-1",
    "us-east-2",
    "us-gov-east-1",
    "us-gov-west-1",
    "us-iso-east-1",
    "us-iso-west-1",
    "us-isob-east-1",
    "us-west-1",
    "us-west-2",
];

/// A validated region identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region(&'static str);

impl Region {
    /// Region used when a source does not declare one
    pub const US_WEST_2: Region = Region("us-west-2");

    pub fn id(&self) -> &'static str {
        self.0
    }

    /// All known regions
    pub fn all() -> impl Iterator<Item = Region> {
        KNOWN_REGIONS.iter().copied().map(Region)
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::US_WEST_2
    }
}

impl FromStr for Region {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KNOWN_REGIONS
            .iter()
            .copied()
            .find(|id| *id == s)
            .map(Region)
            .ok_or(())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
