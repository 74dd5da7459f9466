use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Payment rails supported by Payo
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Method {
    /// Bitcoin over Lightning
    BtcLn,
    /// On-chain Bitcoin
    Btc,
    /// USDC on Base
    UsdcBase,
}

impl Method {
    pub const ALL: [Method; 3] = [Method::BtcLn, Method::Btc, Method::UsdcBase];

    pub fn as_str(self) -> &'static str {
        match self {
            Method::BtcLn => "BTC_LN",
            Method::Btc => "BTC",
            Method::UsdcBase => "USDC_BASE",
        }
    }

    /// Asset ticker settled by this method.
    pub fn asset(self) -> &'static str {
        match self {
            Method::BtcLn | Method::Btc => "BTC",
            Method::UsdcBase => "USDC",
        }
    }

    /// Chain name as reported on invoices.
    pub fn chain(self) -> &'static str {
        match self {
            Method::BtcLn | Method::Btc => "bitcoin",
            Method::UsdcBase => "base",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMethod(s.to_owned()))
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown payment method: {0}")]
pub struct UnknownMethod(pub String);
