// src/types.rs
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// GPU platform the miner executable is launched for
///
/// Selects the platform flag appended to the common miner arguments and
/// the default worker name used in pool logins.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpuPlatform {
    /// NVIDIA cards through CUDA
    #[default]
    #[clap(name = "cuda")]
    Cuda,

    /// AMD (or any OpenCL) cards
    #[clap(name = "opencl")]
    #[serde(alias = "amd")]
    OpenCl,
}

impl GpuPlatform {
    /// Miner flag that selects this platform
    pub fn flag(self) -> &'static str {
        match self {
            GpuPlatform::Cuda => "-U",
            GpuPlatform::OpenCl => "-G",
        }
    }

    /// Worker name used when the configuration does not set one
    pub fn default_worker(self) -> &'static str {
        match self {
            GpuPlatform::Cuda => "miner0",
            GpuPlatform::OpenCl => "miner1",
        }
    }
}

impl fmt::Display for GpuPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuPlatform::Cuda => write!(f, "cuda"),
            GpuPlatform::OpenCl => write!(f, "opencl"),
        }
    }
}

impl FromStr for GpuPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cuda" | "nvidia" => Ok(GpuPlatform::Cuda),
            "opencl" | "amd" => Ok(GpuPlatform::OpenCl),
            _ => Err(format!("Unknown GPU platform: {}", s)),
        }
    }
}

/// One coin as reported by the ranking feed
///
/// Created per fetch cycle and discarded after selection.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCoin {
    /// Coin identifier as keyed in the feed (e.g. "Ethereum")
    pub id: String,
    /// Algorithm tag reported for the coin (e.g. "Ethash")
    pub algorithm: String,
    /// Raw reported revenue, never negative
    pub btc_revenue: f64,
}

impl RankedCoin {
    /// Convenience constructor
    pub fn new(id: impl Into<String>, algorithm: impl Into<String>, btc_revenue: f64) -> Self {
        RankedCoin {
            id: id.into(),
            algorithm: algorithm.into(),
            btc_revenue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_flags_and_workers() {
        assert_eq!(GpuPlatform::Cuda.flag(), "-U");
        assert_eq!(GpuPlatform::OpenCl.flag(), "-G");
        assert_eq!(GpuPlatform::Cuda.default_worker(), "miner0");
        assert_eq!(GpuPlatform::OpenCl.default_worker(), "miner1");
    }

    #[test]
    fn platform_parses_aliases() {
        assert_eq!("AMD".parse::<GpuPlatform>().unwrap(), GpuPlatform::OpenCl);
        assert_eq!("nvidia".parse::<GpuPlatform>().unwrap(), GpuPlatform::Cuda);
        assert!("metal".parse::<GpuPlatform>().is_err());
        assert_eq!(GpuPlatform::OpenCl.to_string(), "opencl");
    }
}
