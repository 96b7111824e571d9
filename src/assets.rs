// Asset identity and classification
// This file defines asset ids, the native-asset sentinel, asset categories and
// the registry that maps assets to decimals, categories and bridge assets
//
// Numan Thabit 2025 Nov

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque fungible asset identifier (token contract address).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub Address);

impl AssetId {
    /// Sentinel used for the chain-native asset.
    pub const NATIVE: AssetId = AssetId(address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE"));

    pub fn is_native(&self) -> bool {
        *self == Self::NATIVE
    }

    pub fn address(&self) -> Address {
        self.0
    }
}

impl From<Address> for AssetId {
    fn from(value: Address) -> Self {
        Self(value)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_native() {
            write!(f, "native")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    Stable,
    NativeDerivative,
    WrappedBitcoin,
    Volatile,
}

impl AssetCategory {
    /// Default fallback slippage tier in basis points.
    pub fn default_slippage_bps(&self) -> u32 {
        match self {
            AssetCategory::Stable => 50,
            AssetCategory::NativeDerivative => 50,
            AssetCategory::WrappedBitcoin => 100,
            AssetCategory::Volatile => 300,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    pub decimals: u8,
    pub category: AssetCategory,
}

/// Static asset metadata: decimals, categories, native alias and bridge table.
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    wrapped_native: AssetId,
    assets: HashMap<AssetId, AssetInfo>,
    bridges: HashMap<AssetCategory, AssetId>,
}

pub const DEFAULT_DECIMALS: u8 = 18;

impl AssetRegistry {
    pub fn new(wrapped_native: AssetId) -> Self {
        let mut assets = HashMap::new();
        assets.insert(
            wrapped_native,
            AssetInfo {
                decimals: 18,
                category: AssetCategory::NativeDerivative,
            },
        );
        Self {
            wrapped_native,
            assets,
            bridges: HashMap::new(),
        }
    }

    pub fn with_asset(mut self, asset: AssetId, info: AssetInfo) -> Self {
        self.assets.insert(asset, info);
        self
    }

    pub fn with_bridge(mut self, category: AssetCategory, bridge: AssetId) -> Self {
        self.bridges.insert(category, bridge);
        self
    }

    pub fn wrapped_native(&self) -> AssetId {
        self.wrapped_native
    }

    /// The other representation of the native asset, if `asset` is one of them.
    pub fn alias(&self, asset: AssetId) -> Option<AssetId> {
        if asset.is_native() {
            Some(self.wrapped_native)
        } else if asset == self.wrapped_native {
            Some(AssetId::NATIVE)
        } else {
            None
        }
    }

    pub fn decimals(&self, asset: AssetId) -> u8 {
        if asset.is_native() {
            return 18;
        }
        self.assets
            .get(&asset)
            .map(|info| info.decimals)
            .unwrap_or(DEFAULT_DECIMALS)
    }

    /// Category of an asset; the native asset shares its wrapped form's category.
    pub fn category(&self, asset: AssetId) -> Option<AssetCategory> {
        let key = if asset.is_native() {
            self.wrapped_native
        } else {
            asset
        };
        self.assets.get(&key).map(|info| info.category)
    }

    pub fn bridge_for(&self, category: AssetCategory) -> Option<AssetId> {
        self.bridges.get(&category).copied()
    }
}
