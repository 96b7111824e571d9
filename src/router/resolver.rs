// Route resolver
// This file resolves an ordered asset pair to a configured route: direct,
// reversed, native/wrapped alias normalized, or a two-hop bridge through the
// category's bridge asset
//
// Numan Thabit 2025 Nov

use crate::assets::{AssetId, AssetRegistry};
use crate::errors::RouterError;
use crate::metrics::ROUTE_RESOLUTIONS;
use crate::router::routes::{PairKey, RouteDescriptor, VenueKind, WrapStep};
use crate::router::store::RouterState;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A single venue hop with its parameters oriented in the swap direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedHop {
    /// Asset the caller provides for this hop.
    pub asset_in: AssetId,
    /// Asset the caller receives from this hop.
    pub asset_out: AssetId,
    /// Asset actually delivered to the venue (differs after alias normalization).
    pub venue_asset_in: AssetId,
    /// Asset actually produced by the venue.
    pub venue_asset_out: AssetId,
    pub route: RouteDescriptor,
    /// Key under which the route is stored.
    pub stored_key: PairKey,
    pub reversed: bool,
    pub pre_step: Option<WrapStep>,
    pub post_step: Option<WrapStep>,
}

impl ResolvedHop {
    pub fn venue_kind(&self) -> VenueKind {
        self.route.venue_kind()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Resolution {
    Single(ResolvedHop),
    Bridge {
        bridge: AssetId,
        first: ResolvedHop,
        second: ResolvedHop,
    },
}

fn lookup(
    state: &RouterState,
    asset_in: AssetId,
    asset_out: AssetId,
) -> Option<(RouteDescriptor, PairKey, bool)> {
    if let Some(route) = state.route(asset_in, asset_out) {
        return Some((route.clone(), PairKey::new(asset_in, asset_out), false));
    }
    let stored = state.route(asset_out, asset_in)?;
    let params = stored.params.reversed()?;
    Some((
        RouteDescriptor {
            params,
            ..stored.clone()
        },
        PairKey::new(asset_out, asset_in),
        true,
    ))
}

fn wrap_step(from: AssetId, to: AssetId) -> Option<WrapStep> {
    if from == to {
        None
    } else if from.is_native() {
        Some(WrapStep::Wrap)
    } else {
        Some(WrapStep::Unwrap)
    }
}

/// Resolve without bridging: direct key, reversed key, then alias variants.
pub fn resolve_single(
    state: &RouterState,
    assets: &AssetRegistry,
    asset_in: AssetId,
    asset_out: AssetId,
) -> Option<ResolvedHop> {
    let hop = |venue_in: AssetId, venue_out: AssetId| {
        lookup(state, venue_in, venue_out).map(|(route, stored_key, reversed)| ResolvedHop {
            asset_in,
            asset_out,
            venue_asset_in: venue_in,
            venue_asset_out: venue_out,
            route,
            stored_key,
            reversed,
            pre_step: wrap_step(asset_in, venue_in),
            post_step: wrap_step(venue_out, asset_out),
        })
    };

    if let Some(found) = hop(asset_in, asset_out) {
        return Some(found);
    }

    let ins = std::iter::once(asset_in).chain(assets.alias(asset_in));
    let outs: Vec<AssetId> = std::iter::once(asset_out)
        .chain(assets.alias(asset_out))
        .collect();
    for venue_in in ins {
        for venue_out in &outs {
            let venue_out = *venue_out;
            if (venue_in, venue_out) == (asset_in, asset_out) || venue_in == venue_out {
                continue;
            }
            if let Some(found) = hop(venue_in, venue_out) {
                debug!(
                    %asset_in, %asset_out, %venue_in, %venue_out,
                    "resolved through native alias"
                );
                return Some(found);
            }
        }
    }
    None
}

/// Full resolution including the two-hop bridge fallback.
pub fn resolve(
    state: &RouterState,
    assets: &AssetRegistry,
    asset_in: AssetId,
    asset_out: AssetId,
) -> Result<Resolution, RouterError> {
    let result = resolve_inner(state, assets, asset_in, asset_out);
    let outcome = match &result {
        Ok(Resolution::Single(_)) => "single",
        Ok(Resolution::Bridge { .. }) => "bridge",
        Err(RouterError::CrossCategorySwap { .. }) => "cross_category",
        Err(_) => "not_found",
    };
    ROUTE_RESOLUTIONS.with_label_values(&[outcome]).inc();
    result
}

fn resolve_inner(
    state: &RouterState,
    assets: &AssetRegistry,
    asset_in: AssetId,
    asset_out: AssetId,
) -> Result<Resolution, RouterError> {
    if asset_in == asset_out {
        return Err(RouterError::SameAsset(asset_in));
    }
    if let Some(hop) = resolve_single(state, assets, asset_in, asset_out) {
        return Ok(Resolution::Single(hop));
    }

    let not_found = || RouterError::NoRouteFound {
        asset_in,
        asset_out,
    };
    let (from, to) = match (assets.category(asset_in), assets.category(asset_out)) {
        (Some(from), Some(to)) => (from, to),
        _ => return Err(not_found()),
    };
    if from != to {
        return Err(RouterError::CrossCategorySwap { from, to });
    }
    let bridge = assets.bridge_for(from).ok_or_else(not_found)?;
    let touches_bridge = |a: AssetId| a == bridge || assets.alias(a) == Some(bridge);
    if touches_bridge(asset_in) || touches_bridge(asset_out) {
        return Err(not_found());
    }

    let first = resolve_single(state, assets, asset_in, bridge).ok_or_else(not_found)?;
    let second = resolve_single(state, assets, bridge, asset_out).ok_or_else(not_found)?;
    if first.venue_kind() == VenueKind::MultiStepChain
        || second.venue_kind() == VenueKind::MultiStepChain
    {
        return Err(not_found());
    }
    debug!(%asset_in, %asset_out, %bridge, "resolved through bridge asset");
    Ok(Resolution::Bridge {
        bridge,
        first,
        second,
    })
}
