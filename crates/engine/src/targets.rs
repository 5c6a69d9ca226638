//! Target resolution for warming sends.
//!
//! Candidates come from three sources: active warming pairs (the
//! counterpart's live bound phone identity), the operator's warming
//! contacts, and the cross-operator pool. Counterparts without a live
//! session are silently excluded; an empty result means "skip this schedule
//! this cycle", never an error.

use std::collections::HashSet;
use std::time::Duration;

use serde::Serialize;
use warmline_core::types::DbId;
use warmline_db::repositories::{
    InstanceRepo, WarmingContactRepo, WarmingPairRepo, WarmingPoolRepo,
};
use warmline_db::DbPool;
use warmline_gateway::MessageGateway;

use crate::EngineResult;

/// Which source produced a candidate target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSource {
    Pair,
    Contact,
    Pool,
}

/// One candidate recipient for a warming send.
#[derive(Debug, Clone, Serialize)]
pub struct WarmingTarget {
    pub phone: String,
    pub display_name: Option<String>,
    pub source: TargetSource,
}

/// Connectivity probe that treats gateway errors and timeouts as "not
/// connected". Warming simply has fewer candidates that cycle.
pub(crate) async fn is_connected_quietly(
    gateway: &dyn MessageGateway,
    timeout: Duration,
    instance_id: DbId,
) -> bool {
    match tokio::time::timeout(timeout, gateway.is_connected(instance_id)).await {
        Ok(Ok(connected)) => connected,
        Ok(Err(e)) => {
            tracing::info!(instance_id, error = %e, "Connectivity check failed");
            false
        }
        Err(_) => {
            tracing::info!(instance_id, "Connectivity check timed out");
            false
        }
    }
}

/// Identity lookup with the same quiet failure semantics.
async fn bound_identity_quietly(
    gateway: &dyn MessageGateway,
    timeout: Duration,
    instance_id: DbId,
) -> Option<String> {
    match tokio::time::timeout(timeout, gateway.bound_phone_identity(instance_id)).await {
        Ok(Ok(phone)) => phone,
        Ok(Err(e)) => {
            tracing::info!(instance_id, error = %e, "Identity lookup failed");
            None
        }
        Err(_) => {
            tracing::info!(instance_id, "Identity lookup timed out");
            None
        }
    }
}

/// Resolve the de-duplicated candidate set for one instance.
///
/// Order is pairs, then contacts, then pool; the first occurrence of a
/// phone wins, so a contact that is also a pair counterpart keeps its
/// `Pair` source.
pub async fn resolve_targets(
    pool: &DbPool,
    gateway: &dyn MessageGateway,
    gateway_timeout: Duration,
    instance_id: DbId,
    operator_id: DbId,
) -> EngineResult<Vec<WarmingTarget>> {
    let mut targets: Vec<WarmingTarget> = Vec::new();

    // 1. Active pairs whose counterpart holds a live session.
    for pair in WarmingPairRepo::list_active_for_instance(pool, instance_id).await? {
        let counterpart_id = pair.counterpart_of(instance_id);
        if !is_connected_quietly(gateway, gateway_timeout, counterpart_id).await {
            continue;
        }
        let Some(phone) = bound_identity_quietly(gateway, gateway_timeout, counterpart_id).await
        else {
            continue;
        };
        let display_name = InstanceRepo::find_by_id(pool, counterpart_id)
            .await?
            .map(|i| i.label);
        targets.push(WarmingTarget {
            phone,
            display_name,
            source: TargetSource::Pair,
        });
    }

    // 2. Operator-supplied warming contacts, always eligible while active.
    for contact in WarmingContactRepo::list_active_for_operator(pool, operator_id).await? {
        targets.push(WarmingTarget {
            phone: contact.phone,
            display_name: contact.display_name,
            source: TargetSource::Contact,
        });
    }

    // 3. Pool counterparts one hop away, restricted to connected instances.
    if let Some(entry) = WarmingPoolRepo::find_active_entry_by_instance(pool, instance_id).await? {
        for counterpart in WarmingPoolRepo::counterpart_entries(pool, entry.id).await? {
            if !is_connected_quietly(gateway, gateway_timeout, counterpart.instance_id).await {
                continue;
            }
            targets.push(WarmingTarget {
                phone: counterpart.phone,
                display_name: None,
                source: TargetSource::Pool,
            });
        }
    }

    // De-duplicate by phone, keeping first occurrence.
    let mut seen = HashSet::new();
    targets.retain(|t| seen.insert(t.phone.clone()));

    Ok(targets)
}
