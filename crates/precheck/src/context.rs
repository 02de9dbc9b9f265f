//! Validation context
//!
//! Per-call state handed to every validator: the dependency resolver, an
//! item bag for adapters to pass request data through, the active group,
//! the message catalog and the clock used by `future_date`.

use crate::custom::FaultPolicy;
use crate::resolver::{DependencyResolver, ServiceMap};
use chrono::{DateTime, Utc};
use precheck_core::MessageCatalog;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct ValidationContext {
    resolver: Arc<dyn DependencyResolver>,
    items: HashMap<String, serde_json::Value>,
    active_group: Option<String>,
    catalog: Option<Arc<dyn MessageCatalog>>,
    clock: Option<DateTime<Utc>>,
    fault_policy: FaultPolicy,
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self {
            resolver: Arc::new(ServiceMap::new()),
            items: HashMap::new(),
            active_group: None,
            catalog: None,
            clock: None,
            fault_policy: FaultPolicy::default(),
        }
    }
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn DependencyResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_services(self, services: ServiceMap) -> Self {
        self.with_resolver(Arc::new(services))
    }

    /// Run only ungrouped constraints plus those tagged with `group`
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.active_group = Some(group.into());
        self
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn MessageCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Fix the instant `future_date` compares against
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.clock = Some(now);
        self
    }

    pub fn with_fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.fault_policy = policy;
        self
    }

    pub fn with_item(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.items.insert(key.into(), value);
        self
    }

    pub fn insert_item(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.items.insert(key.into(), value);
    }

    pub fn item(&self, key: &str) -> Option<&serde_json::Value> {
        self.items.get(key)
    }

    pub fn items(&self) -> &HashMap<String, serde_json::Value> {
        &self.items
    }

    pub fn resolver(&self) -> &dyn DependencyResolver {
        self.resolver.as_ref()
    }

    pub fn active_group(&self) -> Option<&str> {
        self.active_group.as_deref()
    }

    pub fn catalog(&self) -> Option<&dyn MessageCatalog> {
        self.catalog.as_deref()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.unwrap_or_else(Utc::now)
    }

    pub fn fault_policy(&self) -> FaultPolicy {
        self.fault_policy
    }
}

impl fmt::Debug for ValidationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationContext")
            .field("items", &self.items)
            .field("active_group", &self.active_group)
            .field("catalog", &self.catalog.is_some())
            .field("clock", &self.clock)
            .field("fault_policy", &self.fault_policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_builder_sets_fields() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let ctx = ValidationContext::new()
            .with_group("Creation")
            .with_item("request_id", serde_json::json!("abc"))
            .with_fault_policy(FaultPolicy::Report)
            .at(now);

        assert_eq!(ctx.active_group(), Some("Creation"));
        assert_eq!(ctx.item("request_id"), Some(&serde_json::json!("abc")));
        assert_eq!(ctx.fault_policy(), FaultPolicy::Report);
        assert_eq!(ctx.now(), now);
        assert!(ctx.catalog().is_none());
    }

    #[test]
    fn test_defaults() {
        let ctx = ValidationContext::default();
        assert_eq!(ctx.active_group(), None);
        assert_eq!(ctx.fault_policy(), FaultPolicy::Absorb);
        assert!(ctx.resolver().get::<String>().is_none());
    }
}
