//! IBM Event Notifications
//!
//! Push subscriptions bill a single meter per destination. Instances bill
//! four meters. Both support the `lite` and `standard` plans.

use super::CostResource;
use crate::binding::{bind, UsageBinding, UsageBound};
use crate::pricing::{resolve_meters, Meter, TierContext};
use meterwise_common::{CostComponent, Plan, Usage, UsageData, UsageSchemaEntry};

pub const VENDOR: &str = "ibm";
pub const SERVICE: &str = "event-notifications";

pub const PUSH_USAGE_KEY: &str = "event-notifications_OUTBOUND_DIGITAL_MESSAGES_PUSH";
pub const INGESTED_EVENTS_USAGE_KEY: &str = "event-notifications_INBOUND_INGESTED_EVENTS";
pub const EMAILS_USAGE_KEY: &str = "event-notifications_OUTBOUND_DIGITAL_MESSAGES_EMAILS";
pub const WEBHOOKS_USAGE_KEY: &str = "event-notifications_OUTBOUND_DIGITAL_MESSAGES_HTTP";

/// Lite allotments
pub const PUSH_FREE_CAP: i64 = 1_000;
pub const INGESTED_EVENTS_FREE_CAP: i64 = 10_000;
pub const EMAILS_FREE_CAP: i64 = 20_000;
pub const WEBHOOKS_FREE_CAP: i64 = 5_000;

const fn push_meter(name: &'static str) -> Meter {
    Meter {
        name,
        unit: "Messages",
        catalog_unit: "OUTBOUND_DIGITAL_MESSAGES_PUSH",
        free_cap: PUSH_FREE_CAP,
        cap_scope: "per destination",
    }
}

pub const FIREFOX_PUSH: Meter = push_meter("Outbound Firefox Push Messages");
pub const CHROME_PUSH: Meter = push_meter("Outbound Chrome Push Messages");
pub const SAFARI_PUSH: Meter = push_meter("Outbound Safari Push Messages");
pub const INSTANCE_PUSH: Meter = push_meter("Outbound Push Messages");

pub const INGESTED_EVENTS: Meter = Meter {
    name: "Ingested Events",
    unit: "Events",
    catalog_unit: "INBOUND_INGESTED_EVENTS",
    free_cap: INGESTED_EVENTS_FREE_CAP,
    cap_scope: "per month",
};

pub const OUTBOUND_EMAILS: Meter = Meter {
    name: "Outbound Emails",
    unit: "Emails",
    catalog_unit: "OUTBOUND_DIGITAL_MESSAGES_EMAILS",
    free_cap: EMAILS_FREE_CAP,
    cap_scope: "per month",
};

pub const OUTBOUND_WEBHOOKS: Meter = Meter {
    name: "Outbound Webhook Calls",
    unit: "Calls",
    catalog_unit: "OUTBOUND_DIGITAL_MESSAGES_HTTP",
    free_cap: WEBHOOKS_FREE_CAP,
    cap_scope: "per month",
};

/// Browser a push subscription delivers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushDestination {
    Firefox,
    Chrome,
    Safari,
}

impl PushDestination {
    pub const ALL: [PushDestination; 3] = [
        PushDestination::Firefox,
        PushDestination::Chrome,
        PushDestination::Safari,
    ];

    pub fn resource_type(&self) -> &'static str {
        match self {
            PushDestination::Firefox => "ibm_en_subscription_firefox",
            PushDestination::Chrome => "ibm_en_subscription_chrome",
            PushDestination::Safari => "ibm_en_subscription_safari",
        }
    }

    pub fn from_resource_type(resource_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|destination| destination.resource_type() == resource_type)
    }

    pub fn meter(&self) -> &'static Meter {
        match self {
            PushDestination::Firefox => &FIREFOX_PUSH,
            PushDestination::Chrome => &CHROME_PUSH,
            PushDestination::Safari => &SAFARI_PUSH,
        }
    }
}

/// Push subscription for one browser destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnSubscriptionPush {
    pub address: String,
    pub region: String,
    pub plan: Plan,
    pub destination: PushDestination,
    pub outbound_push_messages: Usage,
}

impl EnSubscriptionPush {
    pub fn new(
        address: impl Into<String>,
        region: impl Into<String>,
        plan: impl Into<Plan>,
        destination: PushDestination,
    ) -> Self {
        Self {
            address: address.into(),
            region: region.into(),
            plan: plan.into(),
            destination,
            outbound_push_messages: Usage::Unknown,
        }
    }
}

static PUSH_BINDINGS: &[UsageBinding<EnSubscriptionPush>] = &[UsageBinding {
    key: PUSH_USAGE_KEY,
    meter: |r| r.destination.meter(),
    get: |r| r.outbound_push_messages,
    set: |r, v| r.outbound_push_messages = v,
}];

impl UsageBound for EnSubscriptionPush {
    fn usage_bindings() -> &'static [UsageBinding<Self>] {
        PUSH_BINDINGS
    }
}

impl CostResource for EnSubscriptionPush {
    fn address(&self) -> &str {
        &self.address
    }

    fn resource_type(&self) -> &'static str {
        self.destination.resource_type()
    }

    fn schema(&self) -> Vec<UsageSchemaEntry> {
        Self::usage_schema()
    }

    fn populate_usage(&mut self, usage: &UsageData) {
        bind(self, usage);
    }

    fn cost_components(&self) -> Vec<CostComponent> {
        let ctx = TierContext {
            vendor: VENDOR,
            service: SERVICE,
            region: &self.region,
            plan: &self.plan,
        };
        resolve_meters(&ctx, &self.metered_usage())
    }
}

/// Event Notifications service instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnInstance {
    pub address: String,
    pub region: String,
    pub plan: Plan,
    pub ingested_events: Usage,
    pub outbound_push_messages: Usage,
    pub outbound_emails: Usage,
    pub outbound_webhooks: Usage,
}

impl EnInstance {
    pub const RESOURCE_TYPE: &'static str = "ibm_en_instance";

    pub fn new(address: impl Into<String>, region: impl Into<String>, plan: impl Into<Plan>) -> Self {
        Self {
            address: address.into(),
            region: region.into(),
            plan: plan.into(),
            ingested_events: Usage::Unknown,
            outbound_push_messages: Usage::Unknown,
            outbound_emails: Usage::Unknown,
            outbound_webhooks: Usage::Unknown,
        }
    }
}

static INSTANCE_BINDINGS: &[UsageBinding<EnInstance>] = &[
    UsageBinding {
        key: INGESTED_EVENTS_USAGE_KEY,
        meter: |_| &INGESTED_EVENTS,
        get: |r| r.ingested_events,
        set: |r, v| r.ingested_events = v,
    },
    UsageBinding {
        key: PUSH_USAGE_KEY,
        meter: |_| &INSTANCE_PUSH,
        get: |r| r.outbound_push_messages,
        set: |r, v| r.outbound_push_messages = v,
    },
    UsageBinding {
        key: EMAILS_USAGE_KEY,
        meter: |_| &OUTBOUND_EMAILS,
        get: |r| r.outbound_emails,
        set: |r, v| r.outbound_emails = v,
    },
    UsageBinding {
        key: WEBHOOKS_USAGE_KEY,
        meter: |_| &OUTBOUND_WEBHOOKS,
        get: |r| r.outbound_webhooks,
        set: |r, v| r.outbound_webhooks = v,
    },
];

impl UsageBound for EnInstance {
    fn usage_bindings() -> &'static [UsageBinding<Self>] {
        INSTANCE_BINDINGS
    }
}

impl CostResource for EnInstance {
    fn address(&self) -> &str {
        &self.address
    }

    fn resource_type(&self) -> &'static str {
        Self::RESOURCE_TYPE
    }

    fn schema(&self) -> Vec<UsageSchemaEntry> {
        Self::usage_schema()
    }

    fn populate_usage(&mut self, usage: &UsageData) {
        bind(self, usage);
    }

    fn cost_components(&self) -> Vec<CostComponent> {
        let ctx = TierContext {
            vendor: VENDOR,
            service: SERVICE,
            region: &self.region,
            plan: &self.plan,
        };
        resolve_meters(&ctx, &self.metered_usage())
    }
}
