//! Shared handler state, injected as an axum `Extension`.

use crate::{
    gateway::GatewayNotifier, hours::OperationalHours, identity::IdentityClient,
    logbook::Logbook, throttle::Throttle,
};

pub struct PortalState {
    pub hours: OperationalHours,
    pub throttle: Throttle,
    pub identity: IdentityClient,
    pub logbook: Logbook,
    pub gateway: GatewayNotifier,
}
