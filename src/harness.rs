//! Entry point wiring kubectl, Route53 and the zone manager together
//!
//! # Example
//!
//! ```no_run
//! use ingress_dns_smoke::{Harness, HostedZone, SmokeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let harness = Harness::new(SmokeConfig::new()).await;
//!
//!     harness
//!         .ingresses()
//!         .create_ingress("smoke", "web", "fixtures/ingress.yaml")
//!         .await?;
//!
//!     // ... exercise DNS ...
//!
//!     let zone = HostedZone::new("/hostedzone/Z0SMOKE", "smoke.example.com.");
//!     harness
//!         .zones()
//!         .cleanup_zone(&zone, "web.smoke.example.com", "smoke", "web")
//!         .await?;
//!     harness.ingresses().delete_ingress("smoke", "web").await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use tracing::info;

use crate::config::SmokeConfig;
use crate::delay::{Delay, TokioDelay};
use crate::ingress::IngressHelper;
use crate::kubectl::{CommandRunner, Kubectl, SystemRunner};
use crate::route53::{DnsApi, Route53Api};
use crate::zone::ZoneManager;

/// Ingress and zone helpers built from one [`SmokeConfig`]
#[derive(Clone)]
pub struct Harness {
    ingresses: IngressHelper,
    zones: ZoneManager,
}

impl Harness {
    /// Harness using real `kubectl` and the shared AWS config chain
    pub async fn new(config: SmokeConfig) -> Self {
        let dns = Route53Api::from_config(&config.dns).await;
        info!(
            region = config.dns.region.as_deref().unwrap_or("default"),
            "Route53 client ready"
        );
        Self::from_parts(
            config,
            Arc::new(SystemRunner),
            Arc::new(dns),
            Arc::new(TokioDelay),
        )
    }

    /// Harness over arbitrary process, DNS and delay implementations
    pub fn from_parts(
        config: SmokeConfig,
        runner: Arc<dyn CommandRunner>,
        dns: Arc<dyn DnsApi>,
        delay: Arc<dyn Delay>,
    ) -> Self {
        let kubectl = Kubectl::with_runner(config.kubectl.clone(), runner)
            .delay(delay.clone())
            .poll_interval(config.poll_interval);
        let ingresses = IngressHelper::new(kubectl).timeout(config.ingress_timeout);
        let zones = ZoneManager::new(dns, ingresses.clone(), config.dns.clone())
            .delay(delay)
            .throttle(config.throttle);

        Self { ingresses, zones }
    }

    pub fn ingresses(&self) -> &IngressHelper {
        &self.ingresses
    }

    pub fn zones(&self) -> &ZoneManager {
        &self.zones
    }

    pub fn kubectl(&self) -> &Kubectl {
        self.ingresses.kubectl()
    }
}
