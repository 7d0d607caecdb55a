//! Ingress DNS smoke helpers
//!
//! Helpers for end-to-end smoke tests of Kubernetes ingresses published to
//! AWS Route53 by external-dns. Create an ingress from a fixture, read the
//! load balancer it gets, and tear down the DNS records and hosted zone
//! afterwards.
//!
//! Kubernetes is driven through `kubectl`; Route53 through the AWS SDK.
//!
//! # Example
//!
//! ```no_run
//! use ingress_dns_smoke::{telemetry, Harness, HostedZone, SmokeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     telemetry::init_logging();
//!     let harness = Harness::new(SmokeConfig::new()).await;
//!
//!     harness
//!         .ingresses()
//!         .create_ingress("smoke", "web", "fixtures/ingress.yaml")
//!         .await?;
//!     let endpoint = harness.ingresses().get_ingress_endpoint("smoke", "web").await?;
//!     println!("Load balancer: {endpoint}");
//!
//!     let zone = HostedZone::new("/hostedzone/Z0SMOKE", "smoke.example.com.");
//!     harness
//!         .zones()
//!         .cleanup_zone(&zone, "web.smoke.example.com", "smoke", "web")
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod delay;
pub mod eventually;
pub mod harness;
pub mod ingress;
pub mod kubectl;
pub mod records;
pub mod route53;
pub mod telemetry;
pub mod template;
pub mod wait;
pub mod zone;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{DnsConfig, KubectlConfig, SmokeConfig};
pub use delay::{Delay, TokioDelay};
pub use harness::Harness;
pub use ingress::{IngressError, IngressHelper};
pub use kubectl::{CommandOutput, CommandRunner, Kubectl, KubectlError, SystemRunner};
pub use records::{heritage_value, AliasTarget, RecordSet, RecordSummary};
pub use route53::{DnsApi, DnsError, HostedZone, Route53Api};
pub use template::{TemplateBinding, TemplateError};
pub use wait::WaitError;
pub use zone::{ZoneError, ZoneManager};
