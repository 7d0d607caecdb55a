//! Hosted zone cleanup
//!
//! After a smoke run the test's hosted zone still holds what external-dns
//! wrote for the ingress: one alias A record and one heritage TXT record,
//! next to the SOA and NS records every zone has. Route53 refuses to delete
//! a zone that still holds records, so [`ZoneManager::cleanup_zone`] removes
//! those two first.
//!
//! Each Route53 call is preceded by a fixed pause; back-to-back calls from
//! the suite trip Route53 throttling. The pause is not a retry.
//!
//! The emptiness check only counts records. Any record beyond SOA/NS makes
//! the zone "non-empty", and cleanup then assumes it is exactly the
//! external-dns pair.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::config::DnsConfig;
use crate::delay::{Delay, TokioDelay};
use crate::ingress::IngressHelper;
use crate::kubectl::KubectlError;
use crate::records::{RecordSet, RecordSummary};
use crate::route53::{DnsApi, DnsError, HostedZone};

/// Records every hosted zone has (SOA + NS)
pub const BASELINE_RECORD_COUNT: usize = 2;

/// Error type for zone operations
#[derive(Debug, thiserror::Error)]
pub enum ZoneError {
    #[error(transparent)]
    Dns(#[from] DnsError),

    #[error(transparent)]
    Kubectl(#[from] KubectlError),
}

/// Route53 cleanup for one test suite
#[derive(Clone)]
pub struct ZoneManager {
    dns: Arc<dyn DnsApi>,
    ingresses: IngressHelper,
    settings: DnsConfig,
    delay: Arc<dyn Delay>,
    throttle: Duration,
}

impl ZoneManager {
    /// Manager pausing one second before each Route53 call
    pub fn new(dns: Arc<dyn DnsApi>, ingresses: IngressHelper, settings: DnsConfig) -> Self {
        Self {
            dns,
            ingresses,
            settings,
            delay: Arc::new(TokioDelay),
            throttle: Duration::from_secs(1),
        }
    }

    /// Set the delay used for throttling
    #[must_use]
    pub fn delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    /// Set the pause before each Route53 call
    #[must_use]
    pub fn throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    async fn pause(&self) {
        self.delay.sleep(self.throttle).await;
    }

    /// Delete the alias A record external-dns created for an ingress
    ///
    /// The alias target is rebuilt from the ingress's current load balancer
    /// hostname, so the ingress must still exist.
    #[instrument(skip(self))]
    pub async fn delete_a_record(
        &self,
        zone_id: &str,
        zone_name: &str,
        domain_name: &str,
        namespace: &str,
        ingress_name: &str,
    ) -> Result<(), ZoneError> {
        self.pause().await;

        let endpoint = self
            .ingresses
            .get_ingress_endpoint(namespace, ingress_name)
            .await?;
        let record =
            RecordSet::elb_alias(domain_name, &self.settings.alias_hosted_zone_id, &endpoint);

        info!(endpoint = %endpoint, "Deleting A record {}", domain_name);
        self.dns.delete_record(zone_id, record).await?;
        Ok(())
    }

    /// Delete the heritage TXT record external-dns created for an ingress
    #[instrument(skip(self))]
    pub async fn delete_txt_record(
        &self,
        zone_id: &str,
        zone_name: &str,
        domain_name: &str,
        namespace: &str,
    ) -> Result<(), ZoneError> {
        self.pause().await;

        let record = RecordSet::heritage_txt(
            domain_name,
            namespace,
            &self.settings.txt_owner,
            self.settings.txt_ttl,
        );

        info!("Deleting TXT record {}", record.name());
        self.dns.delete_record(zone_id, record).await?;
        Ok(())
    }

    /// Delete the zone, first removing the external-dns records if present
    ///
    /// Order: A record, TXT record, zone. The first failure stops the
    /// sequence and whatever is left stays in Route53.
    #[instrument(skip(self, zone), fields(zone_id = %zone.id, zone_name = %zone.name))]
    pub async fn cleanup_zone(
        &self,
        zone: &HostedZone,
        domain: &str,
        namespace: &str,
        ingress_name: &str,
    ) -> Result<(), ZoneError> {
        if self.is_zone_empty(&zone.id).await? {
            debug!("Zone is empty");
        } else {
            self.delete_a_record(&zone.id, &zone.name, domain, namespace, ingress_name)
                .await?;
            self.delete_txt_record(&zone.id, &zone.name, domain, namespace)
                .await?;
        }

        self.delete_zone(&zone.id).await
    }

    /// True when the zone holds nothing beyond SOA and NS
    pub async fn is_zone_empty(&self, zone_id: &str) -> Result<bool, ZoneError> {
        self.pause().await;

        let records = self.get_zone_records(zone_id).await?;
        Ok(records.len() <= BASELINE_RECORD_COUNT)
    }

    /// Every record in the zone (no throttle)
    pub async fn get_zone_records(&self, zone_id: &str) -> Result<Vec<RecordSummary>, ZoneError> {
        Ok(self.dns.list_records(zone_id).await?)
    }

    /// Delete the hosted zone
    #[instrument(skip(self))]
    pub async fn delete_zone(&self, zone_id: &str) -> Result<(), ZoneError> {
        self.pause().await;

        info!("Deleting hosted zone {}", zone_id);
        self.dns.delete_zone(zone_id).await?;
        Ok(())
    }
}
