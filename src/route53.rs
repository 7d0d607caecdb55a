//! Route53 access
//!
//! The zone manager only needs three calls: delete a record set, list the
//! records of a zone, delete a zone. [`DnsApi`] captures exactly those so
//! tests can substitute a mock, and [`Route53Api`] implements them with the
//! AWS SDK.

use async_trait::async_trait;
use aws_sdk_route53::config::Region;
use aws_sdk_route53::error::DisplayErrorContext;
use aws_sdk_route53::types::{
    AliasTarget as SdkAliasTarget, Change, ChangeAction, ChangeBatch, ResourceRecord,
    ResourceRecordSet, RrType,
};
use aws_sdk_route53::Client;
use tracing::{debug, instrument};

#[cfg(test)]
use mockall::automock;

use crate::config::DnsConfig;
use crate::records::{RecordSet, RecordSummary};

/// Error type for Route53 operations
#[derive(Debug, thiserror::Error)]
pub enum DnsError {
    #[error("Invalid Route53 request: {0}")]
    Build(String),

    #[error("Route53 {operation} failed: {message}")]
    Api {
        operation: &'static str,
        message: String,
    },
}

impl From<aws_sdk_route53::error::BuildError> for DnsError {
    fn from(err: aws_sdk_route53::error::BuildError) -> Self {
        Self::Build(err.to_string())
    }
}

/// A Route53 hosted zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZone {
    /// Zone id, with or without the `/hostedzone/` prefix (the SDK strips it)
    pub id: String,
    /// Zone name (e.g. `smoke.example.com.`)
    pub name: String,
}

impl HostedZone {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Route53 operations used by the zone manager
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DnsApi: Send + Sync {
    /// Delete a record set; it must match the stored one exactly
    async fn delete_record(&self, zone_id: &str, record: RecordSet) -> Result<(), DnsError>;

    /// List every record set in a zone
    async fn list_records(&self, zone_id: &str) -> Result<Vec<RecordSummary>, DnsError>;

    /// Delete a hosted zone
    async fn delete_zone(&self, zone_id: &str) -> Result<(), DnsError>;
}

/// [`DnsApi`] backed by the AWS SDK
#[derive(Debug, Clone)]
pub struct Route53Api {
    client: Client,
}

impl Route53Api {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Client from the shared AWS config chain, with optional region override
    pub async fn from_config(dns: &DnsConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(ref region) = dns.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let shared = loader.load().await;
        Self::new(Client::new(&shared))
    }
}

#[async_trait]
impl DnsApi for Route53Api {
    #[instrument(skip(self, record), fields(name = %record.name(), record_type = record.record_type()))]
    async fn delete_record(&self, zone_id: &str, record: RecordSet) -> Result<(), DnsError> {
        let change = Change::builder()
            .action(ChangeAction::Delete)
            .resource_record_set(to_sdk_record_set(&record)?)
            .build()?;
        let batch = ChangeBatch::builder().changes(change).build()?;

        self.client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| DnsError::Api {
                operation: "ChangeResourceRecordSets",
                message: DisplayErrorContext(&e).to_string(),
            })?;

        debug!("Record deletion submitted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_records(&self, zone_id: &str) -> Result<Vec<RecordSummary>, DnsError> {
        let mut records = Vec::new();
        let mut start_name: Option<String> = None;
        let mut start_type: Option<RrType> = None;
        let mut start_identifier: Option<String> = None;

        loop {
            let page = self
                .client
                .list_resource_record_sets()
                .hosted_zone_id(zone_id)
                .set_start_record_name(start_name.take())
                .set_start_record_type(start_type.take())
                .set_start_record_identifier(start_identifier.take())
                .send()
                .await
                .map_err(|e| DnsError::Api {
                    operation: "ListResourceRecordSets",
                    message: DisplayErrorContext(&e).to_string(),
                })?;

            records.extend(
                page.resource_record_sets()
                    .iter()
                    .map(|r| RecordSummary::new(r.name(), r.r#type().as_str())),
            );

            if !page.is_truncated() {
                break;
            }

            start_name = page.next_record_name().map(str::to_string);
            start_type = page.next_record_type().cloned();
            start_identifier = page.next_record_identifier().map(str::to_string);
        }

        debug!(count = records.len(), "Listed zone records");
        Ok(records)
    }

    #[instrument(skip(self))]
    async fn delete_zone(&self, zone_id: &str) -> Result<(), DnsError> {
        self.client
            .delete_hosted_zone()
            .id(zone_id)
            .send()
            .await
            .map_err(|e| DnsError::Api {
                operation: "DeleteHostedZone",
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }
}

/// Convert a record set into its SDK shape
fn to_sdk_record_set(record: &RecordSet) -> Result<ResourceRecordSet, DnsError> {
    let built = match record {
        RecordSet::Alias { name, target } => ResourceRecordSet::builder()
            .name(name)
            .r#type(RrType::A)
            .alias_target(
                SdkAliasTarget::builder()
                    .hosted_zone_id(&target.hosted_zone_id)
                    .dns_name(&target.dns_name)
                    .evaluate_target_health(target.evaluate_target_health)
                    .build()?,
            )
            .build()?,
        RecordSet::Txt { name, ttl, values } => {
            let resource_records = values
                .iter()
                .map(|v| ResourceRecord::builder().value(v).build())
                .collect::<Result<Vec<_>, _>>()?;

            ResourceRecordSet::builder()
                .name(name)
                .r#type(RrType::Txt)
                .ttl(*ttl)
                .set_resource_records(Some(resource_records))
                .build()?
        }
    };

    Ok(built)
}
