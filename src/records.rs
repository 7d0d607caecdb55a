//! Record sets written by external-dns
//!
//! For every ingress hostname external-dns creates two records: an alias A
//! record pointing at the load balancer, and a TXT "heritage" record that
//! claims ownership. Route53 only deletes a record set when the request
//! matches it exactly, so both are rebuilt here byte for byte.

/// Prefix external-dns puts in front of the heritage TXT record name
pub const TXT_RECORD_PREFIX: &str = "_external_dns.";

/// Alias target of an A record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTarget {
    pub hosted_zone_id: String,
    pub dns_name: String,
    pub evaluate_target_health: bool,
}

/// A record set as sent to Route53
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSet {
    /// Alias `A` record
    Alias { name: String, target: AliasTarget },
    /// `TXT` record with literal (already quoted) values
    Txt {
        name: String,
        ttl: i64,
        values: Vec<String>,
    },
}

impl RecordSet {
    /// Alias A record for `domain_name` pointing at a load balancer
    ///
    /// The endpoint is made fully qualified with a trailing dot.
    pub fn elb_alias(
        domain_name: impl Into<String>,
        alias_hosted_zone_id: impl Into<String>,
        endpoint: &str,
    ) -> Self {
        Self::Alias {
            name: domain_name.into(),
            target: AliasTarget {
                hosted_zone_id: alias_hosted_zone_id.into(),
                dns_name: format!("{endpoint}."),
                evaluate_target_health: true,
            },
        }
    }

    /// Heritage TXT record external-dns writes for an ingress
    pub fn heritage_txt(domain_name: &str, namespace: &str, owner: &str, ttl: i64) -> Self {
        Self::Txt {
            name: format!("{TXT_RECORD_PREFIX}{domain_name}"),
            ttl,
            values: vec![heritage_value(owner, namespace, domain_name)],
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Alias { name, .. } | Self::Txt { name, .. } => name,
        }
    }

    /// Route53 record type
    pub fn record_type(&self) -> &'static str {
        match self {
            Self::Alias { .. } => "A",
            Self::Txt { .. } => "TXT",
        }
    }
}

/// Heritage TXT value, surrounding quotes included
pub fn heritage_value(owner: &str, namespace: &str, domain_name: &str) -> String {
    format!(
        "\"heritage=external-dns,external-dns/owner={owner},external-dns/resource=ingress/{namespace}/{domain_name}\""
    )
}

/// Name and type of a record found in a zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSummary {
    pub name: String,
    pub record_type: String,
}

impl RecordSummary {
    pub fn new(name: impl Into<String>, record_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
        }
    }
}
