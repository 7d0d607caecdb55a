//! Configuration types for the smoke helpers
//!
//! Build them programmatically - no config files needed.
//!
//! # Example
//!
//! ```
//! use ingress_dns_smoke::config::{DnsConfig, KubectlConfig, SmokeConfig};
//! use std::time::Duration;
//!
//! let config = SmokeConfig::new()
//!     .kubectl(KubectlConfig::new().context("smoke-cluster"))
//!     .dns(DnsConfig::new().region("eu-west-2"))
//!     .throttle(Duration::from_secs(1));
//! ```

use std::time::Duration;

/// Default ELB alias hosted zone (eu-west-2)
pub const DEFAULT_ALIAS_HOSTED_ZONE_ID: &str = "ZD4D7Y8KGAS4G";

/// Owner id external-dns writes into its heritage records when unset
pub const DEFAULT_TXT_OWNER: &str = "default";

/// TTL external-dns uses for its heritage TXT records
pub const DEFAULT_TXT_TTL: i64 = 300;

/// How `kubectl` is invoked
#[derive(Debug, Clone)]
pub struct KubectlConfig {
    /// Binary name or path
    pub binary: String,

    /// Kubeconfig path (`--kubeconfig`)
    pub kubeconfig: Option<String>,

    /// Kubectl context (`--context`)
    pub context: Option<String>,
}

impl KubectlConfig {
    /// Plain `kubectl` from `PATH` with the current context
    pub fn new() -> Self {
        Self {
            binary: "kubectl".to_string(),
            kubeconfig: None,
            context: None,
        }
    }

    /// Set the kubectl binary
    pub fn binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Set kubeconfig path
    pub fn kubeconfig(mut self, path: impl Into<String>) -> Self {
        self.kubeconfig = Some(path.into());
        self
    }

    /// Set kubectl context
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Global flags prepended to every kubectl invocation
    pub fn global_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(ref path) = self.kubeconfig {
            args.push("--kubeconfig".to_string());
            args.push(path.clone());
        }
        if let Some(ref context) = self.context {
            args.push("--context".to_string());
            args.push(context.clone());
        }
        args
    }
}

impl Default for KubectlConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Route53 and external-dns settings
#[derive(Debug, Clone)]
pub struct DnsConfig {
    /// AWS region override; falls back to the shared AWS config chain
    pub region: Option<String>,

    /// Hosted zone id of the load balancer alias target
    pub alias_hosted_zone_id: String,

    /// external-dns `--txt-owner-id`
    pub txt_owner: String,

    /// TTL of the heritage TXT record
    pub txt_ttl: i64,
}

impl DnsConfig {
    pub fn new() -> Self {
        Self {
            region: None,
            alias_hosted_zone_id: DEFAULT_ALIAS_HOSTED_ZONE_ID.to_string(),
            txt_owner: DEFAULT_TXT_OWNER.to_string(),
            txt_ttl: DEFAULT_TXT_TTL,
        }
    }

    /// Set AWS region
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the ELB alias hosted zone (differs per region)
    pub fn alias_hosted_zone_id(mut self, id: impl Into<String>) -> Self {
        self.alias_hosted_zone_id = id.into();
        self
    }

    /// Set external-dns owner id
    pub fn txt_owner(mut self, owner: impl Into<String>) -> Self {
        self.txt_owner = owner.into();
        self
    }

    /// Set heritage TXT TTL
    pub fn txt_ttl(mut self, ttl: i64) -> Self {
        self.txt_ttl = ttl;
        self
    }
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Full smoke test configuration
#[derive(Debug, Clone)]
pub struct SmokeConfig {
    /// Kubectl invocation
    pub kubectl: KubectlConfig,

    /// Route53 settings
    pub dns: DnsConfig,

    /// Pause before every Route53 call (rate limit workaround)
    pub throttle: Duration,

    /// How long `create_ingress` waits for the object to appear
    pub ingress_timeout: Duration,

    /// Interval between existence polls
    pub poll_interval: Duration,
}

impl SmokeConfig {
    pub fn new() -> Self {
        Self {
            kubectl: KubectlConfig::new(),
            dns: DnsConfig::new(),
            throttle: Duration::from_secs(1),
            ingress_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(1),
        }
    }

    /// Set kubectl configuration
    pub fn kubectl(mut self, kubectl: KubectlConfig) -> Self {
        self.kubectl = kubectl;
        self
    }

    /// Set DNS configuration
    pub fn dns(mut self, dns: DnsConfig) -> Self {
        self.dns = dns;
        self
    }

    /// Set the Route53 throttle
    pub fn throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Set ingress wait timeout
    pub fn ingress_timeout(mut self, timeout: Duration) -> Self {
        self.ingress_timeout = timeout;
        self
    }

    /// Set ingress wait timeout in seconds
    pub fn ingress_timeout_secs(mut self, secs: u64) -> Self {
        self.ingress_timeout = Duration::from_secs(secs);
        self
    }

    /// Set poll interval
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for SmokeConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SmokeConfig::new();

        assert_eq!(config.kubectl.binary, "kubectl");
        assert_eq!(config.dns.alias_hosted_zone_id, "ZD4D7Y8KGAS4G");
        assert_eq!(config.dns.txt_owner, "default");
        assert_eq!(config.dns.txt_ttl, 300);
        assert_eq!(config.throttle, Duration::from_secs(1));
        assert_eq!(config.ingress_timeout, Duration::from_secs(60));
        assert_eq!(config.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_kubectl_global_args() {
        assert!(KubectlConfig::new().global_args().is_empty());

        let config = KubectlConfig::new()
            .kubeconfig("~/.kube/smoke")
            .context("smoke-context");

        assert_eq!(
            config.global_args(),
            vec!["--kubeconfig", "~/.kube/smoke", "--context", "smoke-context"]
        );
    }

    #[test]
    fn test_dns_config_builder() {
        let dns = DnsConfig::new()
            .region("us-east-1")
            .alias_hosted_zone_id("Z35SXDOTRQ7X7K")
            .txt_owner("smoke")
            .txt_ttl(60);

        assert_eq!(dns.region, Some("us-east-1".to_string()));
        assert_eq!(dns.alias_hosted_zone_id, "Z35SXDOTRQ7X7K");
        assert_eq!(dns.txt_owner, "smoke");
        assert_eq!(dns.txt_ttl, 60);
    }

    #[test]
    fn test_full_config() {
        let config = SmokeConfig::new()
            .kubectl(KubectlConfig::new().binary("/usr/local/bin/kubectl"))
            .ingress_timeout_secs(120)
            .throttle(Duration::ZERO);

        assert_eq!(config.kubectl.binary, "/usr/local/bin/kubectl");
        assert_eq!(config.ingress_timeout, Duration::from_secs(120));
        assert_eq!(config.throttle, Duration::ZERO);
    }
}
