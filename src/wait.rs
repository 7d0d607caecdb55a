//! Rich wait errors with debugging context
//!
//! Returned when a bounded poll (object existence, load balancer
//! assignment) gives up.
//!
//! # Example
//!
//! ```ignore
//! match kubectl.wait_for("smoke", "ingress", "web", Duration::from_secs(60)).await {
//!     Err(KubectlError::Wait(err)) => {
//!         println!("Resource: {}", err.resource);
//!         println!("Last state: {}", err.last_state);
//!         println!("Attempts: {}", err.attempts);
//!     }
//!     _ => {}
//! }
//! ```

use k8s_openapi::api::networking::v1::Ingress;
use std::fmt;
use std::time::Duration;

/// Rich error context for wait operations
#[derive(Debug, Clone)]
pub struct WaitError {
    /// Resource reference (e.g., "ingress/web")
    pub resource: String,
    /// Namespace the resource was expected in
    pub namespace: String,
    /// Description of the last observed state
    pub last_state: String,
    /// How long we waited before giving up
    pub elapsed: Duration,
    /// The timeout that was configured
    pub timeout: Duration,
    /// Number of checks performed
    pub attempts: u32,
}

impl WaitError {
    pub fn new(
        resource: impl Into<String>,
        namespace: impl Into<String>,
        timeout: Duration,
        elapsed: Duration,
    ) -> Self {
        Self {
            resource: resource.into(),
            namespace: namespace.into(),
            last_state: "unknown".to_string(),
            elapsed,
            timeout,
            attempts: 0,
        }
    }

    /// Set the last observed state
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.last_state = state.into();
        self
    }

    /// Set the number of checks performed
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }
}

impl fmt::Display for WaitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "Wait timeout for {} in namespace {}", self.resource, self.namespace)?;
        writeln!(f, "├─ Last state: {}", self.last_state)?;
        writeln!(f, "├─ Attempts: {}", self.attempts)?;
        writeln!(f, "├─ Elapsed: {:?}", self.elapsed)?;
        write!(f, "└─ Timeout: {:?}", self.timeout)
    }
}

impl std::error::Error for WaitError {}

/// Helper trait for extracting state description from K8s resources
pub trait ResourceState {
    /// Get a human-readable description of the resource's current state
    fn state_description(&self) -> String;
}

impl ResourceState for Ingress {
    fn state_description(&self) -> String {
        let entries = self
            .status
            .as_ref()
            .and_then(|s| s.load_balancer.as_ref())
            .and_then(|lb| lb.ingress.as_ref());

        match entries.and_then(|e| e.first()) {
            Some(entry) => match (entry.hostname.as_deref(), entry.ip.as_deref()) {
                (Some(hostname), _) => format!("load balancer hostname {hostname}"),
                (None, Some(ip)) => format!("load balancer ip {ip}, no hostname"),
                (None, None) => "load balancer entry without address".to_string(),
            },
            None => "load balancer pending".to_string(),
        }
    }
}

/// Hostname of the first load balancer entry, if assigned
pub fn load_balancer_hostname(ingress: &Ingress) -> Option<&str> {
    ingress
        .status
        .as_ref()?
        .load_balancer
        .as_ref()?
        .ingress
        .as_ref()?
        .first()?
        .hostname
        .as_deref()
        .filter(|h| !h.is_empty())
}
