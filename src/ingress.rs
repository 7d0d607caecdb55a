//! Ingress lifecycle helpers
//!
//! Create an ingress from a fixture, wait for it, read the load balancer
//! hostname the controller assigned, and delete it again.
//!
//! # Example
//!
//! ```ignore
//! let ingresses = harness.ingresses();
//!
//! ingresses.create_ingress("smoke", "web", "fixtures/ingress.yaml").await?;
//! let endpoint = ingresses.wait_for_endpoint("smoke", "web", Duration::from_secs(300)).await?;
//! // ... exercise DNS ...
//! ingresses.delete_ingress("smoke", "web").await?;
//! ```

use k8s_openapi::api::networking::v1::Ingress;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::eventually::{eventually, ConditionError, Probe};
use crate::kubectl::{Kubectl, KubectlError};
use crate::template::{render_file, TemplateBinding, TemplateError};
use crate::wait::{load_balancer_hostname, ResourceState, WaitError};

/// jsonpath of the first load balancer hostname
pub const ENDPOINT_JSONPATH: &str = "{.status.loadBalancer.ingress[0].hostname}";

/// Error type for ingress operations
#[derive(Debug, thiserror::Error)]
pub enum IngressError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Kubectl(#[from] KubectlError),
}

/// Ingress helpers bound to one kubectl
#[derive(Clone)]
pub struct IngressHelper {
    kubectl: Kubectl,
    timeout: Duration,
}

impl IngressHelper {
    /// Helpers waiting up to 60 seconds for a created ingress
    pub fn new(kubectl: Kubectl) -> Self {
        Self {
            kubectl,
            timeout: Duration::from_secs(60),
        }
    }

    /// Set how long `create_ingress` waits for the object
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn kubectl(&self) -> &Kubectl {
        &self.kubectl
    }

    /// Render `fixture` into `namespace` and wait for the ingress to exist
    ///
    /// The template sees `namespace` and `ingress_name`.
    pub async fn create_ingress(
        &self,
        namespace: &str,
        name: &str,
        fixture: impl AsRef<Path>,
    ) -> Result<(), IngressError> {
        self.create_ingress_with(fixture, TemplateBinding::new(namespace, name))
            .await
    }

    /// Like [`create_ingress`](Self::create_ingress) with extra template variables
    ///
    /// `namespace` and `ingress_name` must be present in `binding`.
    #[instrument(skip(self, fixture, binding), fields(fixture = %fixture.as_ref().display()))]
    pub async fn create_ingress_with(
        &self,
        fixture: impl AsRef<Path>,
        binding: TemplateBinding,
    ) -> Result<(), IngressError> {
        let (Some(namespace), Some(name)) = (binding.get("namespace"), binding.get("ingress_name"))
        else {
            return Err(TemplateError::Render(
                "binding needs namespace and ingress_name".to_string(),
            )
            .into());
        };

        let manifest = render_file(fixture.as_ref(), &binding).await?;
        self.kubectl.apply_manifest(namespace, &manifest).await?;

        info!(namespace = %namespace, ingress = %name, "Waiting for ingress");
        self.kubectl
            .wait_for(namespace, "ingress", name, self.timeout)
            .await?;
        Ok(())
    }

    /// Delete the ingress if both it and its namespace exist
    #[instrument(skip(self))]
    pub async fn delete_ingress(&self, namespace: &str, name: &str) -> Result<(), KubectlError> {
        if !self.kubectl.namespace_exists(namespace).await? {
            debug!("Namespace {} missing, nothing to delete", namespace);
            return Ok(());
        }
        if !self.kubectl.object_exists(namespace, "ingress", name).await? {
            debug!("Ingress {} missing, nothing to delete", name);
            return Ok(());
        }

        self.kubectl.delete(namespace, "ingress", name).await
    }

    /// Load balancer hostname of the ingress, exactly as kubectl prints it
    ///
    /// Not validated: an unassigned or missing ingress gives an empty string.
    pub async fn get_ingress_endpoint(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<String, KubectlError> {
        self.kubectl
            .get_jsonpath(namespace, "ingress", name, ENDPOINT_JSONPATH)
            .await
    }

    /// Poll until the controller assigns a load balancer hostname
    ///
    /// A missing ingress counts as not ready yet. A kubectl that cannot be
    /// run ends the wait at once.
    #[instrument(skip(self))]
    pub async fn wait_for_endpoint(
        &self,
        namespace: &str,
        name: &str,
        timeout: Duration,
    ) -> Result<String, IngressError> {
        let kubectl = &self.kubectl;

        let result = eventually(|| async move {
            match kubectl.get_json::<Ingress>(namespace, "ingress", name).await {
                Ok(ingress) => match load_balancer_hostname(&ingress) {
                    Some(hostname) => Probe::Done(hostname.to_string()),
                    None => Probe::Waiting(ingress.state_description()),
                },
                Err(e @ KubectlError::Spawn { .. }) => Probe::Failed(e),
                Err(e) => Probe::Waiting(e.to_string()),
            }
        })
        .timeout(timeout)
        .interval(kubectl.poll_every())
        .delay(kubectl.poll_delay())
        .await_condition()
        .await;

        match result {
            Ok(hostname) => {
                info!(endpoint = %hostname, "Ingress has a load balancer");
                Ok(hostname)
            }
            Err(ConditionError::EventuallyFailed {
                attempts,
                elapsed,
                last_state,
            }) => Err(KubectlError::from(
                WaitError::new(format!("ingress/{name}"), namespace, timeout, elapsed)
                    .with_state(last_state)
                    .with_attempts(attempts),
            )
            .into()),
            Err(ConditionError::Aborted(e)) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KubectlConfig;
    use crate::kubectl::CommandOutput;
    use crate::testing::{FakeRunner, RecordingDelay};
    use std::io::Write;
    use std::sync::Arc;

    const FIXTURE: &str = "apiVersion: networking.k8s.io/v1
kind: Ingress
metadata:
  name: {{ingress_name}}
  namespace: {{namespace}}
";

    fn helper(runner: Arc<FakeRunner>) -> IngressHelper {
        let kubectl = Kubectl::with_runner(KubectlConfig::new(), runner)
            .delay(Arc::new(RecordingDelay::default()));
        IngressHelper::new(kubectl)
    }

    fn fixture_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_create_ingress_applies_and_waits() {
        let runner = Arc::new(FakeRunner::new());
        let fixture = fixture_file(FIXTURE);

        helper(runner.clone())
            .create_ingress("smoke", "web", fixture.path())
            .await
            .unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].line(), "apply -n smoke -f -");
        let manifest = calls[0].stdin.as_deref().unwrap();
        assert!(manifest.contains("name: web"));
        assert!(manifest.contains("namespace: smoke"));
        assert_eq!(calls[1].line(), "get ingress web -n smoke -o name");
    }

    #[tokio::test]
    async fn test_create_ingress_with_extra_binding() {
        let runner = Arc::new(FakeRunner::new());
        let fixture = fixture_file("host: {{domain}}\n");

        helper(runner.clone())
            .create_ingress_with(
                fixture.path(),
                TemplateBinding::new("smoke", "web").set("domain", "web.example.com"),
            )
            .await
            .unwrap();

        assert_eq!(
            runner.calls()[0].stdin.as_deref(),
            Some("host: web.example.com\n")
        );
    }

    #[tokio::test]
    async fn test_create_ingress_wait_timeout_propagates() {
        let runner = Arc::new(FakeRunner::new());
        runner.respond(&["get", "ingress"], vec![CommandOutput::failed("NotFound")]);
        let fixture = fixture_file(FIXTURE);

        let err = helper(runner.clone())
            .timeout(Duration::from_secs(5))
            .create_ingress("smoke", "web", fixture.path())
            .await
            .unwrap_err();

        assert!(matches!(err, IngressError::Kubectl(KubectlError::Wait(_))));
        // one apply plus six existence checks
        assert_eq!(runner.calls().len(), 7);
    }

    #[tokio::test]
    async fn test_create_ingress_apply_failure_skips_wait() {
        let runner = Arc::new(FakeRunner::new());
        runner.respond(&["apply"], vec![CommandOutput::failed("invalid manifest")]);
        let fixture = fixture_file(FIXTURE);

        let err = helper(runner.clone())
            .create_ingress("smoke", "web", fixture.path())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            IngressError::Kubectl(KubectlError::CommandFailed { .. })
        ));
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_create_ingress_missing_fixture() {
        let runner = Arc::new(FakeRunner::new());

        let err = helper(runner.clone())
            .create_ingress("smoke", "web", "/nonexistent/ingress.yaml")
            .await
            .unwrap_err();

        assert!(matches!(err, IngressError::Template(TemplateError::NotFound(_))));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_ingress_when_present() {
        let runner = Arc::new(FakeRunner::new());

        helper(runner.clone())
            .delete_ingress("smoke", "web")
            .await
            .unwrap();

        assert_eq!(
            runner.lines(),
            vec![
                "get namespace smoke -o name",
                "get ingress web -n smoke -o name",
                "delete ingress web -n smoke",
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_ingress_missing_namespace_is_noop() {
        let runner = Arc::new(FakeRunner::new());
        runner.respond(&["get", "namespace"], vec![CommandOutput::failed("NotFound")]);

        helper(runner.clone())
            .delete_ingress("smoke", "web")
            .await
            .unwrap();

        assert_eq!(runner.lines(), vec!["get namespace smoke -o name"]);
    }

    #[tokio::test]
    async fn test_delete_ingress_missing_ingress_is_noop() {
        let runner = Arc::new(FakeRunner::new());
        runner.respond(&["get", "ingress"], vec![CommandOutput::failed("NotFound")]);

        helper(runner.clone())
            .delete_ingress("smoke", "web")
            .await
            .unwrap();

        assert!(runner.lines().iter().all(|l| !l.starts_with("delete")));
        assert_eq!(runner.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_get_ingress_endpoint() {
        let runner = Arc::new(FakeRunner::new());
        runner.respond(
            &["get", "ingress", "web"],
            vec![CommandOutput::ok("abc.eu-west-2.elb.amazonaws.com")],
        );

        let endpoint = helper(runner.clone())
            .get_ingress_endpoint("smoke", "web")
            .await
            .unwrap();

        assert_eq!(endpoint, "abc.eu-west-2.elb.amazonaws.com");
        assert_eq!(
            runner.lines(),
            vec!["get ingress web -n smoke -o jsonpath={.status.loadBalancer.ingress[0].hostname}"]
        );
    }

    #[tokio::test]
    async fn test_get_ingress_endpoint_unassigned_is_empty() {
        let runner = Arc::new(FakeRunner::new());

        let endpoint = helper(runner)
            .get_ingress_endpoint("smoke", "web")
            .await
            .unwrap();

        assert_eq!(endpoint, "");
    }

    #[tokio::test]
    async fn test_wait_for_endpoint() {
        let pending = r#"{"apiVersion":"networking.k8s.io/v1","kind":"Ingress","metadata":{"name":"web"},"status":{"loadBalancer":{}}}"#;
        let ready = r#"{"apiVersion":"networking.k8s.io/v1","kind":"Ingress","metadata":{"name":"web"},"status":{"loadBalancer":{"ingress":[{"hostname":"abc.elb.amazonaws.com"}]}}}"#;

        let runner = Arc::new(FakeRunner::new());
        runner.respond(
            &["get", "ingress", "web"],
            vec![CommandOutput::ok(pending), CommandOutput::ok(ready)],
        );

        let hostname = helper(runner.clone())
            .wait_for_endpoint("smoke", "web", Duration::from_secs(30))
            .await
            .unwrap();

        assert_eq!(hostname, "abc.elb.amazonaws.com");
        assert_eq!(runner.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_wait_for_endpoint_timeout_reports_state() {
        let pending = r#"{"apiVersion":"networking.k8s.io/v1","kind":"Ingress","metadata":{"name":"web"},"status":{"loadBalancer":{}}}"#;
        let runner = Arc::new(FakeRunner::new());
        runner.respond(&["get"], vec![CommandOutput::ok(pending)]);

        let err = helper(runner)
            .wait_for_endpoint("smoke", "web", Duration::from_secs(2))
            .await
            .unwrap_err();

        match err {
            IngressError::Kubectl(KubectlError::Wait(wait)) => {
                assert_eq!(wait.resource, "ingress/web");
                assert_eq!(wait.last_state, "load balancer pending");
            }
            other => panic!("expected wait error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_wait_for_endpoint_missing_binary_fails_fast() {
        let delay = Arc::new(RecordingDelay::default());
        let kubectl = Kubectl::new(KubectlConfig::new().binary("definitely-not-kubectl-xyz"))
            .delay(delay.clone());

        let err = IngressHelper::new(kubectl)
            .wait_for_endpoint("smoke", "web", Duration::from_secs(60))
            .await
            .unwrap_err();

        assert!(
            matches!(err, IngressError::Kubectl(KubectlError::Spawn { .. })),
            "got {err:?}"
        );
        assert!(delay.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_create_ingress_missing_binary_fails_fast() {
        let fixture = fixture_file(FIXTURE);
        let delay = Arc::new(RecordingDelay::default());
        let kubectl = Kubectl::new(KubectlConfig::new().binary("definitely-not-kubectl-xyz"))
            .delay(delay.clone());

        let err = IngressHelper::new(kubectl)
            .create_ingress("smoke", "web", fixture.path())
            .await
            .unwrap_err();

        assert!(matches!(err, IngressError::Kubectl(KubectlError::Spawn { .. })));
        assert!(delay.sleeps().is_empty());
    }
}
