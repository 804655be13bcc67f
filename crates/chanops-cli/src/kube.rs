use anyhow::{anyhow, bail, Context, Result};
use chanops_core::env::EnvEntry;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Container, EnvVar};
use kube::api::{Api, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::Path;

/// Read/write access to one deployment's container environment. The
/// deployment object fetched here is reused for the write-back so the
/// server can reject the update if someone else changed it in between.
pub struct DeploymentGateway {
    api: Api<Deployment>,
    name: String,
    container: String,
    deployment: Deployment,
}

impl DeploymentGateway {
    pub async fn connect(
        kubeconfig: Option<&Path>,
        namespace: &str,
        deployment: &str,
        container: &str,
    ) -> Result<Self> {
        let client = match kubeconfig {
            Some(path) => {
                let kc = Kubeconfig::read_from(path)
                    .with_context(|| format!("failed to read kubeconfig {}", path.display()))?;
                let config = Config::from_custom_kubeconfig(kc, &KubeConfigOptions::default())
                    .await
                    .context("failed to build client config from kubeconfig")?;
                Client::try_from(config).context("failed to build cluster client")?
            }
            None => Client::try_default()
                .await
                .context("failed to build cluster client from ambient config")?,
        };
        let api: Api<Deployment> = Api::namespaced(client, namespace);
        let fetched = api
            .get(deployment)
            .await
            .with_context(|| format!("failed to fetch deployment {namespace}/{deployment}"))?;
        let gateway = Self {
            api,
            name: deployment.to_string(),
            container: container.to_string(),
            deployment: fetched,
        };
        // Fail on a missing container now, not at commit time.
        gateway.container()?;
        Ok(gateway)
    }

    /// Re-fetch the deployment so a commit reconciles against the
    /// latest live environment, not the one seen at startup.
    pub async fn refresh(&mut self) -> Result<()> {
        self.deployment = self
            .api
            .get(&self.name)
            .await
            .with_context(|| format!("failed to re-fetch deployment {}", self.name))?;
        Ok(())
    }

    pub fn env_entries(&self) -> Result<Vec<EnvEntry>> {
        let container = self.container()?;
        Ok(container
            .env
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|v| EnvEntry::new(v.name.clone(), v.value.clone().unwrap_or_default()))
            .collect())
    }

    /// Replace the managed container's env with `entries` and push the
    /// deployment back. Env vars that survived reconciliation keep
    /// their original object so `value_from` references pass through.
    pub async fn replace_env(&mut self, entries: &[EnvEntry]) -> Result<()> {
        let originals: Vec<EnvVar> = self
            .container()?
            .env
            .clone()
            .unwrap_or_default();
        let new_env: Vec<EnvVar> = entries
            .iter()
            .map(|e| {
                originals
                    .iter()
                    .find(|v| v.name == e.name && v.value.as_deref().unwrap_or_default() == e.value)
                    .cloned()
                    .unwrap_or_else(|| EnvVar {
                        name: e.name.clone(),
                        value: Some(e.value.clone()),
                        value_from: None,
                    })
            })
            .collect();
        self.container_mut()?.env = Some(new_env);
        self.deployment = self
            .api
            .replace(&self.name, &PostParams::default(), &self.deployment)
            .await
            .with_context(|| format!("failed to update deployment {}", self.name))?;
        Ok(())
    }

    fn containers(&self) -> Result<&Vec<Container>> {
        self.deployment
            .spec
            .as_ref()
            .and_then(|s| s.template.spec.as_ref())
            .map(|s| &s.containers)
            .ok_or_else(|| anyhow!("deployment {} has no pod template spec", self.name))
    }

    fn container(&self) -> Result<&Container> {
        let containers = self.containers()?;
        if containers.is_empty() {
            bail!("deployment {} has no containers", self.name);
        }
        if self.container.is_empty() {
            return Ok(&containers[0]);
        }
        containers
            .iter()
            .find(|c| c.name == self.container)
            .ok_or_else(|| {
                anyhow!(
                    "deployment {} has no container named {}",
                    self.name,
                    self.container
                )
            })
    }

    fn container_mut(&mut self) -> Result<&mut Container> {
        let name = self.deployment.metadata.name.clone().unwrap_or_default();
        let wanted = self.container.clone();
        let containers = self
            .deployment
            .spec
            .as_mut()
            .and_then(|s| s.template.spec.as_mut())
            .map(|s| &mut s.containers)
            .ok_or_else(|| anyhow!("deployment {name} has no pod template spec"))?;
        if containers.is_empty() {
            bail!("deployment {name} has no containers");
        }
        if wanted.is_empty() {
            return Ok(&mut containers[0]);
        }
        containers
            .iter_mut()
            .find(|c| c.name == wanted)
            .ok_or_else(|| anyhow!("deployment {name} has no container named {wanted}"))
    }
}
