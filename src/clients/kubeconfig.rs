use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Certificate, Client, Identity};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::context::ClusterConnector;
use super::{ApiClient, ClusterApi, Credentials};
use crate::error::DashboardError;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct Kubeconfig {
    #[serde(default)]
    pub clusters: Vec<NamedCluster>,
    #[serde(default)]
    pub users: Vec<NamedUser>,
    #[serde(default)]
    pub contexts: Vec<NamedContext>,
    #[serde(default)]
    pub current_context: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedCluster {
    pub name: String,
    pub cluster: ClusterEntry,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ClusterEntry {
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub certificate_authority: Option<String>,
    #[serde(default)]
    pub certificate_authority_data: Option<String>,
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedUser {
    pub name: String,
    #[serde(default)]
    pub user: UserEntry,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct UserEntry {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, rename = "tokenFile")]
    pub token_file: Option<String>,
    #[serde(default)]
    pub client_certificate: Option<String>,
    #[serde(default)]
    pub client_certificate_data: Option<String>,
    #[serde(default)]
    pub client_key: Option<String>,
    #[serde(default)]
    pub client_key_data: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub exec: Option<serde_yaml::Value>,
    #[serde(default)]
    pub auth_provider: Option<serde_yaml::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedContext {
    pub name: String,
    pub context: ContextEntry,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ContextEntry {
    pub cluster: String,
    #[serde(default)]
    pub user: Option<String>,
}

fn invalid(msg: String) -> DashboardError {
    DashboardError::InvalidInput(msg)
}

impl Kubeconfig {
    pub fn load(path: &Path) -> Result<Self, DashboardError> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!("reading kubeconfig {}: {}", path.display(), e))
        })?;
        Self::parse(&data)
    }

    pub fn parse(data: &str) -> Result<Self, DashboardError> {
        serde_yaml::from_str(data)
            .map_err(|e| DashboardError::Config(format!("parsing kubeconfig: {}", e)))
    }

    /// `$KUBECONFIG` (first entry), else `~/.kube/config`.
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(env) = std::env::var("KUBECONFIG") {
            if let Some(first) = std::env::split_paths(&env).next() {
                if !first.as_os_str().is_empty() {
                    return Some(first);
                }
            }
        }
        home::home_dir().map(|h| h.join(".kube").join("config"))
    }

    pub fn context_names(&self) -> Vec<String> {
        self.contexts.iter().map(|c| c.name.clone()).collect()
    }

    fn context(&self, name: &str) -> Option<&ContextEntry> {
        self.contexts
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.context)
    }

    fn cluster(&self, name: &str) -> Option<&ClusterEntry> {
        self.clusters
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.cluster)
    }

    fn user(&self, name: &str) -> Option<&UserEntry> {
        self.users.iter().find(|u| u.name == name).map(|u| &u.user)
    }
}

/// Inline base64 data wins over a file reference, as kubectl does.
fn read_material(
    data: &Option<String>,
    file: &Option<String>,
    base_dir: &Path,
) -> Result<Option<Vec<u8>>, DashboardError> {
    if let Some(d) = data {
        let bytes = STANDARD
            .decode(d.trim())
            .map_err(|e| invalid(format!("decoding inline certificate data: {}", e)))?;
        return Ok(Some(bytes));
    }
    if let Some(f) = file {
        let path = base_dir.join(f);
        let bytes = std::fs::read(&path)
            .map_err(|e| DashboardError::Config(format!("reading {}: {}", path.display(), e)))?;
        return Ok(Some(bytes));
    }
    Ok(None)
}

/// Builds API clients for the contexts of one kubeconfig file.
pub struct KubeconfigConnector {
    kubeconfig: Kubeconfig,
    base_dir: PathBuf,
    timeout: Duration,
    page_size: u32,
}

impl KubeconfigConnector {
    /// Relative certificate and token paths resolve against `base_dir`.
    pub fn new(kubeconfig: Kubeconfig, base_dir: PathBuf, timeout: Duration, page_size: u32) -> Self {
        Self {
            kubeconfig,
            base_dir,
            timeout,
            page_size,
        }
    }

    pub fn build_client(&self, context_name: &str) -> Result<ApiClient, DashboardError> {
        let kc = &self.kubeconfig;
        let ctx = kc
            .context(context_name)
            .ok_or_else(|| invalid(format!("context {:?} not found in kubeconfig", context_name)))?;
        let cluster = kc.cluster(&ctx.cluster).ok_or_else(|| {
            invalid(format!(
                "context {:?} references unknown cluster {:?}",
                context_name, ctx.cluster
            ))
        })?;
        if cluster.server.is_empty() {
            return Err(invalid(format!("cluster {:?} has no server", ctx.cluster)));
        }

        let user = match ctx.user.as_deref() {
            Some(u) => kc.user(u).cloned().ok_or_else(|| {
                invalid(format!(
                    "context {:?} references unknown user {:?}",
                    context_name, u
                ))
            })?,
            None => UserEntry::default(),
        };
        if user.exec.is_some() || user.auth_provider.is_some() {
            return Err(invalid(format!(
                "context {:?} uses an exec or auth-provider plugin, which is not supported",
                context_name
            )));
        }

        let mut builder = Client::builder().timeout(self.timeout);

        if cluster.insecure_skip_tls_verify {
            builder = builder.danger_accept_invalid_certs(true);
        } else if let Some(ca) = read_material(
            &cluster.certificate_authority_data,
            &cluster.certificate_authority,
            &self.base_dir,
        )? {
            let cert = Certificate::from_pem(&ca)
                .map_err(|e| invalid(format!("parsing certificate authority: {}", e)))?;
            builder = builder.add_root_certificate(cert);
        }

        let cert = read_material(
            &user.client_certificate_data,
            &user.client_certificate,
            &self.base_dir,
        )?;
        let key = read_material(&user.client_key_data, &user.client_key, &self.base_dir)?;
        if let (Some(mut cert), Some(key)) = (cert, key) {
            cert.push(b'\n');
            cert.extend_from_slice(&key);
            let identity = Identity::from_pem(&cert)
                .map_err(|e| invalid(format!("parsing client certificate: {}", e)))?;
            builder = builder.identity(identity);
        }

        let credentials = if let Some(token) = user.token.clone() {
            Credentials::Bearer(token)
        } else if let Some(ref file) = user.token_file {
            let path = self.base_dir.join(file);
            let token = std::fs::read_to_string(&path).map_err(|e| {
                DashboardError::Config(format!("reading token file {}: {}", path.display(), e))
            })?;
            Credentials::Bearer(token.trim().to_string())
        } else if let (Some(username), Some(password)) = (user.username.clone(), user.password.clone())
        {
            Credentials::Basic { username, password }
        } else {
            Credentials::None
        };

        let http = builder
            .build()
            .map_err(|e| DashboardError::Config(format!("building HTTP client: {}", e)))?;

        Ok(ApiClient::new(
            cluster.server.clone(),
            http,
            credentials,
            self.page_size,
        ))
    }
}

impl ClusterConnector for KubeconfigConnector {
    fn contexts(&self) -> Vec<String> {
        self.kubeconfig.context_names()
    }

    fn default_context(&self) -> Option<String> {
        self.kubeconfig
            .current_context
            .clone()
            .filter(|c| !c.is_empty())
            .or_else(|| self.kubeconfig.contexts.first().map(|c| c.name.clone()))
    }

    fn connect(&self, context: &str) -> Result<Arc<dyn ClusterApi>, DashboardError> {
        Ok(Arc::new(self.build_client(context)?))
    }
}
