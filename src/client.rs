//! Client composition root.
//!
//! A [`BlnkClient`] is built once from a [`ClientConfig`] and never changes:
//! base URL, API key, retry budget and timeouts are fixed at construction.
//! Clones share the same underlying connection pool.

use std::sync::Arc;
use std::time::Duration;

use crate::allocation::{AllocationValidator, AmountComparison};
use crate::config::{validate_config, ClientConfig};
use crate::error::{ClientError, Result};
use crate::http::{RequestBuilder, RequestExecutor, ReqwestTransport, Transport};
use crate::resilience::RetryBudget;
use crate::resources::{
    Api, BalanceMonitors, Balances, Identities, Ledgers, MetadataService, Reconciliation, Search,
    Transactions,
};

/// Handle to the ledger service.
#[derive(Debug, Clone)]
pub struct BlnkClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    config: ClientConfig,
    requests: RequestBuilder,
    executor: RequestExecutor,
    validator: AllocationValidator,
}

impl BlnkClient {
    /// Build a client over the default reqwest transport.
    pub fn new(config: ClientConfig) -> Result<Self> {
        validate(&config)?;
        let transport = ReqwestTransport::new(&config.timeouts)
            .map_err(|e| ClientError::RequestBuild(e.to_string()))?;
        Self::assemble(config, Arc::new(transport), None, AmountComparison::default())
    }

    /// Build a client over a caller-supplied transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        validate(&config)?;
        Self::assemble(config, transport, None, AmountComparison::default())
    }

    pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(base_url)
    }

    fn assemble(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        attempt_timeout: Option<Duration>,
        comparison: AmountComparison,
    ) -> Result<Self> {
        let requests = RequestBuilder::new(
            &config.connection.base_url,
            config.connection.api_key.clone(),
        )?;

        let mut executor = RequestExecutor::new(transport, RetryBudget::from(&config.retries));
        if let Some(limit) = attempt_timeout {
            executor = executor.with_attempt_timeout(limit);
        }

        tracing::debug!(
            base_url = %requests.base_url(),
            max_attempts = executor.budget().max_attempts(),
            "Ledger client created"
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                requests,
                executor,
                validator: AllocationValidator::with_comparison(comparison),
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn budget(&self) -> RetryBudget {
        self.inner.executor.budget()
    }

    /// The validator applied by [`Transactions::create`].
    pub fn validator(&self) -> &AllocationValidator {
        &self.inner.validator
    }

    fn api(&self) -> Api<'_> {
        Api::new(&self.inner.requests, &self.inner.executor)
    }

    pub fn ledgers(&self) -> Ledgers<'_> {
        Ledgers::new(self.api())
    }

    pub fn balances(&self) -> Balances<'_> {
        Balances::new(self.api())
    }

    pub fn balance_monitors(&self) -> BalanceMonitors<'_> {
        BalanceMonitors::new(self.api())
    }

    pub fn identities(&self) -> Identities<'_> {
        Identities::new(self.api())
    }

    pub fn transactions(&self) -> Transactions<'_> {
        Transactions::new(self.api(), &self.inner.validator)
    }

    pub fn search(&self) -> Search<'_> {
        Search::new(self.api())
    }

    pub fn reconciliation(&self) -> Reconciliation<'_> {
        Reconciliation::new(self.api())
    }

    pub fn metadata(&self) -> MetadataService<'_> {
        MetadataService::new(self.api())
    }
}

fn validate(config: &ClientConfig) -> Result<()> {
    validate_config(config).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        ClientError::InvalidArgument(format!("invalid configuration: {}", messages.join("; ")))
    })
}

/// Programmatic alternative to a config file.
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    attempt_timeout: Option<Duration>,
    comparison: AmountComparison,
}

impl ClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            config: ClientConfig::new(base_url),
            transport: None,
            attempt_timeout: None,
            comparison: AmountComparison::default(),
        }
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.connection.api_key = Some(key.into());
        self
    }

    /// Total attempts per call, including the first. 0 is treated as 1.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.retries.max_attempts = attempts;
        self
    }

    pub fn backoff_delay(mut self, delay: Duration) -> Self {
        self.config.retries.backoff_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Per-request timeout on the HTTP client, in whole seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeouts.request_secs = timeout.as_secs().max(1);
        self
    }

    /// Upper bound on each attempt, enforced around the transport.
    pub fn attempt_timeout(mut self, limit: Duration) -> Self {
        self.attempt_timeout = Some(limit);
        self
    }

    pub fn amount_comparison(mut self, comparison: AmountComparison) -> Self {
        self.comparison = comparison;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<BlnkClient> {
        validate(&self.config)?;
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                ReqwestTransport::new(&self.config.timeouts)
                    .map_err(|e| ClientError::RequestBuild(e.to_string()))?,
            ),
        };
        BlnkClient::assemble(self.config, transport, self.attempt_timeout, self.comparison)
    }
}
