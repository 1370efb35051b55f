use super::error::ProviderError;
use super::gateway::ProviderGateway;
use super::types::Stack;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory gateway serving canned stacks, tables and streams.
///
/// Failures can be injected per operation (and per table for stream lookups).
/// Call counters let tests assert which provider calls a build made.
pub struct MockGateway {
    name: String,
    stacks: HashMap<String, Stack>,
    tables: Vec<String>,
    streams: HashMap<String, String>,
    describe_error: Option<ProviderError>,
    list_tables_error: Option<ProviderError>,
    stream_errors: HashMap<String, ProviderError>,
    stream_delay: Option<Duration>,
    describe_calls: AtomicUsize,
    list_tables_calls: AtomicUsize,
    stream_calls: AtomicUsize,
    streams_in_flight: AtomicUsize,
    max_streams_in_flight: AtomicUsize,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::with_name("MockGateway")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stacks: HashMap::new(),
            tables: Vec::new(),
            streams: HashMap::new(),
            describe_error: None,
            list_tables_error: None,
            stream_errors: HashMap::new(),
            stream_delay: None,
            describe_calls: AtomicUsize::new(0),
            list_tables_calls: AtomicUsize::new(0),
            stream_calls: AtomicUsize::new(0),
            streams_in_flight: AtomicUsize::new(0),
            max_streams_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_stack(mut self, stack: Stack) -> Self {
        self.stacks.insert(stack.name.clone(), stack);
        self
    }

    pub fn with_table(mut self, table_name: impl Into<String>) -> Self {
        self.tables.push(table_name.into());
        self
    }

    /// Registers a table together with its stream ARN.
    pub fn with_streamed_table(
        mut self,
        table_name: impl Into<String>,
        stream_arn: impl Into<String>,
    ) -> Self {
        let table_name = table_name.into();
        self.streams.insert(table_name.clone(), stream_arn.into());
        self.tables.push(table_name);
        self
    }

    pub fn fail_describe_stack(mut self, error: ProviderError) -> Self {
        self.describe_error = Some(error);
        self
    }

    pub fn fail_list_tables(mut self, error: ProviderError) -> Self {
        self.list_tables_error = Some(error);
        self
    }

    pub fn fail_stream_lookup(mut self, table_name: impl Into<String>, error: ProviderError) -> Self {
        self.stream_errors.insert(table_name.into(), error);
        self
    }

    /// Makes every stream lookup sleep before answering.
    pub fn with_stream_delay(mut self, delay: Duration) -> Self {
        self.stream_delay = Some(delay);
        self
    }

    pub fn describe_calls(&self) -> usize {
        self.describe_calls.load(Ordering::SeqCst)
    }

    pub fn list_tables_calls(&self) -> usize {
        self.list_tables_calls.load(Ordering::SeqCst)
    }

    pub fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }

    /// Highest number of stream lookups observed running at the same time.
    pub fn max_concurrent_stream_lookups(&self) -> usize {
        self.max_streams_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderGateway for MockGateway {
    async fn describe_stack(&self, stack_name: &str) -> Result<Stack, ProviderError> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = &self.describe_error {
            return Err(error.clone());
        }

        self.stacks
            .get(stack_name)
            .cloned()
            .ok_or_else(|| ProviderError::StackNotFound(stack_name.to_string()))
    }

    async fn list_tables(&self) -> Result<Vec<String>, ProviderError> {
        self.list_tables_calls.fetch_add(1, Ordering::SeqCst);

        match &self.list_tables_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.tables.clone()),
        }
    }

    async fn find_stream(&self, table_name: &str) -> Result<Option<String>, ProviderError> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.streams_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_streams_in_flight
            .fetch_max(in_flight, Ordering::SeqCst);

        if let Some(delay) = self.stream_delay {
            tokio::time::sleep(delay).await;
        }
        self.streams_in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(error) = self.stream_errors.get(table_name) {
            return Err(error.clone());
        }
        Ok(self.streams.get(table_name).cloned())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
