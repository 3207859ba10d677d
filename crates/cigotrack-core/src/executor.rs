//! Per-item execution loop.
//!
//! Items run strictly in input order, one call in flight at a time. Each
//! item moves `Pending -> Building -> Dispatched -> Normalized`, or ends in
//! `Failed`. Failures either become an error item (continue-on-failure) or
//! abort the run; configuration errors always abort.

use std::fmt::{Display, Formatter};

use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, debug_span, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::body::FieldWarning;
use crate::dispatch::Dispatcher;
use crate::fields::NodeCall;
use crate::normalize::{normalize, OutputItem};
use crate::params::{InputItem, ParameterSource};
use crate::routes::Resource;
use crate::ConnectorError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionOptions {
    pub continue_on_fail: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Pending,
    Building,
    Dispatched,
    Normalized,
    Failed,
}

impl ItemState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Building => "building",
            Self::Dispatched => "dispatched",
            Self::Normalized => "normalized",
            Self::Failed => "failed",
        }
    }
}

impl Display for ItemState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lenient field drop, tagged with the item it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemWarning {
    pub item_index: usize,
    pub field: &'static str,
    pub reason: String,
}

impl ItemWarning {
    fn from_field(item_index: usize, warning: FieldWarning) -> Self {
        Self {
            item_index,
            field: warning.field,
            reason: warning.reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    pub run_id: Uuid,
    pub resource: Option<Resource>,
    pub operation: Option<&'static str>,
    pub item_count: usize,
    pub items: Vec<OutputItem>,
    pub warnings: Vec<ItemWarning>,
}

impl RunOutput {
    fn new(run_id: Uuid, item_count: usize) -> Self {
        Self {
            run_id,
            resource: None,
            operation: None,
            item_count,
            items: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_error()).count()
    }
}

/// Run aborted at `item_index`.
#[derive(Debug, Error)]
#[error("item {item_index} failed: {source}")]
pub struct ExecutionError {
    pub item_index: usize,
    pub source: ConnectorError,
}

#[derive(Debug, Clone)]
pub struct Executor {
    dispatcher: Dispatcher,
    options: ExecutionOptions,
}

impl Executor {
    pub fn new(dispatcher: Dispatcher, options: ExecutionOptions) -> Self {
        Self {
            dispatcher,
            options,
        }
    }

    pub const fn options(&self) -> ExecutionOptions {
        self.options
    }

    /// Runs every item; an empty input set runs once against an empty item.
    pub async fn run<P>(
        &self,
        items: Vec<InputItem>,
        params: &P,
    ) -> Result<RunOutput, ExecutionError>
    where
        P: ParameterSource + ?Sized,
    {
        let items = if items.is_empty() {
            vec![InputItem::empty()]
        } else {
            items
        };
        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id, item_count = items.len());

        async move {
            let mut output = RunOutput::new(run_id, items.len());
            for (item_index, item) in items.iter().enumerate() {
                self.run_item(item_index, item, params, &mut output)
                    .instrument(debug_span!("item", item_index))
                    .await?;
            }

            info!(
                output_count = output.items.len(),
                error_count = output.error_count(),
                warning_count = output.warnings.len(),
                "run complete"
            );
            Ok(output)
        }
        .instrument(span)
        .await
    }

    async fn run_item<P>(
        &self,
        item_index: usize,
        item: &InputItem,
        params: &P,
        output: &mut RunOutput,
    ) -> Result<(), ExecutionError>
    where
        P: ParameterSource + ?Sized,
    {
        debug!(state = %ItemState::Pending, "item state");
        let abort = |source: ConnectorError| {
            debug!(state = %ItemState::Failed, code = source.code(), "item state");
            ExecutionError { item_index, source }
        };

        debug!(state = %ItemState::Building, "item state");
        let call = params.resolve(item, item_index).map_err(abort)?;
        output.resource.get_or_insert(call.resource());
        output.operation.get_or_insert(call.operation());

        match self.process(&call, item_index, &mut output.warnings).await {
            Ok(items) => {
                debug!(state = %ItemState::Normalized, outputs = items.len(), "item state");
                output.items.extend(items);
                Ok(())
            }
            Err(error) if self.options.continue_on_fail && !error.is_configuration() => {
                debug!(state = %ItemState::Failed, code = error.code(), "item state");
                warn!(error = %error, "item failed; continuing");
                output.items.push(error_item(&call, &error, item_index));
                Ok(())
            }
            Err(error) => Err(abort(error)),
        }
    }

    /// Field drops are recorded before sending, so they survive a failed call.
    async fn process(
        &self,
        call: &NodeCall,
        item_index: usize,
        warnings: &mut Vec<ItemWarning>,
    ) -> Result<Vec<OutputItem>, ConnectorError> {
        let mut plan = self.dispatcher.plan(call)?;
        debug!(state = %ItemState::Dispatched, method = %plan.method, path = %plan.path, "item state");
        warnings.extend(
            plan.warnings
                .drain(..)
                .map(|warning| ItemWarning::from_field(item_index, warning)),
        );

        let dispatched = self.dispatcher.send(plan, item_index).await?;
        Ok(normalize(dispatched.response, item_index))
    }
}

fn error_item(call: &NodeCall, error: &ConnectorError, item_index: usize) -> OutputItem {
    OutputItem::new(
        json!({
            "error": error.to_string(),
            "code": error.code(),
            "details": error.details(),
            "resource": call.resource(),
            "operation": call.operation(),
        }),
        item_index,
    )
}
