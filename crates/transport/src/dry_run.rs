use std::io;

use logging::targets::CMD;
use tracing::info;

use crate::{Endpoint, InvokeOptions, Invocation, TransferPrimitive};

/// Primitive that reports what would be transferred without doing it.
#[derive(Clone, Copy, Debug, Default)]
pub struct DryRun;

impl TransferPrimitive for DryRun {
    fn invoke(
        &self,
        source: &Endpoint,
        destination: &Endpoint,
        _options: &InvokeOptions,
    ) -> io::Result<Invocation> {
        info!(target: CMD, "(dry run) {source} -> {destination}");
        Ok(Invocation::success())
    }
}
