pub mod logging;
pub mod metrics;
pub mod trace_context;

pub use self::logging::init_tracing;
pub use self::metrics::{init_metrics, render_metrics};
pub use self::trace_context::{
    inject_trace_context, TracedClientExt, TracedRequest, TRACEPARENT_HEADER, TRACESTATE_HEADER,
};
