//! Global tracing subscriber: an `EnvFilter`, a stderr `fmt` layer, and an
//! optional OpenTelemetry bridge exporting spans to stdout.
//!
//! ```no_run
//! attune_observe::tracing_setup::init_tracing_with_default(false, "info").unwrap();
//! // ... run ...
//! attune_observe::tracing_setup::shutdown_tracing();
//! ```

use std::sync::OnceLock;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const TRACER_NAME: &str = "attune";

/// Kept so [`shutdown_tracing`] can flush buffered spans.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

type InitResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Install the subscriber, using `default_directive` when `RUST_LOG` is unset.
///
/// Fails if a global subscriber is already installed or the directive does
/// not parse.
pub fn init_tracing_with_default(enable_otel: bool, default_directive: &str) -> InitResult {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)?,
    };
    install(enable_otel, filter)
}

fn install(enable_otel: bool, filter: EnvFilter) -> InitResult {
    // stdout is reserved for command output.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);

    let otel_layer = enable_otel.then(|| {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer(TRACER_NAME);
        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);
        tracing_opentelemetry::layer().with_tracer(tracer)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()?;
    Ok(())
}

/// Flush and shut down the OTel provider. No-op when OTel was never enabled.
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("Warning: OTel tracer provider shutdown error: {e}");
        }
    }
}
