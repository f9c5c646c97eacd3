//! Dumping a service configuration at startup.
//!
//! Shows the three ways a value can end up in a box: plain attributes, a
//! type implementing [`LogValue`] that presents itself as a group, and a
//! serializable struct rendered as pretty JSON. Run with
//! `BOXLOG_LEVEL=debug` on a terminal wider than 158 columns to also see
//! the runtime panel.

use std::time::Duration;

use boxlog::{Attr, Handler, HandlerOptions, Level, LogEvent, LogValue, PrettyHandler, Value};

struct GrpcConfig {
    port: u16,
    tls: bool,
    timeout: Duration,
}

struct Config {
    env: &'static str,
    storage_path: &'static str,
    grpc: GrpcConfig,
}

impl LogValue for GrpcConfig {
    fn log_value(&self) -> Value {
        Value::group([
            Attr::uint("port", u64::from(self.port)),
            Attr::bool("tls", self.tls),
            Attr::duration("timeout", self.timeout),
        ])
    }
}

impl LogValue for Config {
    fn log_value(&self) -> Value {
        Value::group([
            Attr::string("env", self.env),
            Attr::string("storage_path", self.storage_path),
            Attr::logged("grpc", &self.grpc),
        ])
    }
}

#[derive(Debug, serde::Serialize)]
struct Retention {
    weight: u32,
    data: RetentionData,
}

#[derive(Debug, serde::Serialize)]
struct RetentionData {
    bucket: &'static str,
    max_age_secs: u64,
}

#[derive(Debug, thiserror::Error)]
#[error("config file not found, using defaults")]
struct MissingConfig;

fn main() -> Result<(), boxlog::HandleError> {
    let handler = PrettyHandler::stdout(HandlerOptions::from_env());

    let config = Config {
        env: "local",
        storage_path: "./storage/storage.db",
        grpc: GrpcConfig {
            port: 44044,
            tls: false,
            timeout: Duration::from_secs(10),
        },
    };
    let retention = Retention {
        weight: 15,
        data: RetentionData {
            bucket: "events",
            max_age_secs: 15 * 60,
        },
    };

    handler.handle(
        &LogEvent::new(Level::Error, "startup degraded")
            .timestamped_now()
            .with_caller_source()
            .with_attr(Attr::error(&MissingConfig)),
    )?;

    let handler = handler.with_group("config");
    handler.handle(&LogEvent::new(Level::Info, "service starting").timestamped_now())?;
    handler.handle(
        &LogEvent::new(Level::Debug, "configuration loaded")
            .timestamped_now()
            .with_caller_source()
            .with_attr(Attr::logged("config", &config)),
    )?;
    handler.handle(
        &LogEvent::new(Level::Info, "retention policy")
            .timestamped_now()
            .with_caller_source()
            .with_attr(Attr::structured("retention", &retention)),
    )?;

    Ok(())
}
