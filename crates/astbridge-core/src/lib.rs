//! astbridge-core - Declaration model, type printing and configuration
//!
//! This crate provides the foundational types shared by the generators:
//! - [`DeclGraph`] arena of translation units, classes and enumerations
//! - [`TypePrinter`] for native and managed type names
//! - [`BootstrapConfig`] for the names and rules of one bootstrap run
//! - [`BootstrapError`] for error handling

pub mod config;
pub mod decl;
mod error;
pub mod naming;
pub mod printer;

pub use config::{BootstrapConfig, DiscriminantConfig, FamilyConfig, NormalizeConfig};
pub use decl::{
    Class, ClassId, DeclGraph, DeclRef, EnumId, EnumItem, Enumeration, Method, Primitive,
    Property, TypeRef, UnitId,
};
pub use error::{BootstrapError, BootstrapResult};
pub use printer::{Flavor, PrintScope, TypePrinter};

/// Verbosity of diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = BootstrapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" => Ok(LogLevel::Off),
            other => Err(BootstrapError::Config(format!("unknown log level '{other}'"))),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BootstrapConfig, BootstrapError, BootstrapResult, ClassId, DeclGraph, DeclRef, EnumId,
        Flavor, LogLevel, PrintScope, TypePrinter, TypeRef,
    };
}
