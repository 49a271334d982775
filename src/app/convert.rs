//! Type conversion functions for CLI to internal types.
//!
//! This module provides conversion functions that translate CLI-facing
//! types (from the `cli` module) to internal domain types used by the
//! analysis engine.

use crate::{
    cli::{Dialect, DimensionArg, Format},
    dialect::SqlDialect,
    dimension::Dimension,
    output::OutputFormat
};

/// Converts a CLI dialect enum to the internal SQL dialect type.
///
/// # Example
///
/// ```
/// use sql_analysis_engine::{app::convert_dialect, cli::Dialect, dialect::SqlDialect};
///
/// assert_eq!(convert_dialect(Dialect::Sqlserver), SqlDialect::SqlServer);
/// ```
pub fn convert_dialect(dialect: Dialect) -> SqlDialect {
    match dialect {
        Dialect::Generic => SqlDialect::Generic,
        Dialect::Mysql => SqlDialect::MySQL,
        Dialect::Postgresql => SqlDialect::PostgreSQL,
        Dialect::Sqlserver => SqlDialect::SqlServer,
        Dialect::Oracle => SqlDialect::Oracle
    }
}

/// Converts a CLI dimension to the internal dimension type.
pub fn convert_dimension(dimension: DimensionArg) -> Dimension {
    match dimension {
        DimensionArg::Performance => Dimension::Performance,
        DimensionArg::Security => Dimension::Security,
        DimensionArg::Standards => Dimension::Standards
    }
}

/// Converts a CLI format enum to the internal output format type.
pub fn convert_format(format: Format) -> OutputFormat {
    match format {
        Format::Text => OutputFormat::Text,
        Format::Json => OutputFormat::Json,
        Format::Yaml => OutputFormat::Yaml
    }
}
