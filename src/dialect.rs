//! SQL dialect identification by syntax signatures.
//!
//! Each supported dialect owns a fixed, ordered list of case-insensitive
//! regular expressions describing syntax that is characteristic of it. The
//! identifier counts how many signatures of each dialect match a statement and
//! picks the dialect with the strictly highest count, provided that count
//! reaches [`MIN_SIGNATURE_MATCHES`]. Everything else resolves to
//! [`SqlDialect::Generic`].
//!
//! # Example
//!
//! ```
//! use sql_analysis_engine::dialect::{SqlDialect, identify};
//!
//! let guess = identify("SELECT TOP 5 [name] FROM [users] WHERE created < GETDATE()");
//! assert_eq!(guess.dialect, SqlDialect::SqlServer);
//!
//! // a single incidental marker is not decisive
//! let guess = identify("SELECT id FROM `users`");
//! assert_eq!(guess.dialect, SqlDialect::Generic);
//! ```

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, validation_error};

/// Minimum number of matching signatures for a dialect to win
pub const MIN_SIGNATURE_MATCHES: u32 = 2;

/// SQL dialect resolved for a statement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    MySQL,
    PostgreSQL,
    SqlServer,
    Oracle,
    #[default]
    Generic
}

impl SqlDialect {
    /// Dialects that carry syntax signatures, in scoring order
    pub const DETECTABLE: [SqlDialect; 4] = [
        SqlDialect::MySQL,
        SqlDialect::PostgreSQL,
        SqlDialect::SqlServer,
        SqlDialect::Oracle
    ];

    /// Stable lowercase name, also used in fingerprints
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MySQL => "mysql",
            Self::PostgreSQL => "postgresql",
            Self::SqlServer => "sqlserver",
            Self::Oracle => "oracle",
            Self::Generic => "generic"
        }
    }

    /// Human-readable name used in prompts
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::MySQL => "MySQL",
            Self::PostgreSQL => "PostgreSQL",
            Self::SqlServer => "SQL Server",
            Self::Oracle => "Oracle",
            Self::Generic => "generic SQL"
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SqlDialect {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::MySQL),
            "postgresql" | "postgres" | "pg" => Ok(Self::PostgreSQL),
            "sqlserver" | "mssql" | "tsql" => Ok(Self::SqlServer),
            "oracle" | "plsql" => Ok(Self::Oracle),
            "generic" | "ansi" => Ok(Self::Generic),
            other => Err(validation_error(format!("unsupported dialect '{}'", other)))
        }
    }
}

/// Best-guess dialect together with the number of matching signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DialectGuess {
    pub dialect:     SqlDialect,
    pub match_score: u32
}

impl DialectGuess {
    fn generic(match_score: u32) -> Self {
        Self {
            dialect: SqlDialect::Generic,
            match_score
        }
    }
}

struct Signatures {
    dialect:  SqlDialect,
    patterns: Vec<Regex>
}

fn compile(dialect: SqlDialect, patterns: &[&str]) -> Signatures {
    let patterns = patterns
        .iter()
        .filter_map(|p| Regex::new(&format!("(?i){}", p)).ok())
        .collect();
    Signatures {
        dialect,
        patterns
    }
}

static SIGNATURES: LazyLock<Vec<Signatures>> = LazyLock::new(|| {
    vec![
        compile(SqlDialect::MySQL, &[
            r"`[^`\s]+`",
            // `LIMIT n[, m]` not followed by OFFSET
            r"(?m)\bLIMIT\s+\d+(\s*,\s*\d+)?\s*(;|\)|--|/\*|$)",
            r"\bAUTO_INCREMENT\b",
            r"\bENGINE\s*=",
            r"\bON\s+DUPLICATE\s+KEY\s+UPDATE\b",
            r"\bIFNULL\s*\("
        ]),
        compile(SqlDialect::PostgreSQL, &[
            r"\bILIKE\b",
            r"\bRETURNING\b",
            r"::\s*[a-z_][a-z0-9_]*",
            r"\b(BIG)?SERIAL\b",
            r"\$\d+",
            r"\bON\s+CONFLICT\b"
        ]),
        compile(SqlDialect::SqlServer, &[
            r"\[[a-z_][a-z0-9_ ]*\]",
            r"\bTOP\s*\(?\s*\d+",
            r"\bGETDATE\s*\(\s*\)",
            r"\bWITH\s*\(\s*NOLOCK\s*\)",
            r"\bIDENTITY\s*\(",
            r"\bNVARCHAR\b"
        ]),
        compile(SqlDialect::Oracle, &[
            r"\bROWNUM\b",
            r"\bFROM\s+DUAL\b",
            r"\bNVL\s*\(",
            r"\bSYSDATE\b",
            r"\bVARCHAR2\b",
            r"\bCONNECT\s+BY\b"
        ]),
    ]
});

/// Count the signatures of one dialect that match the statement
pub fn signature_score(sql: &str, dialect: SqlDialect) -> u32 {
    SIGNATURES
        .iter()
        .find(|s| s.dialect == dialect)
        .map(|s| s.patterns.iter().filter(|re| re.is_match(sql)).count() as u32)
        .unwrap_or(0)
}

/// Identify the most likely dialect of a SQL statement
///
/// Never fails. Ties between the top dialects and scores below
/// [`MIN_SIGNATURE_MATCHES`] resolve to [`SqlDialect::Generic`].
pub fn identify(sql: &str) -> DialectGuess {
    let mut best = DialectGuess::generic(0);
    let mut tied = false;
    for signatures in SIGNATURES.iter() {
        let score = signature_score(sql, signatures.dialect);
        if score > best.match_score {
            best = DialectGuess {
                dialect:     signatures.dialect,
                match_score: score
            };
            tied = false;
        } else if score == best.match_score && score > 0 {
            tied = true;
        }
    }
    if tied || best.match_score < MIN_SIGNATURE_MATCHES {
        return DialectGuess::generic(best.match_score);
    }
    best
}

/// Resolve the dialect for a request, honoring a caller hint outright
pub fn resolve(sql: &str, hint: Option<SqlDialect>) -> DialectGuess {
    match hint {
        Some(dialect) => DialectGuess {
            dialect,
            match_score: 0
        },
        None => identify(sql)
    }
}
