use regex::Regex;
use std::sync::OnceLock;

/// Structured view of a PostgreSQL constraint violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    pub table: String,
    pub column: String,
    pub value: Option<String>,
}

/// Extracts table, column and offending value from PostgreSQL error text.
///
/// Constraint names follow the default PostgreSQL scheme
/// (`<table>_<column>_key`, `<table>_<column>_fkey`, `<table>_<column>_check`),
/// and the offending value comes from the `Key (column)=(value)` detail line.
pub struct ConstraintParser;

struct Patterns {
    key_value: Regex,
    column: Regex,
    table: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

const CONSTRAINT_SUFFIXES: [&str; 5] = ["_key", "_fkey", "_check", "_idx", "_not_null"];

impl ConstraintParser {
    fn patterns() -> &'static Patterns {
        PATTERNS.get_or_init(|| Patterns {
            key_value: Regex::new(r"Key \(([^)]+)\)=\(([^)]*)\)").expect("static regex"),
            column: Regex::new(r#"column "([^"]+)""#).expect("static regex"),
            table: Regex::new(r#"(?:table|relation) "([^"]+)""#).expect("static regex"),
        })
    }

    /// Parses any constraint violation.
    ///
    /// Explicit `table`/`column` values (as reported by the driver) win over
    /// anything recovered from the constraint name or message.
    pub fn parse(
        message: &str,
        constraint_name: Option<&str>,
        table_name: Option<&str>,
        column_name: Option<&str>,
    ) -> Option<ConstraintViolation> {
        let from_constraint = constraint_name.and_then(|name| {
            let table = table_name
                .map(str::to_string)
                .or_else(|| Self::extract_table_from_message(message))?;
            Self::column_from_constraint_name(name, &table).map(|column| (table, column))
        });

        let key_value = Self::extract_key_value_from_message(message);

        let (table, column) = match (from_constraint, column_name, &key_value) {
            (Some(pair), _, _) => pair,
            (None, Some(column), _) => (
                Self::table_or_default(table_name, message),
                column.to_string(),
            ),
            (None, None, Some((column, _))) => {
                (Self::table_or_default(table_name, message), column.clone())
            }
            (None, None, None) => (
                Self::table_or_default(table_name, message),
                Self::extract_column_from_message(message)?,
            ),
        };

        Some(ConstraintViolation {
            table,
            column,
            value: key_value.map(|(_, value)| value),
        })
    }

    fn table_or_default(table_name: Option<&str>, message: &str) -> String {
        table_name
            .map(str::to_string)
            .or_else(|| Self::extract_table_from_message(message))
            .unwrap_or_else(|| "resource".to_string())
    }

    /// Strips the table prefix and the constraint-kind suffix from a
    /// constraint name, leaving the column part.
    ///
    /// `("users_email_key", "users")` → `"email"`,
    /// `("products_reception_id_fkey", "products")` → `"reception_id"`.
    pub fn column_from_constraint_name(constraint_name: &str, table: &str) -> Option<String> {
        let rest = constraint_name.strip_prefix(table)?.strip_prefix('_')?;
        let column = CONSTRAINT_SUFFIXES
            .iter()
            .find_map(|suffix| rest.strip_suffix(suffix))?;
        (!column.is_empty()).then(|| column.to_string())
    }

    pub fn extract_column_from_message(message: &str) -> Option<String> {
        Self::patterns()
            .column
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    pub fn extract_table_from_message(message: &str) -> Option<String> {
        Self::patterns()
            .table
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Looks for `Key (field)=(value)` in PostgreSQL messages.
    pub fn extract_key_value_from_message(message: &str) -> Option<(String, String)> {
        Self::patterns().key_value.captures(message).and_then(|caps| {
            let field = caps.get(1)?.as_str().to_string();
            let value = caps.get(2)?.as_str().to_string();
            Some((field, value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unique_violation_on_users_email() {
        let message = "duplicate key value violates unique constraint \"users_email_key\"\nDETAIL: Key (email)=(a@b.com) already exists.";
        let parsed = ConstraintParser::parse(message, Some("users_email_key"), Some("users"), None);
        assert_eq!(
            parsed,
            Some(ConstraintViolation {
                table: "users".to_string(),
                column: "email".to_string(),
                value: Some("a@b.com".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_foreign_key_violation_with_multi_part_column() {
        let message = "insert or update on table \"products\" violates foreign key constraint \"products_reception_id_fkey\"\nDETAIL: Key (reception_id)=(00000000-0000-0000-0000-000000000000) is not present in table \"receptions\".";
        let parsed =
            ConstraintParser::parse(message, Some("products_reception_id_fkey"), None, None)
                .expect("parsed");
        assert_eq!(parsed.table, "products");
        assert_eq!(parsed.column, "reception_id");
        assert_eq!(
            parsed.value.as_deref(),
            Some("00000000-0000-0000-0000-000000000000")
        );
    }

    #[test]
    fn test_parse_not_null_violation_from_message() {
        let message =
            "null value in column \"city\" of relation \"pvzs\" violates not-null constraint";
        let parsed = ConstraintParser::parse(message, None, None, None).expect("parsed");
        assert_eq!(parsed.table, "pvzs");
        assert_eq!(parsed.column, "city");
        assert_eq!(parsed.value, None);
    }

    #[test]
    fn test_parse_falls_back_to_key_value() {
        let message = "duplicate key value violates unique constraint\nDETAIL: Key (email)=(x@y.z) already exists.";
        let parsed = ConstraintParser::parse(message, None, None, None).expect("parsed");
        assert_eq!(parsed.table, "resource");
        assert_eq!(parsed.column, "email");
        assert_eq!(parsed.value.as_deref(), Some("x@y.z"));
    }

    #[test]
    fn test_column_from_constraint_name() {
        assert_eq!(
            ConstraintParser::column_from_constraint_name("users_email_key", "users"),
            Some("email".to_string())
        );
        assert_eq!(
            ConstraintParser::column_from_constraint_name("receptions_pvz_id_fkey", "receptions"),
            Some("pvz_id".to_string())
        );
        assert_eq!(
            ConstraintParser::column_from_constraint_name("users_email_key", "pvzs"),
            None
        );
        assert_eq!(
            ConstraintParser::column_from_constraint_name("users_key", "users"),
            None
        );
    }

    #[test]
    fn test_unrelated_message_yields_none() {
        assert_eq!(
            ConstraintParser::parse("completely unrelated error message", None, None, None),
            None
        );
    }
}
