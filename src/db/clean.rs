use crate::error::{Result, SupashiftError};
use regex::Regex;
use std::fmt;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// One text-rewrite rule. Rules are unconditional: the worst case is a
/// pattern that matches nothing.
enum Rule {
    /// Replace every match on the line, keep the line.
    Rewrite { pattern: Regex, replacement: String },
    /// Drop the whole line when the pattern matches.
    Drop { pattern: Regex },
}

/// Counts reported back to the operator after a cleaning pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanStats {
    pub lines_rewritten: usize,
    pub lines_dropped: usize,
}

impl fmt::Display for CleanStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} line(s) rewritten, {} line(s) dropped",
            self.lines_rewritten, self.lines_dropped
        )
    }
}

/// Transforms a raw CloudSQL dump so it executes against Supabase.
///
/// A fixed ordered rule list applied in a single line-based pass:
/// schema renaming, then removal of role/ownership/privilege statements
/// Supabase rejects. No SQL parsing, no validation of the result. COPY
/// data blocks pass through untouched.
pub struct DumpCleaner {
    rules: Vec<Rule>,
}

impl DumpCleaner {
    /// Build the rule list for a source/target schema pair.
    pub fn new(source_schema: &str, target_schema: &str) -> Result<Self> {
        let mut rules = Vec::new();

        // Identifier substitution: case-sensitive, word-bounded so that
        // e.g. source "app" never matches inside "app_private".
        if source_schema != target_schema {
            rules.push(Rule::Rewrite {
                pattern: compile(&format!(r"\b{}\b", regex::escape(source_schema)))?,
                replacement: target_schema.to_string(),
            });
        }

        // Role management needs superuser on the target.
        rules.push(Rule::Drop {
            pattern: compile(r"^\s*(CREATE|ALTER|DROP) ROLE\b")?,
        });

        // Ownership reassignment to accounts that may not exist on Supabase.
        rules.push(Rule::Drop {
            pattern: compile(r"\bOWNER TO\b")?,
        });
        rules.push(Rule::Drop {
            pattern: compile(r"^\s*REASSIGN OWNED BY\b")?,
        });

        // CloudSQL-specific roles (cloudsqladmin, cloudsqlsuperuser, ...).
        rules.push(Rule::Drop {
            pattern: compile(r#"^\s*(GRANT|REVOKE)\b.*\bcloudsql\w*"#)?,
        });
        rules.push(Rule::Drop {
            pattern: compile(r#"^\s*ALTER DEFAULT PRIVILEGES FOR ROLE "?cloudsql\w*"#)?,
        });

        // Extension comments require ownership of the extension.
        rules.push(Rule::Drop {
            pattern: compile(r"^\s*COMMENT ON EXTENSION\b")?,
        });

        Ok(Self { rules })
    }

    /// Clean a dump file into a new file. Fails without creating the output
    /// when the input cannot be opened.
    pub fn clean_file(&self, input_path: &Path, output_path: &Path) -> Result<CleanStats> {
        let input = std::fs::File::open(input_path)
            .map_err(|e| SupashiftError::file_access(input_path, e))?;
        let output = std::fs::File::create(output_path)
            .map_err(|e| SupashiftError::file_access(output_path, e))?;

        let mut writer = BufWriter::new(output);
        let mut stats = CleanStats::default();
        let mut in_copy_block = false;

        for line in BufReader::new(input).lines() {
            let line = line.map_err(|e| SupashiftError::file_access(input_path, e))?;

            // COPY data rows are not SQL; pass them through byte-identical.
            if in_copy_block {
                if line == "\\." {
                    in_copy_block = false;
                }
                writeln!(writer, "{line}")
                    .map_err(|e| SupashiftError::file_access(output_path, e))?;
                continue;
            }

            match self.clean_line(&line) {
                Some(cleaned) => {
                    if cleaned != line {
                        stats.lines_rewritten += 1;
                    }
                    if is_copy_start(&cleaned) {
                        in_copy_block = true;
                    }
                    writeln!(writer, "{cleaned}")
                        .map_err(|e| SupashiftError::file_access(output_path, e))?;
                }
                None => {
                    stats.lines_dropped += 1;
                    debug!("dropped: {}", line.trim_end());
                }
            }
        }

        writer
            .flush()
            .map_err(|e| SupashiftError::file_access(output_path, e))?;

        debug!("cleaning complete: {}", stats);
        Ok(stats)
    }

    /// Apply the rule list to one line. `None` means the line is dropped.
    fn clean_line(&self, line: &str) -> Option<String> {
        let mut current = line.to_string();
        for rule in &self.rules {
            match rule {
                Rule::Rewrite {
                    pattern,
                    replacement,
                } => {
                    if pattern.is_match(&current) {
                        // NoExpand: the target schema is a literal, not a
                        // capture-group template.
                        current = pattern
                            .replace_all(&current, regex::NoExpand(replacement))
                            .into_owned();
                    }
                }
                Rule::Drop { pattern } => {
                    if pattern.is_match(&current) {
                        return None;
                    }
                }
            }
        }
        Some(current)
    }

    /// Clean an in-memory dump. Used by tests; the file path variant is the
    /// production entry point.
    #[cfg(test)]
    fn clean_str(&self, sql: &str) -> String {
        let mut out = String::new();
        let mut in_copy_block = false;
        for line in sql.lines() {
            if in_copy_block {
                if line == "\\." {
                    in_copy_block = false;
                }
                out.push_str(line);
                out.push('\n');
                continue;
            }
            if let Some(cleaned) = self.clean_line(line) {
                if is_copy_start(&cleaned) {
                    in_copy_block = true;
                }
                out.push_str(&cleaned);
                out.push('\n');
            }
        }
        out
    }
}

fn is_copy_start(line: &str) -> bool {
    line.starts_with("COPY ") && line.trim_end().ends_with("FROM stdin;")
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| SupashiftError::Configuration(format!("invalid cleaning pattern: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaner(source: &str, target: &str) -> DumpCleaner {
        DumpCleaner::new(source, target).unwrap()
    }

    #[test]
    fn test_schema_rename_qualified_and_bare() {
        let input = "CREATE SCHEMA app;\nALTER TABLE app.users ADD COLUMN email text;\n";
        let result = cleaner("app", "public").clean_str(input);
        assert_eq!(
            result,
            "CREATE SCHEMA public;\nALTER TABLE public.users ADD COLUMN email text;\n"
        );
    }

    #[test]
    fn test_schema_rename_is_word_bounded() {
        let input = "CREATE TABLE app_private.tokens (id int);\nSELECT * FROM app.users;\n";
        let result = cleaner("app", "public").clean_str(input);
        assert!(result.contains("app_private.tokens"));
        assert!(result.contains("public.users"));
    }

    #[test]
    fn test_schema_rename_quoted_identifier() {
        let input = "ALTER TABLE \"app\".\"users\" OWNER TO x;\nCREATE TABLE \"app\".\"users\" (id int);\n";
        let result = cleaner("app", "public").clean_str(input);
        assert_eq!(result, "CREATE TABLE \"public\".\"users\" (id int);\n");
    }

    #[test]
    fn test_owner_to_dropped_others_untouched() {
        let input = "CREATE TABLE t (id int);\nALTER TABLE t OWNER TO clouduser;\nINSERT INTO t VALUES (1);\n";
        let result = cleaner("public", "public").clean_str(input);
        assert_eq!(result, "CREATE TABLE t (id int);\nINSERT INTO t VALUES (1);\n");
    }

    #[test]
    fn test_role_statements_dropped() {
        let input = "CREATE ROLE cloudsqladmin;\nALTER ROLE postgres SET search_path TO x;\nDROP ROLE old;\nCREATE TABLE t (id int);\n";
        let result = cleaner("public", "public").clean_str(input);
        assert_eq!(result, "CREATE TABLE t (id int);\n");
    }

    #[test]
    fn test_reassign_owned_dropped() {
        let input = "REASSIGN OWNED BY clouduser TO postgres;\nCREATE TABLE t (id int);\n";
        let result = cleaner("public", "public").clean_str(input);
        assert_eq!(result, "CREATE TABLE t (id int);\n");
    }

    #[test]
    fn test_cloudsql_default_privileges_dropped() {
        let input = "ALTER DEFAULT PRIVILEGES FOR ROLE \"cloudsqlsuperuser\" IN SCHEMA public GRANT ALL ON TABLES TO postgres;\nALTER DEFAULT PRIVILEGES FOR ROLE cloudsqladmin GRANT ALL ON SEQUENCES TO postgres;\nALTER DEFAULT PRIVILEGES FOR ROLE owner_role GRANT SELECT ON TABLES TO reporting;\n";
        let result = cleaner("public", "public").clean_str(input);
        assert_eq!(
            result,
            "ALTER DEFAULT PRIVILEGES FOR ROLE owner_role GRANT SELECT ON TABLES TO reporting;\n"
        );
    }

    #[test]
    fn test_cloudsql_grants_dropped() {
        let input = "GRANT ALL ON SCHEMA public TO cloudsqlsuperuser;\nGRANT SELECT ON t TO reporting;\nREVOKE ALL ON t FROM cloudsqladmin;\n";
        let result = cleaner("public", "public").clean_str(input);
        assert_eq!(result, "GRANT SELECT ON t TO reporting;\n");
    }

    #[test]
    fn test_extension_comment_dropped() {
        let input = "CREATE EXTENSION IF NOT EXISTS pgcrypto;\nCOMMENT ON EXTENSION pgcrypto IS 'crypto';\n";
        let result = cleaner("public", "public").clean_str(input);
        assert_eq!(result, "CREATE EXTENSION IF NOT EXISTS pgcrypto;\n");
    }

    #[test]
    fn test_copy_block_untouched() {
        let input = "COPY public.users (id, name) FROM stdin;\n1\tapp\n2\tALTER TABLE x OWNER TO y;\n\\.\nALTER TABLE app.t OWNER TO z;\n";
        let result = cleaner("app", "public").clean_str(input);
        // Data rows keep the literal "app" and the OWNER TO text; the
        // statement after the block is still dropped.
        assert_eq!(
            result,
            "COPY public.users (id, name) FROM stdin;\n1\tapp\n2\tALTER TABLE x OWNER TO y;\n\\.\n"
        );
    }

    #[test]
    fn test_idempotent() {
        let input = "CREATE SCHEMA app;\nALTER TABLE app.users OWNER TO clouduser;\nGRANT ALL ON SCHEMA app TO cloudsqlsuperuser;\nCREATE TABLE app.users (id int);\n";
        let c = cleaner("app", "public");
        let once = c.clean_str(input);
        let twice = c.clean_str(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_end_to_end_sample() {
        let input = "CREATE SCHEMA app;\nCREATE TABLE app.users(id int);\nALTER TABLE app.users OWNER TO clouduser;\n";
        let result = cleaner("app", "public").clean_str(input);
        assert_eq!(result, "CREATE SCHEMA public;\nCREATE TABLE public.users(id int);\n");
    }

    #[test]
    fn test_clean_file_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("missing.sql");
        let output = dir.path().join("cleaned.sql");

        let err = cleaner("app", "public")
            .clean_file(&input, &output)
            .unwrap_err();

        assert!(matches!(err, SupashiftError::FileAccess { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_clean_file_reports_stats() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw.sql");
        let output = dir.path().join("cleaned.sql");
        std::fs::write(
            &input,
            "CREATE SCHEMA app;\nALTER TABLE app.t OWNER TO x;\nCREATE TABLE app.t (id int);\n",
        )
        .unwrap();

        let stats = cleaner("app", "public").clean_file(&input, &output).unwrap();

        assert_eq!(stats.lines_dropped, 1);
        assert_eq!(stats.lines_rewritten, 2);
        let cleaned = std::fs::read_to_string(&output).unwrap();
        assert_eq!(cleaned, "CREATE SCHEMA public;\nCREATE TABLE public.t (id int);\n");
    }
}
